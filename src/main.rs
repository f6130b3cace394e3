//! shpsg - spherical-harmonics particle shape generator
//!
//! Generates one particle per invocation and writes it as binary STL.
//!
//! ```text
//! shpsg generate --ei 0.8 --fi 0.7 --angularity 0.2 --roughness 0.1 -o p.stl
//! shpsg generate --config particle.toml --seed 42
//! shpsg generate --recipe gradual --index 23 --total 50
//! shpsg inspect p.stl
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::info;

use shpsg::export::read_stl;
use shpsg::{GenerateParticle, ParticleCategory, ParticleConfig, ParticleRecipe, SamplingMesh};

#[derive(Parser)]
#[command(name = "shpsg")]
#[command(about = "Spherical-harmonics particle shape generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one particle and write it as binary STL
    Generate(GenerateArgs),

    /// Print a summary of a binary STL file
    Inspect {
        /// STL file to read
        input: PathBuf,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Draw descriptors and diameter from a particle category
    #[arg(long)]
    recipe: Option<ParticleCategory>,

    /// Particle index within the batch (gradual recipe)
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Batch size (gradual recipe)
    #[arg(long, default_value_t = 1)]
    total: usize,

    /// Elongation index Ei
    #[arg(long)]
    ei: Option<f64>,

    /// Flatness index Fi
    #[arg(long)]
    fi: Option<f64>,

    /// Angularity descriptor D2_8
    #[arg(long)]
    angularity: Option<f64>,

    /// Roughness descriptor D9_15
    #[arg(long)]
    roughness: Option<f64>,

    /// Highest harmonic degree
    #[arg(short = 'L', long)]
    degree_cutoff: Option<usize>,

    /// Gain on degrees above 1
    #[arg(long)]
    multiplier: Option<f64>,

    /// Volume-equivalent diameter
    #[arg(short, long)]
    diameter: Option<f64>,

    /// Icosahedron subdivision level
    #[arg(long)]
    level: Option<u32>,

    /// Generator seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output STL file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Default: WARN for everything. Override with RUST_LOG (e.g. RUST_LOG=shpsg=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => generate(args),
        Commands::Inspect { input } => inspect(&input),
    }
}

fn generate(args: GenerateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ParticleConfig::load(path)?,
        None => ParticleConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    let mut rng = match config.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_rng(&mut rand::rng()),
    };

    if let Some(category) = args.recipe {
        let draw = ParticleRecipe::new(category)
            .at(args.index, args.total)
            .sample(&mut rng)?;
        config = config.with_descriptors(&draw.descriptors);
        config.target_diameter = draw.target_diameter;
        config.category = Some(category);
        if args.config.is_none() {
            config.output = PathBuf::from(format!("{}.stl", category.file_stem(args.index)));
        }
    }

    apply_overrides(&mut config, &args);
    config.validate().context("invalid particle parameters")?;

    let sampling = SamplingMesh::new(config.subdivision_level)?;
    info!(
        level = config.subdivision_level,
        vertices = sampling.vertex_count(),
        "sampling mesh ready"
    );

    let record = GenerateParticle::new(&sampling, &config)
        .execute(&mut rng)
        .with_context(|| format!("failed to generate {}", config.output.display()))?;

    let d = &record.descriptors;
    println!("{}", record.path.display());
    println!(
        "  diameter {:.2} | Ei {:.3} | Fi {:.3} | D2_8 {:.3} | D9_15 {:.3} | L {} | x{:.2}",
        record.target_diameter,
        d.elongation(),
        d.flatness(),
        d.angularity(),
        d.roughness(),
        d.degree_cutoff(),
        d.multiplier()
    );
    println!(
        "  {} triangles | {} form | {} surface | radius {:.2}..{:.2} | preview +/-{:.1}",
        record.triangle_count,
        record.shape_class(),
        record.surface_class(),
        record.radius_range.0,
        record.radius_range.1,
        record.preview_half_extent()
    );
    Ok(())
}

fn apply_overrides(config: &mut ParticleConfig, args: &GenerateArgs) {
    if let Some(v) = args.ei {
        config.elongation = v;
    }
    if let Some(v) = args.fi {
        config.flatness = v;
    }
    if let Some(v) = args.angularity {
        config.angularity = v;
    }
    if let Some(v) = args.roughness {
        config.roughness = v;
    }
    if let Some(v) = args.degree_cutoff {
        config.degree_cutoff = v;
    }
    if let Some(v) = args.multiplier {
        config.multiplier = v;
    }
    if let Some(v) = args.diameter {
        config.target_diameter = v;
    }
    if let Some(v) = args.level {
        config.subdivision_level = v;
    }
    if let Some(v) = &args.output {
        config.output.clone_from(v);
    }
}

fn inspect(input: &Path) -> Result<()> {
    let solid = read_stl(input)?;
    let header = String::from_utf8_lossy(&solid.header);
    println!("{}", input.display());
    println!("  header    {}", header.trim_end_matches('\0').trim_end());
    println!("  triangles {}", solid.triangles.len());

    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for v in solid.triangles.iter().flat_map(|t| t.vertices.iter()) {
        for (axis, c) in v.iter().enumerate() {
            min[axis] = min[axis].min(*c);
            max[axis] = max[axis].max(*c);
        }
    }
    if !solid.triangles.is_empty() {
        println!(
            "  bounds    [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
            min[0], min[1], min[2], max[0], max[1], max[2]
        );
    }
    Ok(())
}
