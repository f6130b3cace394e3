//! Binary STL encoding.
//!
//! Layout (all little-endian): 80-byte header, `u32` triangle count, then
//! per triangle a 50-byte record of `f32` normal (3), `f32` vertices (3x3)
//! and a `u16` attribute byte count that is always zero.

use std::fs;
use std::io::{self, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::debug;

use crate::error::{ExportError, Result, StlDecodeError};
use crate::mesh::{face_normal, TriangleMesh};
use crate::surface::ParticleSurface;

/// Size of the free-form header.
pub const HEADER_LEN: usize = 80;

/// Size of one triangle record.
pub const TRIANGLE_RECORD_LEN: usize = 50;

const DEFAULT_HEADER: &str = "shpsg spherical-harmonics particle";

/// One decoded triangle record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StlTriangle {
    /// Facet normal as stored in the file.
    pub normal: [f32; 3],
    /// Corner positions in winding order.
    pub vertices: [[f32; 3]; 3],
    /// Attribute byte count.
    pub attribute: u16,
}

/// A decoded binary STL file.
#[derive(Debug, Clone, PartialEq)]
pub struct StlSolid {
    /// Raw header bytes.
    pub header: [u8; HEADER_LEN],
    /// Triangle records in file order.
    pub triangles: Vec<StlTriangle>,
}

/// Writes a surface to a binary STL file.
///
/// The file is first written to a temporary sibling of `path` and renamed
/// into place once complete, so `path` never holds a partial file.
pub struct WriteStl<'a> {
    surface: &'a ParticleSurface,
    path: PathBuf,
    header: String,
}

impl<'a> WriteStl<'a> {
    /// Creates a new `WriteStl` operation.
    #[must_use]
    pub fn new(surface: &'a ParticleSurface, path: impl Into<PathBuf>) -> Self {
        Self {
            surface,
            path: path.into(),
            header: DEFAULT_HEADER.to_owned(),
        }
    }

    /// Replaces the header text; it is truncated to 80 bytes and zero-padded.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Executes the write.
    ///
    /// # Errors
    ///
    /// Returns an export error if the destination directory is not
    /// writable, the rename fails, or the mesh has too many triangles.
    pub fn execute(&self) -> Result<()> {
        let path = &self.path;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".shpsg-")
            .suffix(".stl.tmp")
            .tempfile_in(dir)
            .map_err(|e| ExportError::io(path, e))?;

        {
            let mesh = self.surface.mesh();
            let count = triangle_count(mesh)?;
            let mut writer = BufWriter::new(tmp.as_file_mut());
            write_records(&mut writer, mesh, self.header.as_bytes(), count)
                .and_then(|()| writer.flush())
                .map_err(|e| ExportError::io(path, e))?;
        }

        tmp.persist(path)
            .map_err(|e| ExportError::io(path, e.error))?;

        debug!(
            path = %path.display(),
            triangles = self.surface.mesh().triangle_count(),
            "wrote binary STL"
        );
        Ok(())
    }
}

/// Encodes `mesh` as binary STL into `writer`.
///
/// Normals are recomputed from each triangle's winding; degenerate
/// triangles get a zero normal.
///
/// # Errors
///
/// Returns an export error on write failure or if the triangle count does
/// not fit in `u32`.
pub fn encode<W: Write>(writer: &mut W, mesh: &TriangleMesh, header: &[u8]) -> Result<()> {
    let count = triangle_count(mesh)?;
    write_records(writer, mesh, header, count).map_err(|e| ExportError::io("<stream>", e))?;
    Ok(())
}

fn triangle_count(mesh: &TriangleMesh) -> std::result::Result<u32, ExportError> {
    u32::try_from(mesh.triangle_count())
        .map_err(|_| ExportError::TooManyTriangles(mesh.triangle_count()))
}

#[allow(clippy::cast_possible_truncation)]
fn write_records<W: Write>(
    writer: &mut W,
    mesh: &TriangleMesh,
    header: &[u8],
    count: u32,
) -> io::Result<()> {
    let mut head = [0u8; HEADER_LEN];
    let n = header.len().min(HEADER_LEN);
    head[..n].copy_from_slice(&header[..n]);
    writer.write_all(&head)?;
    writer.write_u32::<LittleEndian>(count)?;

    for i in 0..mesh.triangle_count() {
        let [v0, v1, v2] = mesh.triangle(i);
        let normal = face_normal(&v0, &v1, &v2);
        for c in normal.iter() {
            writer.write_f32::<LittleEndian>(*c as f32)?;
        }
        for v in [v0, v1, v2] {
            for c in v.coords.iter() {
                writer.write_f32::<LittleEndian>(*c as f32)?;
            }
        }
        writer.write_u16::<LittleEndian>(0)?;
    }
    Ok(())
}

/// Reads a binary STL file.
///
/// # Errors
///
/// Returns an export error if the file cannot be read or its length does
/// not match the triangle count in its header.
pub fn read_stl(path: impl AsRef<Path>) -> Result<StlSolid> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| ExportError::io(path, e))?;
    let solid = decode(&bytes).map_err(|source| ExportError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(solid)
}

/// Decodes binary STL bytes.
///
/// # Errors
///
/// Returns [`StlDecodeError`] if the buffer is truncated or has trailing
/// data.
pub fn decode(bytes: &[u8]) -> std::result::Result<StlSolid, StlDecodeError> {
    if bytes.len() < HEADER_LEN + 4 {
        return Err(StlDecodeError::TooShort(bytes.len()));
    }

    let mut cursor = Cursor::new(bytes);
    let mut header = [0u8; HEADER_LEN];
    cursor.read_exact(&mut header)?;
    let count = cursor.read_u32::<LittleEndian>()? as usize;

    let expected = HEADER_LEN + 4 + count * TRIANGLE_RECORD_LEN;
    if bytes.len() != expected {
        return Err(StlDecodeError::LengthMismatch {
            triangles: count,
            expected,
            actual: bytes.len(),
        });
    }

    let mut triangles = Vec::with_capacity(count);
    for _ in 0..count {
        triangles.push(read_triangle(&mut cursor)?);
    }

    Ok(StlSolid { header, triangles })
}

fn read_vec<R: Read>(reader: &mut R) -> io::Result<[f32; 3]> {
    Ok([
        reader.read_f32::<LittleEndian>()?,
        reader.read_f32::<LittleEndian>()?,
        reader.read_f32::<LittleEndian>()?,
    ])
}

fn read_triangle<R: Read>(reader: &mut R) -> io::Result<StlTriangle> {
    let normal = read_vec(reader)?;
    let vertices = [read_vec(reader)?, read_vec(reader)?, read_vec(reader)?];
    let attribute = reader.read_u16::<LittleEndian>()?;
    Ok(StlTriangle {
        normal,
        vertices,
        attribute,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn single_triangle() -> ParticleSurface {
        ParticleSurface::new(TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        ))
    }

    #[test]
    fn record_layout_is_bit_exact() {
        let mut buf = Vec::new();
        encode(&mut buf, single_triangle().mesh(), b"hdr").unwrap();

        assert_eq!(buf.len(), 84 + 50);
        assert_eq!(&buf[..3], b"hdr");
        assert!(buf[3..80].iter().all(|&b| b == 0));
        assert_eq!(&buf[80..84], &1u32.to_le_bytes());
        // normal (0, 0, 1)
        assert_eq!(&buf[84..88], &0f32.to_le_bytes());
        assert_eq!(&buf[92..96], &1f32.to_le_bytes());
        // second vertex x = 1
        assert_eq!(&buf[108..112], &1f32.to_le_bytes());
        // attribute
        assert_eq!(&buf[132..134], &[0, 0]);
    }

    #[test]
    fn long_header_is_truncated() {
        let mut buf = Vec::new();
        let long = vec![b'x'; 200];
        encode(&mut buf, &TriangleMesh::default(), &long).unwrap();
        assert_eq!(buf.len(), 84);
        assert_eq!(&buf[80..84], &0u32.to_le_bytes());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.stl");
        WriteStl::new(&single_triangle(), &path)
            .with_header("test")
            .execute()
            .unwrap();

        let solid = read_stl(&path).unwrap();
        assert_eq!(&solid.header[..4], b"test");
        assert_eq!(solid.triangles.len(), 1);
        let t = solid.triangles[0];
        assert_eq!(t.normal, [0.0, 0.0, 1.0]);
        assert_eq!(t.vertices[1], [1.0, 0.0, 0.0]);
        assert_eq!(t.attribute, 0);

        // only the final file remains
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("tri.stl");
        let err = WriteStl::new(&single_triangle(), &path).execute().unwrap_err();
        assert!(matches!(
            err,
            crate::error::ShpsgError::Export(ExportError::Io { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn decode_rejects_truncated_files() {
        let mut buf = Vec::new();
        encode(&mut buf, single_triangle().mesh(), b"").unwrap();
        assert!(matches!(
            decode(&buf[..buf.len() - 1]),
            Err(StlDecodeError::LengthMismatch {
                triangles: 1,
                expected: 134,
                actual: 133,
            })
        ));
        assert!(matches!(decode(&buf[..10]), Err(StlDecodeError::TooShort(10))));
        buf.push(0);
        assert!(decode(&buf).is_err());
    }

    #[test]
    fn read_stl_attaches_path_to_decode_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.stl");
        fs::write(&path, [0u8; 20]).unwrap();
        match read_stl(&path).unwrap_err() {
            crate::error::ShpsgError::Export(ExportError::Malformed { path: p, source }) => {
                assert_eq!(p, path);
                assert!(matches!(source, StlDecodeError::TooShort(20)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
