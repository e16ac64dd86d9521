//! Indexed geometry as delivered by a mesh file.
//!
//! [`RawGeometry`] holds exactly what the mesh assembler consumes: a point
//! array, a normal array parallel to it, and a triangle index list. It can be
//! built by hand, taken from the built-in [`cube`](RawGeometry::cube), or read
//! from an STL file.
//!
//! # Supported Formats
//!
//! | Format | Extensions | Notes |
//! |--------|------------|-------|
//! | STL    | `.stl`     | Binary and ASCII; normals are averaged per point |
//!
//! ```no_run
//! use isoview::RawGeometry;
//!
//! let mut model = RawGeometry::from_file("model.stl")?;
//! model.fit_unit_cube();
//! # Ok::<(), isoview::AssetLoadError>(())
//! ```

use crate::error::AssetLoadError;
use glam::Vec3;
use std::path::Path;

/// Points, normals and triangle indices before assembly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawGeometry {
    /// Point coordinates, referenced by `indices`.
    pub points: Vec<[f32; 3]>,
    /// One normal per point. Carried along but not used for coloring.
    pub normals: Vec<[f32; 3]>,
    /// Triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(points: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            points,
            normals,
            indices,
        }
    }

    /// The built-in cube spanning -1 to 1 on every axis.
    ///
    /// Triangles are emitted face by face (front, back, top, bottom, right,
    /// left), two per face, so every run of six indices covers one face.
    pub fn cube() -> Self {
        #[rustfmt::skip]
        let points = vec![
            [-1.0, -1.0,  1.0], // 0
            [ 1.0, -1.0,  1.0], // 1
            [ 1.0,  1.0,  1.0], // 2
            [-1.0,  1.0,  1.0], // 3
            [-1.0, -1.0, -1.0], // 4
            [ 1.0, -1.0, -1.0], // 5
            [ 1.0,  1.0, -1.0], // 6
            [-1.0,  1.0, -1.0], // 7
        ];

        let normals = points
            .iter()
            .map(|&p: &[f32; 3]| Vec3::from(p).normalize().to_array())
            .collect();

        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 2, 3, 0, // front
            5, 4, 7, 7, 6, 5, // back
            3, 2, 6, 6, 7, 3, // top
            4, 5, 1, 1, 0, 4, // bottom
            1, 5, 6, 6, 2, 1, // right
            4, 0, 3, 3, 7, 4, // left
        ];

        Self::new(points, normals, indices)
    }

    /// Loads geometry from a file, detecting the format from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetLoadError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "stl" => Self::from_stl_file(path),
            _ => Err(AssetLoadError::UnknownFormat(ext)),
        }
    }

    /// Loads an STL file regardless of its extension.
    pub fn from_stl_file(path: impl AsRef<Path>) -> Result<Self, AssetLoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| AssetLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = std::io::BufReader::new(file);
        Self::parse_stl(&mut reader)
    }

    /// Parses STL data already in memory.
    pub fn from_stl_bytes(bytes: &[u8]) -> Result<Self, AssetLoadError> {
        let mut cursor = std::io::Cursor::new(bytes);
        Self::parse_stl(&mut cursor)
    }

    fn parse_stl<R: std::io::Read + std::io::Seek>(
        reader: &mut R,
    ) -> Result<Self, AssetLoadError> {
        let stl = stl_io::read_stl(reader)
            .map_err(|e| AssetLoadError::Parse(format!("STL parse error: {}", e)))?;

        let points: Vec<[f32; 3]> = stl.vertices.iter().map(|&v| v.into()).collect();
        let mut accumulated = vec![Vec3::ZERO; points.len()];
        let mut indices = Vec::with_capacity(stl.faces.len() * 3);

        for face in &stl.faces {
            let normal: [f32; 3] = face.normal.into();
            for &vertex_idx in &face.vertices {
                if let Some(sum) = accumulated.get_mut(vertex_idx) {
                    *sum += Vec3::from(normal);
                }
                let index = u32::try_from(vertex_idx)
                    .map_err(|_| AssetLoadError::Parse("too many STL vertices".into()))?;
                indices.push(index);
            }
        }

        let normals = accumulated
            .into_iter()
            .map(|n| n.normalize_or_zero().to_array())
            .collect();

        Ok(Self::new(points, normals, indices))
    }

    /// Number of whole triangles in the index list.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks that the index list describes whole triangles over existing points.
    pub fn validate(&self) -> Result<(), AssetLoadError> {
        if self.indices.len() % 3 != 0 {
            return Err(AssetLoadError::IncompleteTriangle {
                index_count: self.indices.len(),
            });
        }
        for (position, &index) in self.indices.iter().enumerate() {
            if index as usize >= self.points.len() {
                return Err(AssetLoadError::IndexOutOfRange {
                    position,
                    index,
                    point_count: self.points.len(),
                });
            }
        }
        Ok(())
    }

    /// Computes the axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for &p in &self.points {
            let p = Vec3::from(p);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    /// Recenters the points at the origin and scales them uniformly so the
    /// longest side spans -1 to 1, the extent of the built-in cube.
    pub fn fit_unit_cube(&mut self) {
        if self.points.is_empty() {
            return;
        }
        let (min, max) = self.bounds();
        let center = (min + max) * 0.5;
        let longest = (max - min).max_element();
        let factor = if longest > 0.0 { 2.0 / longest } else { 1.0 };

        for p in &mut self.points {
            *p = ((Vec3::from(*p) - center) * factor).to_array();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stl_bytes(triangles: &[stl_io::Triangle]) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        stl_io::write_stl(&mut out, triangles.iter()).unwrap();
        out.into_inner()
    }

    #[test]
    fn cube_has_six_faces_of_two_triangles() {
        let cube = RawGeometry::cube();
        assert_eq!(cube.points.len(), 8);
        assert_eq!(cube.normals.len(), 8);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.triangle_count(), 12);
        cube.validate().unwrap();
    }

    #[test]
    fn cube_face_groups_are_planar() {
        let cube = RawGeometry::cube();
        for face in cube.indices.chunks(6) {
            let points: Vec<Vec3> = face
                .iter()
                .map(|&i| Vec3::from(cube.points[i as usize]))
                .collect();
            // One coordinate is shared by all six vertices of a face.
            let shared = (0..3).any(|axis| points.iter().all(|p| p[axis] == points[0][axis]));
            assert!(shared, "face {:?} is not axis-aligned", face);
        }
    }

    #[test]
    fn validate_rejects_out_of_range_index() {
        let geom = RawGeometry::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            vec![0, 1, 3],
        );

        match geom.validate() {
            Err(AssetLoadError::IndexOutOfRange {
                position,
                index,
                point_count,
            }) => {
                assert_eq!(position, 2);
                assert_eq!(index, 3);
                assert_eq!(point_count, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_partial_triangle() {
        let geom = RawGeometry::new(vec![[0.0; 3]; 3], vec![], vec![0, 1]);
        assert!(matches!(
            geom.validate(),
            Err(AssetLoadError::IncompleteTriangle { index_count: 2 })
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = RawGeometry::from_file("model.ply").unwrap_err();
        assert!(matches!(err, AssetLoadError::UnknownFormat(ext) if ext == "ply"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RawGeometry::from_stl_file("does/not/exist.stl").unwrap_err();
        assert!(matches!(err, AssetLoadError::Io { ref path, .. } if path.ends_with("exist.stl")));
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        assert!(RawGeometry::from_stl_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn stl_bytes_keep_triangle_order() {
        let up = stl_io::Normal::new([0.0, 0.0, 1.0]);
        let a = stl_io::Vertex::new([0.0, 0.0, 0.0]);
        let b = stl_io::Vertex::new([1.0, 0.0, 0.0]);
        let c = stl_io::Vertex::new([1.0, 1.0, 0.0]);
        let d = stl_io::Vertex::new([0.0, 1.0, 0.0]);
        let bytes = stl_bytes(&[
            stl_io::Triangle {
                normal: up,
                vertices: [a, b, c],
            },
            stl_io::Triangle {
                normal: up,
                vertices: [c, d, a],
            },
        ]);

        let geom = RawGeometry::from_stl_bytes(&bytes).unwrap();
        geom.validate().unwrap();
        assert_eq!(geom.indices.len(), 6);
        assert_eq!(geom.normals.len(), geom.points.len());

        let corners: Vec<[f32; 3]> = geom
            .indices
            .iter()
            .map(|&i| geom.points[i as usize])
            .collect();
        assert_eq!(
            corners,
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0],
            ]
        );
        for n in &geom.normals {
            assert_eq!(*n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn fit_unit_cube_recenters_and_scales() {
        let mut geom = RawGeometry::new(
            vec![[2.0, 2.0, 2.0], [6.0, 4.0, 3.0]],
            vec![[0.0, 1.0, 0.0]; 2],
            vec![],
        );

        geom.fit_unit_cube();

        let (min, max) = geom.bounds();
        assert!((min.x + 1.0).abs() < 1e-6);
        assert!((max.x - 1.0).abs() < 1e-6);
        assert!((min.y + 0.5).abs() < 1e-6);
        assert!((max.y - 0.5).abs() < 1e-6);
    }
}
