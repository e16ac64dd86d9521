//! Mesh assembly: indexed geometry to flat, colored vertex streams.
//!
//! The assembler walks the triangle index list in order and emits one
//! [`Vertex`] per index. Vertices are then split into face groups of
//! [`FACE_GROUP_LEN`] (two triangles) and every vertex in a group gets the
//! same [`FaceColor`], looked up in [`FACE_PALETTE`] by group index. The
//! result is two index-aligned streams that are uploaded as two separate
//! vertex buffers by [`ColoredMesh::upload`].
//!
//! # Vertex Layout
//!
//! | Buffer   | Attribute | Format    | Shader Location |
//! |----------|-----------|-----------|-----------------|
//! | 0        | position  | Float32x3 | 0               |
//! | 1        | color     | Float32x4 | 1               |

use crate::error::AssetLoadError;
use crate::geometry::RawGeometry;
use crate::gpu::GpuContext;

/// A single vertex position in model space.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    /// Buffer layout for the position stream (12 bytes per vertex).
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };

    pub const fn new(position: [f32; 3]) -> Self {
        Self { position }
    }
}

/// RGBA color shared by every vertex of one face group.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FaceColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl FaceColor {
    /// Buffer layout for the color stream (16 bytes per vertex).
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<FaceColor>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x4,
        }],
    };

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const RED: FaceColor = FaceColor::rgb(1.0, 0.0, 0.0);
    pub const GREEN: FaceColor = FaceColor::rgb(0.0, 1.0, 0.0);
    pub const BLUE: FaceColor = FaceColor::rgb(0.0, 0.0, 1.0);
    pub const ORANGE: FaceColor = FaceColor::rgb(1.0, 0.5, 0.0);
    pub const YELLOW: FaceColor = FaceColor::rgb(1.0, 1.0, 0.0);
    pub const BLACK: FaceColor = FaceColor::rgb(0.0, 0.0, 0.0);
}

/// Number of consecutive vertices sharing one color: two triangles.
pub const FACE_GROUP_LEN: usize = 6;

/// Color of each face group, indexed by group number modulo the table length.
///
/// The order follows the face emission order of the mesh, so for the
/// built-in cube the front face is red and the left face is black.
pub const FACE_PALETTE: [FaceColor; 6] = [
    FaceColor::RED,
    FaceColor::GREEN,
    FaceColor::BLUE,
    FaceColor::ORANGE,
    FaceColor::YELLOW,
    FaceColor::BLACK,
];

/// Returns the palette entry for the given face group.
pub fn face_color(group: usize) -> FaceColor {
    FACE_PALETTE[group % FACE_PALETTE.len()]
}

/// Flattened geometry ready for upload.
///
/// `positions` and `colors` always have the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssembledMesh {
    positions: Vec<Vertex>,
    colors: Vec<FaceColor>,
}

impl AssembledMesh {
    pub fn positions(&self) -> &[Vertex] {
        &self.positions
    }

    pub fn colors(&self) -> &[FaceColor] {
        &self.colors
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Expands an indexed triangle list into index-aligned position and color streams.
///
/// Normals in `geometry` are ignored. Fails if the index list is not a whole
/// number of triangles or references a point that does not exist.
pub fn assemble(geometry: &RawGeometry) -> Result<AssembledMesh, AssetLoadError> {
    geometry.validate()?;

    let positions: Vec<Vertex> = geometry
        .indices
        .iter()
        .map(|&i| Vertex::new(geometry.points[i as usize]))
        .collect();

    let colors = (0..positions.len())
        .map(|n| face_color(n / FACE_GROUP_LEN))
        .collect();

    Ok(AssembledMesh { positions, colors })
}

/// GPU-resident position and color buffers for an [`AssembledMesh`].
#[derive(Debug)]
pub struct ColoredMesh {
    pub(crate) position_buffer: wgpu::Buffer,
    pub(crate) color_buffer: wgpu::Buffer,
    pub(crate) vertex_count: u32,
}

impl ColoredMesh {
    /// Uploads both streams into static vertex buffers.
    pub fn upload(gpu: &GpuContext, mesh: &AssembledMesh) -> Self {
        use wgpu::util::DeviceExt;

        let position_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Position Buffer"),
                contents: bytemuck::cast_slice(mesh.positions()),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let color_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Color Buffer"),
                contents: bytemuck::cast_slice(mesh.colors()),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Self {
            position_buffer,
            color_buffer,
            vertex_count: mesh.vertex_count() as u32,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_stream_matches_vertex_stream() {
        let mesh = assemble(&RawGeometry::cube()).unwrap();
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.positions().len(), mesh.colors().len());
    }

    #[test]
    fn cube_has_six_runs_of_six_distinct_colors() {
        let mesh = assemble(&RawGeometry::cube()).unwrap();
        let runs: Vec<&[FaceColor]> = mesh.colors().chunks(FACE_GROUP_LEN).collect();
        assert_eq!(runs.len(), 6);

        for (group, run) in runs.iter().enumerate() {
            assert!(run.iter().all(|c| *c == run[0]));
            assert_eq!(run[0], FACE_PALETTE[group]);
        }

        for i in 0..runs.len() {
            for j in (i + 1)..runs.len() {
                assert_ne!(runs[i][0], runs[j][0]);
            }
        }
    }

    #[test]
    fn vertices_follow_index_order() {
        let geom = RawGeometry::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            vec![2, 0, 1, 1, 1, 2],
        );

        let mesh = assemble(&geom).unwrap();
        let positions: Vec<[f32; 3]> = mesh.positions().iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
            ]
        );
    }

    #[test]
    fn palette_cycles_past_six_groups() {
        let geom = RawGeometry::new(vec![[0.0; 3]], vec![], vec![0; 7 * FACE_GROUP_LEN + 3]);
        let mesh = assemble(&geom).unwrap();

        assert_eq!(mesh.colors()[6 * FACE_GROUP_LEN], FaceColor::RED);
        assert_eq!(mesh.colors()[7 * FACE_GROUP_LEN], FaceColor::GREEN);
        assert_eq!(mesh.colors().len(), mesh.positions().len());
    }

    #[test]
    fn out_of_range_index_fails() {
        let geom = RawGeometry::new(vec![[0.0; 3]; 2], vec![], vec![0, 1, 2]);
        assert!(matches!(
            assemble(&geom),
            Err(AssetLoadError::IndexOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn normals_do_not_affect_colors() {
        let mut flipped = RawGeometry::cube();
        for n in &mut flipped.normals {
            *n = [-n[0], -n[1], -n[2]];
        }
        assert_eq!(
            assemble(&flipped).unwrap().colors(),
            assemble(&RawGeometry::cube()).unwrap().colors()
        );
    }

    #[test]
    fn empty_index_list_assembles_to_nothing() {
        let mesh = assemble(&RawGeometry::default()).unwrap();
        assert!(mesh.is_empty());
    }
}
