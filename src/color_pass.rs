//! Flat-colored mesh rendering with depth testing.
//!
//! [`ColorPass`] owns the pipeline, the two matrix uniforms and the depth
//! buffer. It reads two vertex buffers (positions and colors, see
//! [`ColoredMesh`]) and multiplies positions by `transform * model_view` in
//! the vertex shader.
//!
//! # Bindings
//!
//! | Group | Binding | Contents | Updated |
//! |-------|---------|----------|---------|
//! | 0     | 0       | projection / view transform | once, at startup |
//! | 0     | 1       | model-view rotation | every frame |
//!
//! [`SurfaceFrame`] adapts a pass to the [`FrameTarget`] interface used by
//! the [`FrameDriver`](crate::FrameDriver): `clear` acquires the next surface
//! texture, `draw_triangles` records the pass, submits it and presents.

use crate::frame::FrameTarget;
use crate::gpu::GpuContext;
use crate::mesh::{ColoredMesh, FaceColor, Vertex};
use crate::viewport::Viewport;
use glam::Mat4;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Background: white, fully transparent.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 0.0,
};

/// Pipeline and uniforms for drawing a [`ColoredMesh`].
pub struct ColorPass {
    pipeline: wgpu::RenderPipeline,
    transform_buffer: wgpu::Buffer,
    model_view_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl ColorPass {
    /// Creates the pipeline with both uniforms set to identity.
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Color Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/color.wgsl").into()),
        });

        let transform_buffer = Self::create_matrix_buffer(gpu, "Transform Uniform");
        let model_view_buffer = Self::create_matrix_buffer(gpu, "Model View Uniform");

        let matrix_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Color Bind Group Layout"),
            entries: &[matrix_entry(0), matrix_entry(1)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Color Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: transform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: model_view_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Color Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Color Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex::LAYOUT, FaceColor::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let depth_view = Self::create_depth_view(gpu);

        let pass = Self {
            pipeline,
            transform_buffer,
            model_view_buffer,
            bind_group,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        };
        pass.set_transform(gpu, Mat4::IDENTITY);
        pass.set_model_view(gpu, Mat4::IDENTITY);
        pass
    }

    fn create_matrix_buffer(gpu: &GpuContext, label: &str) -> wgpu::Buffer {
        gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<[[f32; 4]; 4]>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    // Depth attachments must match the surface, not the square viewport.
    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Recreates the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Writes the once-set projection / view transform.
    pub fn set_transform(&self, gpu: &GpuContext, transform: Mat4) {
        gpu.queue.write_buffer(
            &self.transform_buffer,
            0,
            bytemuck::cast_slice(&transform.to_cols_array_2d()),
        );
    }

    /// Writes the per-frame model-view rotation.
    pub fn set_model_view(&self, gpu: &GpuContext, model_view: Mat4) {
        gpu.queue.write_buffer(
            &self.model_view_buffer,
            0,
            bytemuck::cast_slice(&model_view.to_cols_array_2d()),
        );
    }

    /// Clears `target` and draws `vertex_count` vertices of `mesh` inside the
    /// square `viewport` anchored at the top-left corner.
    pub fn render(
        &self,
        gpu: &GpuContext,
        target: &wgpu::TextureView,
        mesh: &ColoredMesh,
        vertex_count: u32,
        viewport: Viewport,
    ) {
        // Never exceed the attachment, even if a resize is still in flight.
        let side = viewport.side().min(gpu.width()).min(gpu.height());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Color Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Color Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if side > 0 && vertex_count > 0 {
                // Origin is the top-left corner of the surface.
                render_pass.set_viewport(0.0, 0.0, side as f32, side as f32, 0.0, 1.0);
                render_pass.set_scissor_rect(0, 0, side, side);
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.position_buffer.slice(..));
                render_pass.set_vertex_buffer(1, mesh.color_buffer.slice(..));
                render_pass.draw(0..vertex_count.min(mesh.vertex_count), 0..1);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
    }
}

/// One frame on the window surface, driven through [`FrameTarget`].
pub struct SurfaceFrame<'a> {
    gpu: &'a GpuContext,
    pass: &'a mut ColorPass,
    mesh: &'a ColoredMesh,
    viewport: Viewport,
    output: Option<wgpu::SurfaceTexture>,
}

impl<'a> SurfaceFrame<'a> {
    pub fn new(
        gpu: &'a GpuContext,
        pass: &'a mut ColorPass,
        mesh: &'a ColoredMesh,
        viewport: Viewport,
    ) -> Self {
        Self {
            gpu,
            pass,
            mesh,
            viewport,
            output: None,
        }
    }
}

impl FrameTarget for SurfaceFrame<'_> {
    fn clear(&mut self) {
        if self.viewport.is_empty() {
            return;
        }
        self.pass.ensure_depth_size(self.gpu);

        match self.gpu.surface.get_current_texture() {
            Ok(output) => self.output = Some(output),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.gpu.reconfigure();
            }
            Err(e) => log::warn!("failed to get surface texture: {}", e),
        }
    }

    fn set_model_view(&mut self, model_view: Mat4) {
        self.pass.set_model_view(self.gpu, model_view);
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        let Some(output) = self.output.take() else {
            return;
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.pass
            .render(self.gpu, &view, self.mesh, vertex_count, self.viewport);
        output.present();
    }
}
