//! wgpu state for the portfolio window: one instanced pipeline for the
//! gallery primitives, a depth buffer, and a screen-space panel pipeline
//! for the playback/photo overlays.

use std::{borrow::Cow, sync::Arc};

use anyhow::{Context, Result};
use bytemuck::cast_slice;
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

use crate::mesh::{
    MeshInstance, MeshPrimitive, MeshUniforms, PrimitiveKind, instance_layout, primitive,
    vertex_layout, view_projection_uniform,
};
use crate::panel::PanelCanvas;
use crate::shaders::{
    GALLERY_SHADER_SOURCE, PANEL_INDICES, PANEL_SHADER_SOURCE, PanelVertex, panel_vertices,
};
use crate::texture::prepare_rgba_upload;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.045,
    a: 1.0,
};

/// Per-frame instance lists, one per primitive shape.
#[derive(Debug, Default)]
pub struct FrameDraw {
    pub view_projection: Mat4,
    pub cubes: Vec<MeshInstance>,
    pub planes: Vec<MeshInstance>,
    pub spheres: Vec<MeshInstance>,
}

impl FrameDraw {
    pub fn total(&self) -> usize {
        self.cubes.len() + self.planes.len() + self.spheres.len()
    }

    pub fn push(&mut self, kind: PrimitiveKind, instance: MeshInstance) {
        match kind {
            PrimitiveKind::Cube => self.cubes.push(instance),
            PrimitiveKind::Plane => self.planes.push(instance),
            PrimitiveKind::Sphere => self.spheres.push(instance),
        }
    }
}

struct PrimitiveBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct PanelResources {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    index_buffer: wgpu::Buffer,
    active: Option<ActivePanel>,
}

struct ActivePanel {
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

pub struct RenderState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    gallery_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    cube: PrimitiveBuffers,
    plane: PrimitiveBuffers,
    sphere: PrimitiveBuffers,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    panel: PanelResources,
}

impl RenderState {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("creating wgpu surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .context("requesting wgpu adapter")?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("atrium-viewer-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("requesting wgpu device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Mailbox)
            .unwrap_or(wgpu::PresentMode::Fifo);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Opaque);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("gallery-uniform-layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<MeshUniforms>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let initial_uniform = view_projection_uniform(Mat4::IDENTITY);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gallery-uniform-buffer"),
            contents: cast_slice(&[initial_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gallery-uniform-bind-group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gallery-shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(GALLERY_SHADER_SOURCE)),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gallery-pipeline-layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });
        let gallery_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gallery-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "gallery_vs_main",
                buffers: &[vertex_layout(), instance_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "gallery_fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..wgpu::PrimitiveState::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let cube = upload_primitive(&device, "gallery-cube", primitive(PrimitiveKind::Cube));
        let plane = upload_primitive(&device, "gallery-plane", primitive(PrimitiveKind::Plane));
        let sphere = upload_primitive(&device, "gallery-sphere", primitive(PrimitiveKind::Sphere));

        let instance_capacity = 32usize;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gallery-instance-buffer"),
            size: (instance_capacity * std::mem::size_of::<MeshInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_view = create_depth_view(&device, size);
        let panel = create_panel_resources(&device, surface_format);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            gallery_pipeline,
            uniform_buffer,
            uniform_bind_group,
            depth_view,
            cube,
            plane,
            sphere,
            instance_buffer,
            instance_capacity,
            panel,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, new_size);
        // The panel rect is window-relative; rebuild it on next show.
        self.panel.active = None;
    }

    /// Upload a composed panel and place it centered in the window.
    pub fn show_panel(&mut self, canvas: &PanelCanvas) {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("panel-texture"),
            size: wgpu::Extent3d {
                width: canvas.width,
                height: canvas.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        match prepare_rgba_upload(canvas.width, canvas.height, canvas.pixels()) {
            Ok(upload) => {
                self.queue.write_texture(
                    wgpu::ImageCopyTexture {
                        texture: &texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    upload.pixels(),
                    wgpu::ImageDataLayout {
                        offset: 0,
                        bytes_per_row: Some(upload.bytes_per_row()),
                        rows_per_image: Some(canvas.height),
                    },
                    wgpu::Extent3d {
                        width: canvas.width,
                        height: canvas.height,
                        depth_or_array_layers: 1,
                    },
                );
            }
            Err(err) => {
                log::warn!("panel upload failed ({}x{}): {err}", canvas.width, canvas.height);
                return;
            }
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("panel-bind-group"),
            layout: &self.panel.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.panel.sampler),
                },
            ],
        });

        let vertices = centered_panel_vertices(self.size, canvas.width, canvas.height);
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("panel-vertex-buffer"),
                contents: cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        self.panel.active = Some(ActivePanel {
            bind_group,
            vertex_buffer,
            width: canvas.width,
            height: canvas.height,
        });
    }

    pub fn hide_panel(&mut self) {
        self.panel.active = None;
    }

    pub fn panel_size(&self) -> Option<(u32, u32)> {
        self.panel
            .active
            .as_ref()
            .map(|panel| (panel.width, panel.height))
    }

    fn ensure_instance_capacity(&mut self, needed: usize) {
        if needed <= self.instance_capacity {
            return;
        }
        let mut capacity = self.instance_capacity.max(1);
        while capacity < needed {
            capacity *= 2;
        }
        self.instance_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gallery-instance-buffer"),
            size: (capacity * std::mem::size_of::<MeshInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.instance_capacity = capacity;
    }

    pub fn render(&mut self, frame: &FrameDraw) -> Result<(), wgpu::SurfaceError> {
        let total = frame.total();
        self.ensure_instance_capacity(total);

        let uniform = view_projection_uniform(frame.view_projection);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, cast_slice(&[uniform]));

        let mut instances: Vec<MeshInstance> = Vec::with_capacity(total);
        instances.extend_from_slice(&frame.cubes);
        instances.extend_from_slice(&frame.planes);
        instances.extend_from_slice(&frame.spheres);
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, cast_slice(&instances));
        }

        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("atrium-frame-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gallery-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.gallery_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            let mut offset = 0u32;
            for (buffers, count) in [
                (&self.cube, frame.cubes.len() as u32),
                (&self.plane, frame.planes.len() as u32),
                (&self.sphere, frame.spheres.len() as u32),
            ] {
                if count == 0 {
                    continue;
                }
                pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
                pass.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..buffers.index_count, 0, offset..offset + count);
                offset += count;
            }
        }

        if let Some(active) = self.panel.active.as_ref() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("panel-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.panel.pipeline);
            pass.set_bind_group(0, &active.bind_group, &[]);
            pass.set_vertex_buffer(0, active.vertex_buffer.slice(..));
            pass.set_index_buffer(self.panel.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..PANEL_INDICES.len() as u32, 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

fn upload_primitive(
    device: &wgpu::Device,
    label: &str,
    primitive: MeshPrimitive,
) -> PrimitiveBuffers {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: cast_slice(&primitive.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: cast_slice(&primitive.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    PrimitiveBuffers {
        vertex_buffer,
        index_buffer,
        index_count: primitive.indices.len() as u32,
    }
}

fn create_depth_view(device: &wgpu::Device, size: PhysicalSize<u32>) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("gallery-depth-texture"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
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

fn create_panel_resources(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
) -> PanelResources {
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("panel-bind-group-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("panel-sampler"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..wgpu::SamplerDescriptor::default()
    });
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("panel-shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(PANEL_SHADER_SOURCE)),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("panel-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("panel-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PanelVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("panel-index-buffer"),
        contents: cast_slice(&PANEL_INDICES),
        usage: wgpu::BufferUsages::INDEX,
    });
    PanelResources {
        pipeline,
        bind_group_layout,
        sampler,
        index_buffer,
        active: None,
    }
}

/// NDC quad for a panel of the given pixel size centered in the window.
fn centered_panel_vertices(
    window: PhysicalSize<u32>,
    panel_width: u32,
    panel_height: u32,
) -> [PanelVertex; 4] {
    let win_width = window.width.max(1) as f32;
    let win_height = window.height.max(1) as f32;
    let half_w = (panel_width as f32 / win_width).min(1.0);
    let half_h = (panel_height as f32 / win_height).min(1.0);
    panel_vertices(-half_w, half_h, half_w, -half_h)
}
