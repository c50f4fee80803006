use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, error, info, warn};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::faults::{FaultTracker, GpuFault};
use super::{FilterUniforms, FrameOutcome, FrameRenderer};
use crate::error::Error;
use crate::processing::transform::{QuadCorners, QuadVertex, triangle_list};
use crate::tasks::loader::{Assets, PreparedImage};

const VERTEX_COUNT: u32 = 6;

/// Dark grey behind the quad.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.2,
    b: 0.2,
    a: 1.0,
};

struct Tex {
    view: wgpu::TextureView,
}

/// wgpu-backed [`FrameRenderer`] drawing one textured quad per frame.
pub struct QuadRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    vbuf: wgpu::Buffer,
    uniforms: wgpu::Buffer,
    // one bind group per image; the border and sampler are shared
    bind_groups: Vec<wgpu::BindGroup>,
    active: usize,
    scope_open: bool,
    faults: FaultTracker,
}

impl QuadRenderer {
    /// Create the surface, device, textures and pipeline for `window`.
    ///
    /// # Errors
    /// Fails when no adapter/device is available, an image exceeds the
    /// device's texture limit, or the shader does not compile. All of these
    /// are fatal before the first frame.
    pub fn new(window: Arc<Window>, assets: &Assets, gpu_error_limit: Option<u32>) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to acquire GPU adapter")?;

        let adapter_info = adapter.get_info();
        info!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            driver = %adapter_info.driver,
            driver_info = %adapter_info.driver_info,
            "gpu adapter selected"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("viewer-device"),
            required_limits: adapter.limits(),
            ..Default::default()
        }))
        .context("failed to acquire GPU device")?;
        assets.check_texture_limit(device.limits().max_texture_dimension_2d)?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|fmt| fmt.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            width = config.width,
            height = config.height,
            format = ?config.format,
            "viewer surface configured",
        );

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quad-bind-layout"),
            entries: &[
                texture_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline = build_pipeline(&device, &bind_layout, format, &assets.shader_source)?;

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quad-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("filter-uniforms"),
            size: std::mem::size_of::<FilterUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let vbuf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad-vertices"),
            size: (std::mem::size_of::<QuadVertex>() * VERTEX_COUNT as usize) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let border = upload_texture(&device, &queue, &assets.border);
        let bind_groups = assets
            .images
            .iter()
            .map(|image| {
                let tex = upload_texture(&device, &queue, image);
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("quad-bind-group"),
                    layout: &bind_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&tex.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(&border.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: uniforms.as_entire_binding(),
                        },
                    ],
                })
            })
            .collect::<Vec<_>>();
        debug!(textures = bind_groups.len(), "image textures uploaded");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            vbuf,
            uniforms,
            bind_groups,
            active: 0,
            scope_open: false,
            faults: FaultTracker::new(gpu_error_limit),
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.config.width = new_size.width.max(1);
        self.config.height = new_size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        debug!(
            width = self.config.width,
            height = self.config.height,
            "viewer surface resized",
        );
    }

    fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    // Errors from every call between the first upload and the present land
    // in these scopes; popped once per frame in `draw_quad`.
    fn open_scope(&mut self) {
        if self.scope_open {
            return;
        }
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        self.scope_open = true;
    }

    fn close_scope(&mut self) -> Vec<(GpuFault, String)> {
        if !self.scope_open {
            return Vec::new();
        }
        self.scope_open = false;
        let validation = pollster::block_on(self.device.pop_error_scope());
        let oom = pollster::block_on(self.device.pop_error_scope());
        [validation, oom]
            .into_iter()
            .flatten()
            .map(|err| (GpuFault::classify(&err), err.to_string()))
            .collect()
    }

    fn present(&mut self) -> Result<FrameOutcome> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Outdated | SurfaceError::Lost) => {
                info!("viewer surface lost; reconfiguring");
                self.resize(self.size());
                return Ok(FrameOutcome::Skipped);
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("viewer surface out of memory");
                bail!("surface out of memory");
            }
            Err(SurfaceError::Timeout) => {
                warn!("viewer surface acquisition timed out");
                return Ok(FrameOutcome::Skipped);
            }
            Err(SurfaceError::Other) => {
                warn!("viewer surface reported an unknown error; retrying");
                self.resize(self.size());
                return Ok(FrameOutcome::Skipped);
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("viewer-encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_groups[self.active], &[]);
            pass.set_vertex_buffer(0, self.vbuf.slice(..));
            pass.draw(0..VERTEX_COUNT, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(FrameOutcome::Presented)
    }
}

impl FrameRenderer for QuadRenderer {
    fn upload_vertices(&mut self, corners: &QuadCorners) {
        self.open_scope();
        let vertices = triangle_list(corners);
        self.queue
            .write_buffer(&self.vbuf, 0, bytemuck::cast_slice(&vertices));
    }

    fn bind_texture(&mut self, image_index: usize) {
        self.open_scope();
        if image_index < self.bind_groups.len() {
            self.active = image_index;
        } else {
            warn!(image_index, "no texture loaded for image index");
        }
    }

    fn set_uniforms(&mut self, uniforms: &FilterUniforms) {
        self.open_scope();
        self.queue
            .write_buffer(&self.uniforms, 0, bytemuck::bytes_of(uniforms));
    }

    fn draw_quad(&mut self) -> Result<FrameOutcome> {
        self.open_scope();
        let outcome = self.present();
        let faults = self.close_scope();
        let outcome = outcome?;
        self.faults.record(&faults)?;
        Ok(outcome)
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Compile `source` and link it into the quad pipeline, surfacing any
/// validation failure as [`Error::ShaderCompile`].
fn build_pipeline(
    device: &wgpu::Device,
    bind_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
    source: &str,
) -> Result<wgpu::RenderPipeline> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("quad-shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("quad-pipeline-layout"),
        bind_group_layouts: &[bind_layout],
        push_constant_ranges: &[],
    });
    let vlayout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
    };
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("quad-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[vlayout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        error!(error = %err, "shader compile/link failed");
        return Err(Error::ShaderCompile(err.to_string()).into());
    }
    Ok(pipeline)
}

fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, image: &PreparedImage) -> Tex {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("image"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        tex.as_image_copy(),
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        size,
    );
    Tex {
        view: tex.create_view(&wgpu::TextureViewDescriptor::default()),
    }
}
