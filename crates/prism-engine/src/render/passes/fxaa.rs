use anyhow::{Result, bail};
use bytemuck::{Pod, Zeroable};

use crate::camera::PerspectiveCamera;
use crate::compose::{Pass, PassContext, PassSource, PassTarget, ResizablePass};
use crate::render::GpuBackend;
use crate::viewport::ViewportSize;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct FxaaParams {
    texel: [f32; 2],
    _pad: [f32; 2],
}

impl FxaaParams {
    fn for_size(size: ViewportSize) -> Self {
        let w = size.width.max(1) as f32;
        let h = size.height.max(1) as f32;
        Self {
            texel: [1.0 / w, 1.0 / h],
            _pad: [0.0; 2],
        }
    }
}

/// Fast approximate anti-aliasing over the previous pass's output.
///
/// Needs a buffer source; it cannot be the first enabled pass of a chain.
pub struct FxaaPass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_ubo: wgpu::Buffer,
    params: FxaaParams,
    params_dirty: bool,
}

impl FxaaPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: ViewportSize) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("prism fxaa shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/fxaa.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism fxaa bgl"),
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
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<FxaaParams>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism fxaa pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("prism fxaa pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let params_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism fxaa params"),
            size: std::mem::size_of::<FxaaParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            bind_group_layout,
            params_ubo,
            params: FxaaParams::for_size(size),
            params_dirty: true,
        }
    }
}

impl<'w> Pass<GpuBackend<'w>> for FxaaPass {
    fn name(&self) -> &str {
        "fxaa"
    }

    fn execute(
        &mut self,
        ctx: &mut PassContext<'_, GpuBackend<'w>>,
        source: PassSource,
        target: PassTarget,
    ) -> Result<()> {
        let PassSource::Buffer(input) = source else {
            bail!("fxaa needs a previous pass to read from");
        };

        let res = ctx.backend.resources()?;
        let device = res.gpu.device();

        if self.params_dirty {
            res.gpu
                .queue()
                .write_buffer(&self.params_ubo, 0, bytemuck::bytes_of(&self.params));
            self.params_dirty = false;
        }

        // Views are recreated on resize, so the bind group is rebuilt per frame.
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism fxaa bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(res.buffers.view(input)),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(res.buffers.sampler()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.params_ubo.as_entire_binding(),
                },
            ],
        });

        let frame = &mut *ctx.frame;
        let output = match target {
            PassTarget::Screen => &frame.view,
            PassTarget::Buffer(slot) => res.buffers.view(slot),
        };

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism fxaa pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.draw(0..3, 0..1);
        Ok(())
    }
}

impl<'w> ResizablePass<GpuBackend<'w>> for FxaaPass {
    fn resize(&mut self, size: ViewportSize, _camera: &PerspectiveCamera) -> Result<()> {
        let params = FxaaParams::for_size(size);
        if params != self.params {
            self.params = params;
            self.params_dirty = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texel_is_inverse_of_size() {
        let p = FxaaParams::for_size(ViewportSize::new(800, 400));
        assert_eq!(p.texel, [1.0 / 800.0, 1.0 / 400.0]);
    }

    #[test]
    fn texel_never_divides_by_zero() {
        let p = FxaaParams::for_size(ViewportSize::new(0, 0));
        assert_eq!(p.texel, [1.0, 1.0]);
    }

    #[test]
    fn params_match_uniform_layout() {
        assert_eq!(std::mem::size_of::<FxaaParams>(), 16);
    }
}
