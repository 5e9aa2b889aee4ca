use anyhow::{Context, Result, bail, ensure};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::camera::PerspectiveCamera;
use crate::compose::{Backend, ComposeError, PassTarget};
use crate::device::{Gpu, GpuFrame, GpuInit};
use crate::viewport::ViewportSize;

use super::buffers::{CompositionBuffers, DepthTarget, check_size};
use super::mesh::MeshScene;
use super::mesh_renderer::{MeshRenderer, MeshTarget};

/// GPU state that only exists until the backend is released.
pub(crate) struct GpuResources<'w> {
    pub gpu: Gpu<'w>,
    pub buffers: CompositionBuffers,
    pub depth: DepthTarget,
    pub mesh: MeshRenderer,
}

/// wgpu implementation of [`Backend`].
///
/// Owns the display surface, the depth target shared by every scene draw and
/// the two composition buffers. Surface and buffers always share one format.
pub struct GpuBackend<'w> {
    resources: Option<GpuResources<'w>>,
    clear_color: wgpu::Color,
}

impl<'w> GpuBackend<'w> {
    pub const DEFAULT_CLEAR: wgpu::Color = wgpu::Color {
        r: 0.02,
        g: 0.02,
        b: 0.03,
        a: 1.0,
    };

    /// Creates the device for `window` and sizes every target to `size`.
    pub async fn create(window: &'w Window, init: GpuInit, size: ViewportSize) -> Result<Self> {
        let gpu = Gpu::new(window, init).await?;
        Self::new(gpu, size)
    }

    pub fn new(mut gpu: Gpu<'w>, size: ViewportSize) -> Result<Self> {
        let size = if size.is_empty() {
            ViewportSize::new(1, 1)
        } else {
            size
        };

        gpu.resize(PhysicalSize::new(size.width, size.height))
            .context("failed to size display surface")?;

        let max = gpu.max_texture_dimension();
        let buffers = CompositionBuffers::new(gpu.device(), gpu.surface_format(), size, max)?;
        let depth = DepthTarget::new(gpu.device(), size, max)?;

        Ok(Self {
            resources: Some(GpuResources {
                gpu,
                buffers,
                depth,
                mesh: MeshRenderer::new(),
            }),
            clear_color: Self::DEFAULT_CLEAR,
        })
    }

    /// Device handle, e.g. for building passes. `None` once released.
    pub fn gpu(&self) -> Option<&Gpu<'w>> {
        self.resources.as_ref().map(|r| &r.gpu)
    }

    pub(crate) fn resources(&self) -> Result<&GpuResources<'w>, ComposeError> {
        self.resources.as_ref().ok_or(ComposeError::Disposed)
    }

    fn resources_mut(&mut self) -> Result<&mut GpuResources<'w>, ComposeError> {
        self.resources.as_mut().ok_or(ComposeError::Disposed)
    }

    /// Draws `scene` into the display surface or one of the composition buffers.
    pub fn draw_scene(
        &mut self,
        frame: &mut GpuFrame,
        scene: &MeshScene,
        camera: &PerspectiveCamera,
        target: PassTarget,
    ) -> Result<()> {
        let clear = self.clear_color;
        let res = self.resources_mut()?;

        let depth_size = res.depth.size();
        let color = match target {
            PassTarget::Screen => {
                let surface = res.gpu.size();
                ensure!(
                    surface.width == depth_size.width && surface.height == depth_size.height,
                    "surface {}x{} does not match depth target {}x{}",
                    surface.width,
                    surface.height,
                    depth_size.width,
                    depth_size.height
                );
                &frame.view
            }
            PassTarget::Buffer(slot) => {
                let size = res.buffers.size();
                ensure!(
                    size == depth_size,
                    "composition buffers {}x{} do not match depth target {}x{}",
                    size.width,
                    size.height,
                    depth_size.width,
                    depth_size.height
                );
                res.buffers.view(slot)
            }
        };

        res.mesh.draw(
            res.gpu.device(),
            res.gpu.queue(),
            res.gpu.surface_format(),
            &mut frame.encoder,
            MeshTarget {
                color,
                depth: &res.depth.view,
                clear,
            },
            scene,
            camera,
        );
        Ok(())
    }
}

impl<'w> Backend for GpuBackend<'w> {
    type Scene = MeshScene;
    type Frame = GpuFrame;

    fn begin_frame(&mut self) -> Result<Option<GpuFrame>> {
        let res = self.resources_mut()?;

        let size = res.gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(None);
        }

        match res.gpu.begin_frame() {
            Ok(frame) => Ok(Some(frame)),
            Err(err) => {
                let message = err.to_string();
                let action = res.gpu.handle_surface_error(err);
                if action.is_recoverable() {
                    Ok(None)
                } else {
                    bail!("fatal surface error: {message}")
                }
            }
        }
    }

    fn end_frame(&mut self, frame: GpuFrame) -> Result<()> {
        self.resources()?.gpu.submit(frame);
        Ok(())
    }

    fn render(&mut self, scene: &MeshScene, camera: &PerspectiveCamera) -> Result<()> {
        let Some(mut frame) = self.begin_frame()? else {
            return Ok(());
        };
        self.draw_scene(&mut frame, scene, camera, PassTarget::Screen)?;
        self.end_frame(frame)
    }

    fn check_resize(&self, size: ViewportSize) -> Result<()> {
        let max = self.resources()?.gpu.max_texture_dimension();
        // Surface, depth and composition buffers all share the render size.
        check_size("render targets", size, max)?;
        Ok(())
    }

    fn resize_surface(&mut self, size: ViewportSize) -> Result<()> {
        let res = self.resources_mut()?;
        res.gpu.resize(PhysicalSize::new(size.width, size.height))?;

        if !size.is_empty() && res.depth.size() != size {
            res.depth = DepthTarget::new(res.gpu.device(), size, res.gpu.max_texture_dimension())?;
        }
        Ok(())
    }

    fn resize_buffers(&mut self, size: ViewportSize) -> Result<()> {
        let res = self.resources_mut()?;
        let max = res.gpu.max_texture_dimension();
        res.buffers.resize(res.gpu.device(), size, max)?;
        Ok(())
    }

    fn release(&mut self) {
        if self.resources.take().is_some() {
            log::info!("gpu resources released");
        }
    }
}
