use anyhow::{Context, Result};
use winit::window::Window;

use crate::app::{Application, ApplicationOptions};
use crate::camera::PerspectiveCamera;
use crate::compose::{ComposeError, Compositor, PassChain, PassKind};
use crate::device::GpuInit;
use crate::time::Ticker;
use crate::viewport::{ViewportMonitor, ViewportSize};

use super::backend::GpuBackend;
use super::mesh::MeshScene;
use super::passes::{FxaaPass, ScenePass};

/// Anti-aliasing only pays off on low-density displays; above 1.0 the extra
/// pixels already smooth edges.
#[inline]
pub fn antialias_enabled(scale_factor: f64) -> bool {
    scale_factor <= 1.0
}

/// The default chain: scene render followed by FXAA.
pub fn standard_chain<'w>(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    size: ViewportSize,
    antialias: bool,
) -> PassChain<GpuBackend<'w>> {
    let mut chain = PassChain::new();
    chain.add_pass(PassKind::fixed(ScenePass::new()));
    chain.add_pass_with(
        PassKind::resizable(FxaaPass::new(device, format, size)),
        antialias,
    );
    chain
}

/// Builds a GPU-backed application for `window`.
///
/// The AA pass is decided from the window's scale factor here and not
/// revisited when the window later moves to a different display.
pub fn create_application<'w>(
    window: &'w Window,
    options: ApplicationOptions,
    gpu_init: GpuInit,
    scene: MeshScene,
) -> Result<Application<'w, GpuBackend<'w>>> {
    options.validate()?;

    let physical = window.inner_size();
    let scale_factor = window.scale_factor();
    let viewport = ViewportMonitor::with_max_pixel_ratio(
        physical.width,
        physical.height,
        scale_factor,
        options.max_pixel_ratio,
    );
    let size = viewport.size();

    let backend = pollster::block_on(GpuBackend::create(window, gpu_init, size))
        .map_err(|err| ComposeError::Configuration(format!("{err:#}")))?;

    let mut camera = PerspectiveCamera::default();
    if let Some(aspect) = size.aspect() {
        camera.set_aspect(aspect);
        camera.update_projection();
    }

    let chain = {
        let gpu = backend.gpu().ok_or(ComposeError::Disposed)?;
        standard_chain(
            gpu.device(),
            gpu.surface_format(),
            size,
            antialias_enabled(scale_factor),
        )
    };

    log::info!(
        "render size {}x{} (scale {scale_factor}, pixel ratio {}), fxaa {}",
        size.width,
        size.height,
        viewport.pixel_ratio(),
        if antialias_enabled(scale_factor) { "on" } else { "off" },
    );

    let compositor = Compositor::new(backend, scene, camera, chain, options.compositor());
    Application::new(compositor, Ticker::new(), viewport).context("failed to start application")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antialias_only_at_standard_density() {
        assert!(antialias_enabled(1.0));
        assert!(antialias_enabled(0.75));
        assert!(!antialias_enabled(1.25));
        assert!(!antialias_enabled(2.0));
    }
}
