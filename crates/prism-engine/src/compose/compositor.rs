use anyhow::{Context, Result};

use crate::camera::PerspectiveCamera;
use crate::time::FrameTime;
use crate::viewport::ViewportSize;

use super::{Animate, Backend, ComposeError, PassChain, PassContext};

/// Compositor configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CompositorOptions {
    /// Render through the pass chain (`true`) or straight to the display (`false`).
    ///
    /// This is a configuration switch, not a fallback: with `false` the chain is
    /// never executed or resized.
    pub use_composer: bool,
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self { use_composer: true }
    }
}

/// Owns the pass chain, scene, camera and backend; renders one frame per tick.
pub struct Compositor<B: Backend> {
    backend: B,
    scene: B::Scene,
    camera: PerspectiveCamera,
    chain: PassChain<B>,
    options: CompositorOptions,
    disposed: bool,
}

impl<B: Backend> Compositor<B> {
    /// Takes ownership of every collaborator and resolves the chain once.
    pub fn new(
        backend: B,
        scene: B::Scene,
        camera: PerspectiveCamera,
        mut chain: PassChain<B>,
        options: CompositorOptions,
    ) -> Self {
        chain.resolve();
        log::info!(
            "compositor ready: {} pass(es), {} enabled, composer {}",
            chain.len(),
            chain.enabled_count(),
            if options.use_composer { "on" } else { "off" },
        );

        Self {
            backend,
            scene,
            camera,
            chain,
            options,
            disposed: false,
        }
    }

    #[inline]
    pub fn uses_composer(&self) -> bool {
        self.options.use_composer
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn chain(&self) -> &PassChain<B> {
        &self.chain
    }

    /// Mutable chain access. Toggled passes take effect after `resolve()`, or at
    /// the latest on the next composed frame.
    pub fn chain_mut(&mut self) -> &mut PassChain<B> {
        &mut self.chain
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn scene(&self) -> &B::Scene {
        &self.scene
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            return Err(ComposeError::Disposed.into());
        }
        Ok(())
    }

    /// Advances the scene and renders one frame.
    ///
    /// In composed mode the chain runs through the backend's offscreen buffers;
    /// with no enabled pass it degrades to a direct render for this frame.
    pub fn on_tick(&mut self, time: &FrameTime) -> Result<()> {
        self.ensure_live()?;

        self.scene.advance(time);

        if !self.options.use_composer || self.chain.enabled_count() == 0 {
            return self
                .backend
                .render(&self.scene, &self.camera)
                .context("direct render failed");
        }

        let Some(mut frame) = self.backend.begin_frame()? else {
            log::debug!("frame {} skipped", time.frame_index);
            return Ok(());
        };

        {
            let mut ctx = PassContext {
                backend: &mut self.backend,
                frame: &mut frame,
                scene: &self.scene,
                camera: &self.camera,
            };
            self.chain.execute(&mut ctx)?;
        }

        self.backend.end_frame(frame)
    }

    /// Propagates a new render size.
    ///
    /// Order: camera projection, display surface, then (composed mode only) every
    /// resizable pass in chain order followed by the offscreen buffers.
    /// An empty size only updates the surface; the rest waits for a real size.
    /// The size is checked against the backend first, so a rejected size leaves
    /// camera, surface, passes and buffers as they were.
    pub fn on_resize(&mut self, size: ViewportSize) -> Result<()> {
        self.ensure_live()?;

        let Some(aspect) = size.aspect() else {
            log::debug!("resize to empty viewport; deferring");
            return self.backend.resize_surface(size);
        };

        self.backend
            .check_resize(size)
            .with_context(|| format!("cannot resize to {}x{}", size.width, size.height))?;

        self.camera.set_aspect(aspect);
        self.camera.update_projection();

        self.backend
            .resize_surface(size)
            .context("failed to resize display surface")?;

        if self.options.use_composer {
            let resized = self.chain.resize(size, &self.camera)?;
            self.backend
                .resize_buffers(size)
                .context("failed to resize composition buffers")?;
            log::debug!(
                "resized to {}x{} ({resized} pass(es) notified)",
                size.width,
                size.height
            );
        }

        Ok(())
    }

    /// Releases backend resources, then drops every pass together with its GPU
    /// state. Only the first call does anything; later calls, and every other
    /// method afterwards, return [`ComposeError::Disposed`].
    pub fn dispose(&mut self) -> Result<()> {
        self.ensure_live()?;

        self.backend.release();
        let passes = self.chain.clear();
        self.disposed = true;
        log::info!("compositor disposed ({passes} pass(es) released)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::testing::{Log, MockBackend, MockPass, MockResizablePass, MockScene};
    use crate::compose::PassKind;
    use crate::time::FrameClock;

    fn compositor(use_composer: bool, aa_enabled: bool) -> (Compositor<MockBackend>, Log) {
        let backend = MockBackend::new();
        let log = backend.log.clone();

        let mut chain = PassChain::new();
        chain.add_pass(PassKind::fixed(MockPass::new("render", &log)));
        chain.add_pass_with(
            PassKind::resizable(MockResizablePass::new("aa", &log)),
            aa_enabled,
        );

        let compositor = Compositor::new(
            backend,
            MockScene::new(&log),
            PerspectiveCamera::default(),
            chain,
            CompositorOptions { use_composer },
        );
        (compositor, log)
    }

    fn frame() -> FrameTime {
        FrameClock::new().tick()
    }

    fn is_disposed_error(err: &anyhow::Error) -> bool {
        err.downcast_ref::<ComposeError>() == Some(&ComposeError::Disposed)
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn construction_resolves_chain() {
        let (c, _) = compositor(true, true);
        assert!(!c.chain().is_dirty());
        assert_eq!(c.chain().screen_pass().map(|id| id.index()), Some(1));
    }

    // ── on_tick ───────────────────────────────────────────────────────────

    #[test]
    fn composed_tick_runs_chain_inside_one_frame() {
        let (mut c, log) = compositor(true, true);
        c.on_tick(&frame()).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "scene.advance",
                "begin_frame 0",
                "render: Scene -> Buffer(A)",
                "aa: Buffer(A) -> Screen",
                "end_frame 0",
            ]
        );
    }

    #[test]
    fn direct_tick_bypasses_chain() {
        let (mut c, log) = compositor(false, true);
        c.on_tick(&frame()).unwrap();

        assert_eq!(*log.borrow(), vec!["scene.advance", "render direct"]);
    }

    #[test]
    fn composed_tick_with_aa_disabled_renders_scene_to_screen() {
        let (mut c, log) = compositor(true, false);
        c.on_tick(&frame()).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["scene.advance", "begin_frame 0", "render: Scene -> Screen", "end_frame 0"]
        );
    }

    #[test]
    fn composed_tick_with_no_enabled_pass_falls_back_to_direct() {
        let (mut c, log) = compositor(true, false);
        let render = c.chain().iter().next().map(|(id, _)| id).unwrap();
        c.chain_mut().set_enabled(render, false).unwrap();
        c.chain_mut().resolve();

        c.on_tick(&frame()).unwrap();
        assert_eq!(*log.borrow(), vec!["scene.advance", "render direct"]);
    }

    #[test]
    fn skipped_frame_still_advances_scene() {
        let (mut c, log) = compositor(true, true);
        c.backend.skip_frames = true;

        c.on_tick(&frame()).unwrap();
        assert_eq!(*log.borrow(), vec!["scene.advance", "begin_frame: skipped"]);
        assert_eq!(c.scene().ticks, 1);
    }

    #[test]
    fn toggling_pass_between_ticks_moves_screen_output() {
        let (mut c, log) = compositor(true, true);
        let aa = c.chain().screen_pass().unwrap();
        c.chain_mut().set_enabled(aa, false).unwrap();

        c.on_tick(&frame()).unwrap();
        assert!(log.borrow().contains(&"render: Scene -> Screen".to_string()));
    }

    // ── on_resize ─────────────────────────────────────────────────────────

    #[test]
    fn resize_in_direct_mode_skips_passes_and_buffers() {
        let (mut c, log) = compositor(false, true);
        c.on_resize(ViewportSize::new(1024, 512)).unwrap();

        assert_eq!(*log.borrow(), vec!["surface 1024x512"]);
        assert_eq!(c.camera().aspect, 2.0);
        assert_eq!(c.backend().buffers, ViewportSize::new(800, 600));
    }

    #[test]
    fn resize_in_composed_mode_orders_camera_surface_passes_buffers() {
        let (mut c, log) = compositor(true, true);
        c.on_resize(ViewportSize::new(1024, 512)).unwrap();

        // The pass logs the camera aspect it observed: already 2.0.
        assert_eq!(
            *log.borrow(),
            vec!["surface 1024x512", "aa.resize 1024x512 aspect 2.000", "buffers 1024x512"]
        );
    }

    #[test]
    fn resize_reaches_disabled_resizable_pass() {
        let (mut c, log) = compositor(true, false);
        c.on_resize(ViewportSize::new(300, 300)).unwrap();

        assert!(log.borrow().contains(&"aa.resize 300x300 aspect 1.000".to_string()));
    }

    #[test]
    fn buffer_exhaustion_surfaces_error_and_applies_nothing() {
        let (mut c, log) = compositor(true, true);
        c.on_resize(ViewportSize::new(800, 600)).unwrap();
        log.borrow_mut().clear();
        let aspect = c.camera().aspect;
        let projection = c.camera().projection();
        c.backend.max_buffer_dimension = 2048;

        let err = c.on_resize(ViewportSize::new(4096, 1024)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ComposeError>(),
            Some(ComposeError::BufferAllocation { .. })
        ));

        assert_eq!(c.camera().aspect, aspect);
        assert_eq!(c.camera().projection(), projection);
        assert_eq!(c.backend().surface, ViewportSize::new(800, 600));
        assert_eq!(c.backend().buffers, ViewportSize::new(800, 600));
        assert!(log.borrow().is_empty(), "touched: {:?}", log.borrow());

        // Still usable afterwards, and a fitting size goes through.
        c.on_tick(&frame()).unwrap();
        c.on_resize(ViewportSize::new(2048, 1024)).unwrap();
        assert_eq!(c.camera().aspect, 2.0);
    }

    #[test]
    fn oversized_resize_in_direct_mode_leaves_surface_alone() {
        let (mut c, log) = compositor(false, true);
        c.backend.max_buffer_dimension = 2048;

        assert!(c.on_resize(ViewportSize::new(4096, 1024)).is_err());
        assert!(log.borrow().is_empty());
        assert_eq!(c.backend().surface, ViewportSize::new(800, 600));
    }

    #[test]
    fn empty_resize_leaves_camera_and_passes_alone() {
        let (mut c, log) = compositor(true, true);
        let aspect = c.camera().aspect;

        c.on_resize(ViewportSize::new(0, 0)).unwrap();

        assert_eq!(c.camera().aspect, aspect);
        assert_eq!(*log.borrow(), vec!["surface 0x0"]);
    }

    // ── dispose ───────────────────────────────────────────────────────────

    #[test]
    fn dispose_releases_once_and_guards_later_calls() {
        let (mut c, _) = compositor(true, true);
        c.dispose().unwrap();
        assert!(c.is_disposed());

        assert!(is_disposed_error(&c.dispose().unwrap_err()));
        assert!(is_disposed_error(&c.on_tick(&frame()).unwrap_err()));
        assert!(is_disposed_error(
            &c.on_resize(ViewportSize::new(10, 10)).unwrap_err()
        ));
        assert_eq!(c.backend().released, 1);
    }

    #[test]
    fn dispose_drops_passes_after_release() {
        let backend = MockBackend::new();
        let log = backend.log.clone();

        let mut chain = PassChain::new();
        chain.add_pass(PassKind::fixed(MockPass::tracking_drop("render", &log)));
        chain.add_pass(PassKind::resizable(MockResizablePass::tracking_drop("aa", &log)));

        let mut c = Compositor::new(
            backend,
            MockScene::new(&log),
            PerspectiveCamera::default(),
            chain,
            CompositorOptions::default(),
        );
        c.dispose().unwrap();

        assert_eq!(*log.borrow(), vec!["release", "render.drop", "aa.drop"]);
        assert!(c.chain().is_empty());
    }
}
