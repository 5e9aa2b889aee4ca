use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::app::{Application, ApplicationOptions};
use crate::device::GpuInit;
use crate::render::{GpuBackend, MeshScene, create_application};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window showing `scene` and drives it until the window closes.
    ///
    /// Returns the first error that ended the loop, if any.
    pub fn run(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        options: ApplicationOptions,
        scene: MeshScene,
    ) -> Result<()> {
        options.validate()?;

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, options, scene);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[not_covariant]
    app: Application<'this, GpuBackend<'this>>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    options: ApplicationOptions,
    scene: MeshScene,

    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl AppState {
    fn new(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        options: ApplicationOptions,
        scene: MeshScene,
    ) -> Self {
        Self {
            config,
            gpu_init,
            options,
            scene,
            entry: None,
            failure: None,
            exit_requested: false,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let options = self.options;
        let scene = self.scene.clone();

        let entry = WindowEntryTryBuilder {
            window,
            app_builder: |w| create_application(w, options, gpu_init, scene),
        }
        .try_build()?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    /// Disposes the application (once) and drops the window.
    fn shutdown(&mut self) {
        if let Some(mut entry) = self.entry.take() {
            entry.with_app_mut(|app| {
                if let Err(e) = app.dispose() {
                    log::warn!("dispose failed: {e:#}");
                }
            });
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.shutdown();
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        self.exit_requested = true;
        event_loop.exit();
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.shutdown();
        self.exit_requested = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e.context("failed to create initial window"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; the surface's FIFO present paces the loop.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        let result: Result<()> = match &event {
            WindowEvent::CloseRequested => {
                self.exit(event_loop);
                return;
            }

            WindowEvent::Resized(new_size) => entry.with_mut(|fields| {
                let scale = fields.window.scale_factor();
                fields
                    .app
                    .resize(new_size.width, new_size.height, scale)
                    .map(|_| fields.window.request_redraw())
            }),

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => entry.with_mut(|fields| {
                let size = fields.window.inner_size();
                fields
                    .app
                    .resize(size.width, size.height, *scale_factor)
                    .map(|_| fields.window.request_redraw())
            }),

            WindowEvent::Occluded(false) => {
                entry.with_app_mut(|app| app.reset_clock());
                Ok(())
            }

            WindowEvent::RedrawRequested => {
                entry.with_app_mut(|app| app.tick().map(|_| ()))
            }

            _ => Ok(()),
        };

        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }
}
