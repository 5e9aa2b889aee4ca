//! Recording backend and passes for exercising the compose core without a GPU.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use crate::camera::PerspectiveCamera;
use crate::time::FrameTime;
use crate::viewport::ViewportSize;

use super::{Animate, Backend, ComposeError, Pass, PassContext, PassSource, PassTarget, ResizablePass};

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

pub(crate) fn recorder() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) struct MockScene {
    pub ticks: u32,
    log: Log,
}

impl MockScene {
    pub fn new(log: &Log) -> Self {
        Self {
            ticks: 0,
            log: Rc::clone(log),
        }
    }
}

impl Animate for MockScene {
    fn advance(&mut self, _time: &FrameTime) {
        self.ticks += 1;
        self.log.borrow_mut().push("scene.advance".into());
    }
}

pub(crate) struct MockBackend {
    pub log: Log,
    pub surface: ViewportSize,
    pub buffers: ViewportSize,
    pub max_buffer_dimension: u32,
    pub skip_frames: bool,
    pub released: u32,
    next_frame: u64,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            log: recorder(),
            surface: ViewportSize::new(800, 600),
            buffers: ViewportSize::new(800, 600),
            max_buffer_dimension: 8192,
            skip_frames: false,
            released: 0,
            next_frame: 0,
        }
    }

    fn push(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl Backend for MockBackend {
    type Scene = MockScene;
    type Frame = u64;

    fn begin_frame(&mut self) -> Result<Option<u64>> {
        if self.skip_frames {
            self.push("begin_frame: skipped".into());
            return Ok(None);
        }
        let frame = self.next_frame;
        self.next_frame += 1;
        self.push(format!("begin_frame {frame}"));
        Ok(Some(frame))
    }

    fn end_frame(&mut self, frame: u64) -> Result<()> {
        self.push(format!("end_frame {frame}"));
        Ok(())
    }

    fn render(&mut self, _scene: &MockScene, _camera: &PerspectiveCamera) -> Result<()> {
        self.push("render direct".into());
        Ok(())
    }

    fn check_resize(&self, size: ViewportSize) -> Result<()> {
        if size.width > self.max_buffer_dimension || size.height > self.max_buffer_dimension {
            return Err(ComposeError::BufferAllocation {
                what: "render targets",
                width: size.width,
                height: size.height,
                reason: format!("exceeds {}", self.max_buffer_dimension),
            }
            .into());
        }
        Ok(())
    }

    fn resize_surface(&mut self, size: ViewportSize) -> Result<()> {
        self.push(format!("surface {}x{}", size.width, size.height));
        self.surface = size;
        Ok(())
    }

    fn resize_buffers(&mut self, size: ViewportSize) -> Result<()> {
        if size.width > self.max_buffer_dimension || size.height > self.max_buffer_dimension {
            return Err(ComposeError::BufferAllocation {
                what: "composition buffers",
                width: size.width,
                height: size.height,
                reason: format!("exceeds {}", self.max_buffer_dimension),
            }
            .into());
        }
        self.push(format!("buffers {}x{}", size.width, size.height));
        self.buffers = size;
        Ok(())
    }

    fn release(&mut self) {
        self.push("release".into());
        self.released += 1;
    }
}

pub(crate) struct MockPass {
    name: String,
    log: Log,
    fail: bool,
    log_drop: bool,
}

impl MockPass {
    pub fn new(name: &str, log: &Log) -> Self {
        Self {
            name: name.to_string(),
            log: Rc::clone(log),
            fail: false,
            log_drop: false,
        }
    }

    /// Logs "{name}.drop" when dropped.
    pub fn tracking_drop(name: &str, log: &Log) -> Self {
        let mut pass = Self::new(name, log);
        pass.log_drop = true;
        pass
    }

    pub fn failing(name: &str, log: &Log) -> Self {
        let mut pass = Self::new(name, log);
        pass.fail = true;
        pass
    }
}

impl Drop for MockPass {
    fn drop(&mut self) {
        if self.log_drop {
            self.log.borrow_mut().push(format!("{}.drop", self.name));
        }
    }
}

impl Pass<MockBackend> for MockPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &mut self,
        _ctx: &mut PassContext<'_, MockBackend>,
        source: PassSource,
        target: PassTarget,
    ) -> Result<()> {
        if self.fail {
            anyhow::bail!("{} exploded", self.name);
        }
        self.log
            .borrow_mut()
            .push(format!("{}: {source:?} -> {target:?}", self.name));
        Ok(())
    }
}

pub(crate) struct MockResizablePass {
    inner: MockPass,
}

impl MockResizablePass {
    pub fn new(name: &str, log: &Log) -> Self {
        Self {
            inner: MockPass::new(name, log),
        }
    }

    pub fn tracking_drop(name: &str, log: &Log) -> Self {
        Self {
            inner: MockPass::tracking_drop(name, log),
        }
    }
}

impl Pass<MockBackend> for MockResizablePass {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn execute(
        &mut self,
        ctx: &mut PassContext<'_, MockBackend>,
        source: PassSource,
        target: PassTarget,
    ) -> Result<()> {
        self.inner.execute(ctx, source, target)
    }
}

impl ResizablePass<MockBackend> for MockResizablePass {
    fn resize(&mut self, size: ViewportSize, camera: &PerspectiveCamera) -> Result<()> {
        self.inner.log.borrow_mut().push(format!(
            "{}.resize {}x{} aspect {:.3}",
            self.inner.name, size.width, size.height, camera.aspect
        ));
        Ok(())
    }
}
