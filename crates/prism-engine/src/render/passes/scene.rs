use anyhow::Result;

use crate::compose::{Pass, PassContext, PassSource, PassTarget};
use crate::render::GpuBackend;

/// Draws the scene into the pass target.
///
/// Ignores its source: the scene is always drawn fresh from geometry. Placing it
/// after another pass overwrites that pass's output.
#[derive(Debug, Default)]
pub struct ScenePass;

impl ScenePass {
    pub fn new() -> Self {
        Self
    }
}

impl<'w> Pass<GpuBackend<'w>> for ScenePass {
    fn name(&self) -> &str {
        "scene"
    }

    fn execute(
        &mut self,
        ctx: &mut PassContext<'_, GpuBackend<'w>>,
        source: PassSource,
        target: PassTarget,
    ) -> Result<()> {
        if source != PassSource::Scene {
            log::trace!("scene pass ignores {source:?}");
        }
        ctx.backend.draw_scene(ctx.frame, ctx.scene, ctx.camera, target)
    }
}
