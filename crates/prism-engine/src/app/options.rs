use crate::compose::{ComposeError, CompositorOptions};
use crate::viewport::DEFAULT_MAX_PIXEL_RATIO;

/// Construction options exposed to the host.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ApplicationOptions {
    /// Render through the pass chain instead of straight to the display.
    pub use_composer: bool,

    /// Cap applied to the host scale factor when sizing the render surface.
    pub max_pixel_ratio: f64,
}

impl ApplicationOptions {
    /// Rejects values that would leave the application half-configured.
    pub fn validate(&self) -> Result<(), ComposeError> {
        if !self.max_pixel_ratio.is_finite() || self.max_pixel_ratio <= 0.0 {
            return Err(ComposeError::Configuration(format!(
                "max_pixel_ratio must be a positive number, got {}",
                self.max_pixel_ratio
            )));
        }
        Ok(())
    }

    pub fn compositor(&self) -> CompositorOptions {
        CompositorOptions {
            use_composer: self.use_composer,
        }
    }
}

impl Default for ApplicationOptions {
    fn default() -> Self {
        Self {
            use_composer: true,
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
        }
    }
}
