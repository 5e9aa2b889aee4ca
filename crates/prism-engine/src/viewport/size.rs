/// Render-surface size in pixels, after the pixel-ratio cap is applied.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero (minimized window, collapsed canvas).
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width / height, or `None` for an empty size.
    #[inline]
    pub fn aspect(self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }
}

/// Host viewport in logical pixels, plus the host scale factor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f64,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// Converts a host physical size into a logical viewport.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Self {
            width: (width as f64 / scale) as f32,
            height: (height as f64 / scale) as f32,
            scale_factor: scale,
        }
    }

    /// Scale factor clamped to `max_pixel_ratio`.
    #[inline]
    pub fn pixel_ratio(self, max_pixel_ratio: f64) -> f64 {
        self.scale_factor.min(max_pixel_ratio)
    }

    /// Pixel size of the render surface for this viewport.
    pub fn render_size(self, max_pixel_ratio: f64) -> ViewportSize {
        let ratio = self.pixel_ratio(max_pixel_ratio);
        ViewportSize::new(
            (self.width as f64 * ratio).round().max(0.0) as u32,
            (self.height as f64 * ratio).round().max(0.0) as u32,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_empty_size_is_none() {
        assert_eq!(ViewportSize::new(0, 600).aspect(), None);
        assert_eq!(ViewportSize::new(800, 0).aspect(), None);
    }

    #[test]
    fn aspect_is_width_over_height() {
        assert_eq!(ViewportSize::new(800, 400).aspect(), Some(2.0));
    }

    #[test]
    fn from_physical_divides_by_scale() {
        let v = Viewport::from_physical(2560, 1440, 2.0);
        assert_eq!(v.width, 1280.0);
        assert_eq!(v.height, 720.0);
    }

    #[test]
    fn from_physical_rejects_nonsense_scale() {
        let v = Viewport::from_physical(800, 600, 0.0);
        assert_eq!(v.scale_factor, 1.0);
        assert_eq!(v.width, 800.0);
    }

    #[test]
    fn render_size_caps_pixel_ratio() {
        // 3x display, capped at 2x.
        let v = Viewport::new(400.0, 300.0, 3.0);
        assert_eq!(v.render_size(2.0), ViewportSize::new(800, 600));
    }

    #[test]
    fn render_size_below_cap_uses_scale_factor() {
        let v = Viewport::new(400.0, 300.0, 1.5);
        assert_eq!(v.render_size(2.0), ViewportSize::new(600, 450));
    }
}
