use crate::compose::{BufferSlot, ComposeError};
use crate::viewport::ViewportSize;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Validates a size for a 2D allocation.
pub(crate) fn check_size(what: &'static str, size: ViewportSize, max_dimension: u32) -> Result<(), ComposeError> {
    let reason = if size.is_empty() {
        "zero-sized".to_string()
    } else if size.width > max_dimension || size.height > max_dimension {
        format!("exceeds device limit of {max_dimension}px")
    } else {
        return Ok(());
    };

    Err(ComposeError::BufferAllocation {
        what,
        width: size.width,
        height: size.height,
        reason,
    })
}

fn extent(size: ViewportSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

struct ColorBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl ColorBuffer {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: ViewportSize,
        label: &'static str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _texture: texture,
            view,
        }
    }
}

/// The two ping-pong offscreen targets passes render into.
///
/// Both share the surface format so any pass pipeline can target either the
/// buffers or the display surface.
pub struct CompositionBuffers {
    a: ColorBuffer,
    b: ColorBuffer,
    sampler: wgpu::Sampler,
    format: wgpu::TextureFormat,
    size: ViewportSize,
}

impl CompositionBuffers {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: ViewportSize,
        max_dimension: u32,
    ) -> Result<Self, ComposeError> {
        check_size("composition buffers", size, max_dimension)?;

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("prism composition sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            a: ColorBuffer::new(device, format, size, "prism composition buffer A"),
            b: ColorBuffer::new(device, format, size, "prism composition buffer B"),
            sampler,
            format,
            size,
        })
    }

    /// Reallocates both buffers. On error the current buffers are kept.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        size: ViewportSize,
        max_dimension: u32,
    ) -> Result<(), ComposeError> {
        if size == self.size {
            return Ok(());
        }
        check_size("composition buffers", size, max_dimension)?;

        let a = ColorBuffer::new(device, self.format, size, "prism composition buffer A");
        let b = ColorBuffer::new(device, self.format, size, "prism composition buffer B");
        self.a = a;
        self.b = b;
        self.size = size;
        Ok(())
    }

    pub fn view(&self, slot: BufferSlot) -> &wgpu::TextureView {
        match slot {
            BufferSlot::A => &self.a.view,
            BufferSlot::B => &self.b.view,
        }
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }
}

/// Depth attachment matching the display surface size.
pub(crate) struct DepthTarget {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    size: ViewportSize,
}

impl DepthTarget {
    pub fn new(
        device: &wgpu::Device,
        size: ViewportSize,
        max_dimension: u32,
    ) -> Result<Self, ComposeError> {
        check_size("depth buffer", size, max_dimension)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("prism depth"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            _texture: texture,
            view,
            size,
        })
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_check_accepts_limit() {
        assert!(check_size("x", ViewportSize::new(4096, 4096), 4096).is_ok());
    }

    #[test]
    fn size_check_rejects_oversized() {
        let err = check_size("composition buffers", ViewportSize::new(9000, 10), 8192).unwrap_err();
        assert_eq!(
            err,
            ComposeError::BufferAllocation {
                what: "composition buffers",
                width: 9000,
                height: 10,
                reason: "exceeds device limit of 8192px".into(),
            }
        );
    }

    #[test]
    fn size_check_rejects_empty() {
        assert!(matches!(
            check_size("depth buffer", ViewportSize::new(0, 10), 8192),
            Err(ComposeError::BufferAllocation { .. })
        ));
    }
}
