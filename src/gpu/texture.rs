//! GPU textures used by the tracer: the storage render target and the
//! sampled sky.

use crate::accumulation::TargetAllocator;
use crate::error::TracerError;

/// Format the trace kernel writes samples in.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// A 2D texture and its default view.
pub struct GpuTexture {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl GpuTexture {
    /// Create a float RGBA texture the trace kernel can write and the
    /// compositor can read.
    #[must_use]
    pub fn storage_target(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Trace Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Create a render-attachment texture that later passes can read.
    #[must_use]
    pub fn render_target(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Upload tightly packed RGBA8 sRGB pixels as a sampled texture.
    ///
    /// # Errors
    ///
    /// [`TracerError::InvalidTargetSize`] if `data` does not hold exactly
    /// `width * height` pixels.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        data: &[u8],
        label: &str,
    ) -> Result<Self, TracerError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(TracerError::InvalidTargetSize { width, height });
        }
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            width,
            height,
        })
    }

    /// Vertical horizon-to-zenith gradient, used when no sky image is set.
    ///
    /// # Errors
    ///
    /// Never fails for the fixed size used here; the `Result` mirrors
    /// [`Self::from_rgba8`].
    pub fn gradient_sky(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Self, TracerError> {
        let pixels = gradient_sky_pixels(SKY_HEIGHT);
        Self::from_rgba8(device, queue, 1, SKY_HEIGHT, &pixels, "Gradient Sky")
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
}

const SKY_HEIGHT: u32 = 64;
const ZENITH: [f32; 3] = [0.32, 0.52, 0.86];
const HORIZON: [f32; 3] = [0.86, 0.9, 0.96];
const GROUND: [f32; 3] = [0.3, 0.28, 0.26];

/// Equirectangular rows, top row is straight up.
fn gradient_sky_pixels(height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(height as usize * 4);
    let half = (height / 2).max(1) as f32;
    for row in 0..height {
        let color = if row < height / 2 {
            let t = row as f32 / half;
            mix(ZENITH, HORIZON, t)
        } else {
            GROUND
        };
        for c in color {
            pixels.push((c.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
        pixels.push(255);
    }
    pixels
}

fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Allocates trace targets on a wgpu device.
pub struct GpuTargetAllocator {
    device: wgpu::Device,
}

impl GpuTargetAllocator {
    /// Allocator bound to `device`.
    #[must_use]
    pub fn new(device: wgpu::Device) -> Self {
        Self { device }
    }
}

impl TargetAllocator for GpuTargetAllocator {
    type Target = GpuTexture;

    fn allocate(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<GpuTexture, TracerError> {
        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(TracerError::TargetAllocation {
                width,
                height,
                reason: format!("exceeds device limit of {max} pixels"),
            });
        }

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let target = GpuTexture::storage_target(&self.device, width, height);
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            target.texture.destroy();
            return Err(TracerError::TargetAllocation {
                width,
                height,
                reason: err.to_string(),
            });
        }
        log::debug!("allocated {width}x{height} trace target");
        Ok(target)
    }

    fn release(&mut self, target: GpuTexture) {
        log::debug!(
            "released {}x{} trace target",
            target.width(),
            target.height()
        );
        target.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_has_one_rgba_pixel_per_row() {
        let pixels = gradient_sky_pixels(SKY_HEIGHT);
        assert_eq!(pixels.len(), SKY_HEIGHT as usize * 4);
        assert!(pixels.chunks(4).all(|p| p[3] == 255));
    }

    #[test]
    fn gradient_brightens_toward_horizon() {
        let pixels = gradient_sky_pixels(SKY_HEIGHT);
        let top = &pixels[0..4];
        let below_top = ((SKY_HEIGHT / 2 - 1) * 4) as usize;
        let near_horizon = &pixels[below_top..below_top + 4];
        assert!(near_horizon[0] > top[0]);
        let bottom = ((SKY_HEIGHT - 1) * 4) as usize;
        assert_eq!(pixels[bottom], (GROUND[0] * 255.0).round() as u8);
    }
}
