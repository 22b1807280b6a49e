//! Surface pixel frames and damage geometry
//!
//! Represents pixels read back from a client surface, plus the damage
//! rectangles a client declared dirty since its previous commit.

use std::fmt;

use smithay::backend::allocator::Fourcc;
use smithay::utils::{Buffer, Rectangle};

/// Pixel format of a readback frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 32-bit BGRA, 8 bits per channel, no padding rows
    #[default]
    Bgra,
}

impl PixelFormat {
    /// The DRM fourcc requested from the renderer for this format.
    pub fn fourcc(&self) -> Fourcc {
        match self {
            PixelFormat::Bgra => Fourcc::Abgr8888,
        }
    }

    pub fn bits_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::Bgra => 32,
        }
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        self.bits_per_pixel() / 8
    }
}

/// Pixels read back from a single client surface.
///
/// The buffer is freshly allocated per readback; whoever receives the
/// frame owns it, the compositor keeps no reference.
#[derive(Clone)]
pub struct SurfaceImage {
    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Row length in bytes, always `bytes_per_pixel * width`
    pub stride: u32,

    /// Pixel format of `bytes`
    pub format: PixelFormat,

    /// Raw pixel data, `stride * height` bytes
    pub bytes: Vec<u8>,
}

impl SurfaceImage {
    pub fn new(width: u32, height: u32, bytes: Vec<u8>) -> Self {
        let format = PixelFormat::default();
        Self {
            width,
            height,
            stride: format.bytes_per_pixel() * width,
            format,
            bytes,
        }
    }
}

impl fmt::Display for SurfaceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SurfaceImage({}x{}, stride={}, {} bytes)",
            self.width,
            self.height,
            self.stride,
            self.bytes.len()
        )
    }
}

impl fmt::Debug for SurfaceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("format", &self.format)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// A damage rectangle in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl From<Rectangle<i32, Buffer>> for DamageRect {
    fn from(rect: Rectangle<i32, Buffer>) -> Self {
        Self {
            x: rect.loc.x,
            y: rect.loc.y,
            w: rect.size.w,
            h: rect.size.h,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_stride_is_four_times_width() {
        let image = SurfaceImage::new(4, 2, vec![0u8; 32]);
        assert_eq!(image.stride, 16);
        assert_eq!(image.bytes.len() as u32, image.stride * image.height);
    }

    #[test]
    fn bgra_is_32bpp() {
        assert_eq!(PixelFormat::Bgra.bits_per_pixel(), 32);
        assert_eq!(PixelFormat::Bgra.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Bgra.fourcc(), Fourcc::Abgr8888);
    }

    #[test]
    fn damage_rect_from_rectangle() {
        let rect = Rectangle::<i32, Buffer>::new((1, 2).into(), (3, 4).into());
        assert_eq!(
            DamageRect::from(rect),
            DamageRect {
                x: 1,
                y: 2,
                w: 3,
                h: 4
            }
        );
    }
}
