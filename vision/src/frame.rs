//! Raster primitives.
//!
//! A `Frame` is an immutable owned RGB snapshot of (part of) the screen.
//! Frames are created per capture and discarded after use; cropping always
//! produces a new `Frame` and never mutates or aliases the source. Crop
//! rectangles must lie fully inside the frame — out-of-bounds requests fail
//! instead of being clamped, so a misplaced anchor can never silently turn
//! into a click on the wrong region.

use anyhow::Context as _;

use crate::error::Error;

/// Owned RGB raster (no alpha).
#[derive(Clone, Debug)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl Frame {
    /// Build a `Frame` from tightly packed RGBA bytes (alpha is discarded).
    ///
    /// This is the capture ingestion path: `width * height * 4` bytes.
    pub fn from_rgba(width: usize, bytes: &[u8]) -> Self {
        let height = bytes.len() / width / 4;
        let data = bytes
            .chunks_exact(4)
            .map(|v| Color::new(v[0], v[1], v[2]))
            .collect::<Vec<_>>();

        Self {
            width: width as u32,
            height: height as u32,
            data,
        }
    }

    /// Build a `Frame` from a raw pixel buffer. Panics if the buffer size
    /// does not match the dimensions; only used by in-crate constructors.
    pub(crate) fn from_pixels(width: u32, height: u32, data: Vec<Color>) -> Self {
        assert_eq!(data.len(), (width * height) as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Decode an encoded image (PNG and friends) into a frame.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let img = image::load_from_memory(bytes)
            .map_err(|err| Error::recognition(format!("decode image: {err}")))?
            .to_rgb8();
        let (width, height) = img.dimensions();
        let data = img
            .pixels()
            .map(|p| Color::new(p.0[0], p.0[1], p.0[2]))
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.data[(x + y * self.width) as usize]
    }

    /// Extract `rect` as a new frame.
    ///
    /// The rectangle must lie entirely within this frame; anything else is a
    /// hard error, never a clamp.
    pub fn crop(&self, rect: Rect) -> Result<Self, Error> {
        if rect.width == 0
            || rect.height == 0
            || rect.x.checked_add(rect.width).is_none_or(|r| r > self.width)
            || rect.y.checked_add(rect.height).is_none_or(|b| b > self.height)
        {
            return Err(Error::OutOfBounds {
                rect,
                width: self.width,
                height: self.height,
            });
        }

        let mut data = Vec::with_capacity((rect.width * rect.height) as usize);
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                data.push(self.pixel(x, y));
            }
        }

        Ok(Self {
            width: rect.width,
            height: rect.height,
            data,
        })
    }

    /// Convert to a grayscale `GrayImage` (luma).
    pub fn to_gray_image(&self) -> image::GrayImage {
        use image::{GrayImage, Luma};
        let mut out = GrayImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.put_pixel(x, y, Luma([self.pixel(x, y).luma()]));
            }
        }
        out
    }

    /// Create an RGB frame from a grayscale image (each pixel repeated into RGB).
    pub fn from_gray(gray: &image::GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let data = gray.pixels().map(|p| {
            let v = p.0[0];
            Color::new(v, v, v)
        });
        Self {
            width: w,
            height: h,
            data: data.collect(),
        }
    }

    /// Tightly packed RGB bytes (3 per pixel).
    pub fn rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 3);
        for clr in &self.data {
            bytes.push(clr.r);
            bytes.push(clr.g);
            bytes.push(clr.b);
        }
        bytes
    }

    /// Resize to the given height, preserving aspect ratio.
    ///
    /// Uses `fast_image_resize` (SIMD-optimized); OCR generally performs
    /// better on larger glyphs, so small text crops get upscaled first.
    pub fn resized_to_height(&self, height: u32) -> Self {
        if self.height == height {
            return self.clone();
        }

        let height = height.max(1);
        let width = (self.width as u64 * height as u64 / self.height.max(1) as u64).max(1) as u32;

        // SAFETY: `Color` is `#[repr(C)]` with 3 x `u8`, so it is layout-compatible
        // with `fast_image_resize::pixels::U8x3` (alignment 1).
        let src_pixels = unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr() as *const fast_image_resize::pixels::U8x3,
                self.data.len(),
            )
        };

        let src =
            fast_image_resize::images::ImageRef::from_pixels(self.width, self.height, src_pixels)
                .expect("fast_image_resize: ImageRef::from_pixels failed");

        let mut dst =
            fast_image_resize::images::Image::new(width, height, fast_image_resize::PixelType::U8x3);

        let mut resizer = fast_image_resize::Resizer::new();
        let options = fast_image_resize::ResizeOptions::new().resize_alg(
            fast_image_resize::ResizeAlg::Interpolation(fast_image_resize::FilterType::CatmullRom),
        );

        resizer
            .resize(&src, &mut dst, &Some(options))
            .expect("fast_image_resize: resize failed");

        let bytes: Vec<u8> = dst.into_vec();
        let data = bytes
            .chunks_exact(3)
            .map(|px| Color::new(px[0], px[1], px[2]))
            .collect();

        Self {
            width,
            height,
            data,
        }
    }

    /// Write this frame as a PNG (diagnostic snapshots).
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let img = image::RgbImage::from_raw(self.width, self.height, self.rgb_bytes())
            .context("RgbImage::from_raw failed")?;
        img.save_with_format(path, image::ImageFormat::Png)
            .context("save png")?;
        Ok(())
    }
}

// ----------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Compute luma (grayscale intensity).
    pub fn luma(&self) -> u8 {
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        ((299 * r + 587 * g + 114 * b) / 1000) as u8
    }

    /// Per-channel box tolerance check.
    pub fn within_tolerance(&self, other: Color, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
    }
}

/// Axis-aligned rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.x + self.width / 2) as i32,
            y: (self.y + self.height / 2) as i32,
        }
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// A point in frame coordinates. Signed so anchor-relative offsets can be
/// applied without intermediate casts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}
