/*
 *  buffer.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  Pixel buffer and conversion to/from displayable images
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

//! Raw interleaved RGB pixel matrix shared with editing modules.
//!
//! - `PixelBuffer`: owned bytes with explicit width, height and row stride.
//! - `to_buffer`: normalize a decoded image to 8-bit RGB.
//! - `from_buffer`: strip row padding back into an `RgbImage`.

use image::{DynamicImage, RgbImage};

use crate::error::EditorError;

/// Channels per pixel; every buffer is interleaved 8-bit RGB
pub const CHANNELS: u32 = 3;

/// Scanline alignment used by `to_buffer`
pub const ROW_ALIGN: usize = 4;

/// Owned 8-bit RGB buffer with row stride
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Construct a buffer over existing bytes, validating geometry.
    pub fn from_raw(width: u32, height: u32, stride: usize, data: Vec<u8>) -> Result<Self, EditorError> {
        if width == 0 || height == 0 {
            return Err(EditorError::UnsupportedFormat(format!(
                "empty image {}x{}",
                width, height
            )));
        }
        let row_bytes = width as usize * CHANNELS as usize;
        if stride < row_bytes {
            return Err(EditorError::BufferSizeMismatch {
                expected: row_bytes,
                actual: stride,
            });
        }
        let expected = stride * height as usize;
        if data.len() != expected {
            return Err(EditorError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, stride, data })
    }

    /// Zero-filled buffer with aligned rows
    pub fn new(width: u32, height: u32) -> Result<Self, EditorError> {
        let stride = aligned_stride(width);
        Self::from_raw(width, height, stride, vec![0; stride * height as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u32 {
        CHANNELS
    }

    /// Bytes per row including padding
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pixel bytes of row `y`, without padding
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * CHANNELS as usize]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let len = self.width as usize * CHANNELS as usize;
        &mut self.data[start..start + len]
    }

    /// RGB triple at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = y as usize * self.stride + x as usize * CHANNELS as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = y as usize * self.stride + x as usize * CHANNELS as usize;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

}

/// Row length rounded up to `ROW_ALIGN`
pub fn aligned_stride(width: u32) -> usize {
    let row = width as usize * CHANNELS as usize;
    row.div_ceil(ROW_ALIGN) * ROW_ALIGN
}

/// Normalize a decoded image into an aligned RGB buffer.
pub fn to_buffer(image: &DynamicImage) -> Result<PixelBuffer, EditorError> {
    let rgb = match image {
        DynamicImage::ImageRgb8(rgb) => rgb.clone(),
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgba8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_)
        | DynamicImage::ImageRgb32F(_)
        | DynamicImage::ImageRgba32F(_) => image.to_rgb8(),
        other => {
            return Err(EditorError::UnsupportedFormat(format!(
                "color layout {:?}",
                other.color()
            )));
        }
    };
    rgb_to_buffer(&rgb)
}

/// Copy an `RgbImage` into an aligned buffer
pub fn rgb_to_buffer(rgb: &RgbImage) -> Result<PixelBuffer, EditorError> {
    let (width, height) = rgb.dimensions();
    let mut buffer = PixelBuffer::new(width, height)?;
    let row_bytes = width as usize * CHANNELS as usize;
    for (y, src) in rgb.as_raw().chunks_exact(row_bytes).enumerate() {
        buffer.row_mut(y as u32).copy_from_slice(src);
    }
    Ok(buffer)
}

/// Pack a buffer back into a displayable image, dropping row padding.
pub fn from_buffer(buffer: &PixelBuffer) -> RgbImage {
    let row_bytes = buffer.width as usize * CHANNELS as usize;
    let mut packed = Vec::with_capacity(row_bytes * buffer.height as usize);
    for y in 0..buffer.height {
        packed.extend_from_slice(buffer.row(y));
    }
    // geometry is validated at construction, so the length always matches
    RgbImage::from_raw(buffer.width, buffer.height, packed)
        .unwrap_or_else(|| RgbImage::new(buffer.width, buffer.height))
}
