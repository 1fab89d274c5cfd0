use crate::foundation::error::{ClipgridError, ClipgridResult};

/// An 8-bit frame buffer, tightly packed and row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub data: Vec<u8>,
}

impl Frame {
    /// Wrap `data`, checking the channel count and buffer length.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> ClipgridResult<Self> {
        if channels != 3 && channels != 4 {
            return Err(ClipgridError::kernel(format!(
                "frames must have 3 or 4 channels, got {channels}"
            )));
        }
        if width == 0 || height == 0 {
            return Err(ClipgridError::kernel("frame dimensions must be non-zero"));
        }
        let expected = byte_len(width, height, channels);
        if data.len() != expected {
            return Err(ClipgridError::kernel(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height}x{channels}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Opaque black frame.
    pub fn black(width: u32, height: u32, channels: u8) -> ClipgridResult<Self> {
        let mut data = vec![0u8; byte_len(width, height, channels)];
        if channels == 4 {
            data.chunks_exact_mut(4).for_each(|px| px[3] = 255);
        }
        Self::new(width, height, channels, data)
    }

    pub fn stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Bytes of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels as usize;
        let i = y as usize * self.stride() + x as usize * c;
        &self.data[i..i + c]
    }

    pub fn same_shape(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height && self.channels == other.channels
    }

    /// Copy an RGB image into a frame.
    pub fn from_rgb_image(img: &image::RgbImage) -> ClipgridResult<Self> {
        Self::new(img.width(), img.height(), 3, img.as_raw().clone())
    }

    pub fn from_rgba_image(img: &image::RgbaImage) -> ClipgridResult<Self> {
        Self::new(img.width(), img.height(), 4, img.as_raw().clone())
    }

    /// Convert to an RGB image for encoding, dropping alpha if present.
    pub fn to_rgb_image(&self) -> ClipgridResult<image::RgbImage> {
        let data = if self.channels == 3 {
            self.data.clone()
        } else {
            self.data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect()
        };
        image::RgbImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| ClipgridError::kernel("frame buffer does not match its dimensions"))
    }
}

fn byte_len(width: u32, height: u32, channels: u8) -> usize {
    width as usize * height as usize * channels as usize
}
