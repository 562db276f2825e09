use anyhow::{ensure, Result};
use bytes::Bytes;

/// A decoded camera frame in packed `rgb24` layout.
#[derive(Debug, Clone)]
pub struct RgbFrame {
    width: u32,
    height: u32,
    data: Bytes,
}

impl RgbFrame {
    pub fn new(width: u32, height: u32, data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        ensure!(width > 0 && height > 0, "frame dimensions must be non-zero");
        ensure!(
            data.len() == width as usize * height as usize * 3,
            "frame of {}x{} expects {} bytes, got {}",
            width,
            height,
            width as usize * height as usize * 3,
            data.len()
        );

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn get_width(&self) -> u32 {
        self.width
    }

    pub fn get_height(&self) -> u32 {
        self.height
    }

    /// Pixel at column `x`, row `y`. Callers keep the coordinates in bounds.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let index = (y * self.width as usize + x) * 3;
        [self.data[index], self.data[index + 1], self.data[index + 2]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(RgbFrame::new(2, 2, vec![0u8; 11]).is_err());
        assert!(RgbFrame::new(0, 2, Vec::<u8>::new()).is_err());
    }

    #[test]
    fn reads_pixels_row_major() {
        let data: Vec<u8> = (0..18).collect();
        let frame = RgbFrame::new(3, 2, data).unwrap();
        assert_eq!(frame.pixel(0, 0), [0, 1, 2]);
        assert_eq!(frame.pixel(2, 0), [6, 7, 8]);
        assert_eq!(frame.pixel(1, 1), [12, 13, 14]);
    }
}
