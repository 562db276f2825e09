use crate::utils::frame::RgbFrame;
use anyhow::{ensure, Result};
use rayon::prelude::*;

/// Grey used for letterbox padding, already normalised.
const PAD_VALUE: f32 = 114.0 / 255.0;

/// A square CHW tensor holding a letterboxed frame, plus the transform back to
/// frame coordinates.
#[derive(Debug, Clone)]
pub struct LetterboxTensor {
    pub data: Vec<f32>,
    pub size: usize,
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl LetterboxTensor {
    pub fn to_frame(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

pub trait ExtraToTensor {
    fn extra_letterbox_tensor(&self, size: usize) -> Result<LetterboxTensor>;
}

impl ExtraToTensor for RgbFrame {
    fn extra_letterbox_tensor(&self, size: usize) -> Result<LetterboxTensor> {
        ensure!(size > 0, "tensor size must be non-zero");

        let (width, height) = (self.get_width() as usize, self.get_height() as usize);
        let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
        let scaled_width = ((width as f32 * scale) as usize).clamp(1, size);
        let scaled_height = ((height as f32 * scale) as usize).clamp(1, size);
        let pad_x = (size - scaled_width) / 2;
        let pad_y = (size - scaled_height) / 2;

        let plane = size * size;
        let mut data = vec![PAD_VALUE; plane * 3];
        let (red, rest) = data.split_at_mut(plane);
        let (green, blue) = rest.split_at_mut(plane);

        red.par_chunks_mut(size)
            .zip(green.par_chunks_mut(size))
            .zip(blue.par_chunks_mut(size))
            .enumerate()
            .for_each(|(row, ((red, green), blue))| {
                if row < pad_y || row >= pad_y + scaled_height {
                    return;
                }
                // nearest neighbour sampling
                let source_y = ((((row - pad_y) as f32 + 0.5) / scale) as usize).min(height - 1);
                for column in pad_x..pad_x + scaled_width {
                    let source_x =
                        ((((column - pad_x) as f32 + 0.5) / scale) as usize).min(width - 1);
                    let [r, g, b] = self.pixel(source_x, source_y);
                    red[column] = r as f32 / 255.0;
                    green[column] = g as f32 / 255.0;
                    blue[column] = b as f32 / 255.0;
                }
            });

        Ok(LetterboxTensor {
            data,
            size,
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
        })
    }
}
