use crate::grid::{Cell, GridBuffer};
use image::{ImageBuffer, Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Colour mapping applied to each cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Dye as grey level, tinted by a tenth of the packed (vx, vy, pressure).
    #[default]
    Dye = 0,
    /// Packed (vx, vy, pressure) offset to mid-grey.
    Velocity = 1,
}

impl RenderMode {
    /// Integer flag form: 1 selects velocity, anything else dye.
    pub fn from_flag(flag: u32) -> Self {
        if flag == 1 {
            RenderMode::Velocity
        } else {
            RenderMode::Dye
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Dye => RenderMode::Velocity,
            RenderMode::Velocity => RenderMode::Dye,
        }
    }
}

/// Linear RGBA for one cell. Not clamped.
pub fn shade(cell: &Cell, mode: RenderMode) -> [f32; 4] {
    let packed = [cell.velocity.x, cell.velocity.y, cell.pressure];
    match mode {
        RenderMode::Dye => [
            cell.dye + packed[0] * 0.1,
            cell.dye + packed[1] * 0.1,
            cell.dye + packed[2] * 0.1,
            1.0,
        ],
        RenderMode::Velocity => [packed[0] + 0.5, packed[1] + 0.5, packed[2] + 0.5, 1.0],
    }
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Visualizer {
    pub mode: RenderMode,
}

impl Visualizer {
    pub fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    /// One colour per cell, in buffer order (row 0 is the bottom row).
    pub fn colors(&self, buffer: &GridBuffer) -> Vec<[f32; 4]> {
        buffer
            .cells()
            .par_iter()
            .map(|cell| shade(cell, self.mode))
            .collect()
    }

    /// Packed RGBA8 with the first row at the top of the image, so the grid's
    /// bottom-left origin ends up bottom-left on screen.
    pub fn to_rgba8(&self, buffer: &GridBuffer) -> Vec<u8> {
        let width = buffer.width();
        let mut bytes = vec![0u8; buffer.cells().len() * 4];
        bytes
            .par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(row, out)| {
                let y = buffer.height() - 1 - row;
                for x in 0..width {
                    let rgba = shade(buffer.get(x, y), self.mode);
                    for (channel, value) in rgba.iter().enumerate() {
                        out[x * 4 + channel] = to_byte(*value);
                    }
                }
            });
        bytes
    }

    /// Renders with nearest-neighbour upscaling by an integer factor.
    pub fn render_image(&self, buffer: &GridBuffer, scale: u32) -> RgbaImage {
        let scale = scale.max(1);
        let width = buffer.width() as u32 * scale;
        let height = buffer.height() as u32 * scale;
        let bytes = self.to_rgba8(buffer);
        let row_bytes = buffer.width() * 4;

        ImageBuffer::from_fn(width, height, |px, py| {
            let idx = (py / scale) as usize * row_bytes + (px / scale) as usize * 4;
            Rgba([bytes[idx], bytes[idx + 1], bytes[idx + 2], bytes[idx + 3]])
        })
    }
}
