use crate::grid::{Cell, GridBuffer};
use crate::pass::{GridPass, cell_position};
use glam::Vec2;

/// Last pass of a tick: subtract the relaxed pressure gradient, then carry
/// the dye along the corrected velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionAdvectDyePass;

impl GridPass for ProjectionAdvectDyePass {
    const NAME: &'static str = "projection_advect_dye";

    fn evaluate(&self, src: &GridBuffer, x: usize, y: usize) -> Cell {
        let c = src.get(x, y);
        let n = src.neighbors(x, y);

        let gradient = Vec2::new(
            n.right.pressure - n.left.pressure,
            n.top.pressure - n.bottom.pressure,
        );
        let velocity = c.velocity - 0.5 * gradient;

        // Dye is read from the pre-pass buffer along the corrected velocity.
        let dye = src.sample_dye(cell_position(x, y) - velocity);

        Cell {
            velocity,
            pressure: c.pressure,
            dye: dye.clamp(0.0, 1.0),
        }
    }
}
