use crate::grid::{Cell, GridBuffer};
use crate::input::ForceSample;
use crate::pass::{GridPass, cell_position};
use glam::Vec2;

/// First pass of a tick: self-advection, pressure gradient, pointer force and
/// dye injection. The resulting velocity is not yet divergence-free.
///
/// There is no viscosity term. The bilinear backtrace dissipates enough on its
/// own to keep the field stable.
#[derive(Debug, Clone, Copy)]
pub struct AdvectForcePass {
    pub force: ForceSample,
    pub density: f32,
}

impl AdvectForcePass {
    pub fn new(force: ForceSample, density: f32) -> Self {
        Self { force, density }
    }
}

impl GridPass for AdvectForcePass {
    const NAME: &'static str = "advect_force";

    fn evaluate(&self, src: &GridBuffer, x: usize, y: usize) -> Cell {
        let p = cell_position(x, y);
        let c = src.get(x, y);
        let n = src.neighbors(x, y);

        // Single-step backtrace along the cell's own velocity.
        let advection = src.sample_velocity(p - c.velocity);

        let pressure_term = -Vec2::new(
            n.right.pressure - n.left.pressure,
            n.top.pressure - n.bottom.pressure,
        ) / (2.0 * self.density);

        let factor = self.force.falloff(p);
        let force_term = self.force.force_vector * factor;

        Cell {
            velocity: advection + pressure_term + force_term,
            pressure: c.pressure,
            dye: (c.dye + self.force.feed * factor).clamp(0.0, 1.0),
        }
    }
}
