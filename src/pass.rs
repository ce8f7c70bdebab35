use crate::grid::{Cell, GridBuffer};
use glam::Vec2;

/// A per-cell compute pass: a pure function of the read buffer.
///
/// `evaluate` may only look at the cell itself and its axis neighbours (plus
/// whatever the semi-Lagrangian sampling touches), never at cells written by
/// the same pass, so every cell can be evaluated concurrently.
pub trait GridPass: Sync {
    const NAME: &'static str;

    fn evaluate(&self, src: &GridBuffer, x: usize, y: usize) -> Cell;
}

/// Position of cell `(x, y)` in grid space.
#[inline]
pub fn cell_position(x: usize, y: usize) -> Vec2 {
    Vec2::new(x as f32, y as f32)
}
