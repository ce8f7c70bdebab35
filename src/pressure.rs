use crate::grid::{Cell, GridBuffer};
use crate::pass::GridPass;

/// One Jacobi sweep of the pressure Poisson equation.
///
/// Only reads the previous sweep's pressure, so the result is meaningful only
/// once the whole sweep budget for the tick has run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PressureRelaxationPass;

impl GridPass for PressureRelaxationPass {
    const NAME: &'static str = "pressure_relaxation";

    fn evaluate(&self, src: &GridBuffer, x: usize, y: usize) -> Cell {
        let c = src.get(x, y);
        let n = src.neighbors(x, y);

        let divergence = (n.right.velocity.x - n.left.velocity.x + n.top.velocity.y
            - n.bottom.velocity.y)
            / 2.0;
        let pressure =
            (n.top.pressure + n.bottom.pressure + n.left.pressure + n.right.pressure - divergence)
                / 4.0;

        Cell { pressure, ..*c }
    }
}
