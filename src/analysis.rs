use crate::export::FluidData;

#[derive(Debug, Clone)]
pub struct FluidMetrics {
    pub total_dye: f32,
    pub max_dye: f32,
    pub total_kinetic_energy: f32,
    pub max_velocity: f32,
    pub avg_velocity: f32,
    /// Mean absolute divergence, same central stencil as the relaxation pass.
    pub velocity_divergence: f32,
    pub vorticity: f32,
    pub avg_pressure: f32,
    pub frame: usize,
}

impl FluidMetrics {
    pub fn analyze(simulation: &impl FluidData, frame: usize) -> Self {
        let grid = simulation.grid();
        let mut total_dye: f32 = 0.0;
        let mut max_dye: f32 = 0.0;
        let mut total_kinetic_energy: f32 = 0.0;
        let mut max_velocity: f32 = 0.0;
        let mut velocity_sum: f32 = 0.0;
        let mut total_divergence = 0.0;
        let mut total_vorticity = 0.0;
        let mut pressure_sum = 0.0;

        let size = grid.width() * grid.height();

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let c = grid.get(x, y);
                let n = grid.neighbors(x, y);

                total_dye += c.dye;
                max_dye = max_dye.max(c.dye);
                pressure_sum += c.pressure;

                let speed = c.velocity.length();
                total_kinetic_energy += 0.5 * speed * speed;
                max_velocity = max_velocity.max(speed);
                velocity_sum += speed;

                let divergence = (n.right.velocity.x - n.left.velocity.x + n.top.velocity.y
                    - n.bottom.velocity.y)
                    / 2.0;
                total_divergence += divergence.abs();

                let vorticity = (n.right.velocity.y - n.left.velocity.y - n.top.velocity.x
                    + n.bottom.velocity.x)
                    / 2.0;
                total_vorticity += vorticity.abs();
            }
        }

        Self {
            total_dye,
            max_dye,
            total_kinetic_energy,
            max_velocity,
            avg_velocity: velocity_sum / size as f32,
            velocity_divergence: total_divergence / size as f32,
            vorticity: total_vorticity / size as f32,
            avg_pressure: pressure_sum / size as f32,
            frame,
        }
    }

    pub fn log_summary(&self) {
        log::info!(
            "frame {}: dye total {:.4} max {:.4} | KE {:.5} | |v| max {:.4} avg {:.5} | div {:.2e} | curl {:.2e} | p avg {:.2e}",
            self.frame,
            self.total_dye,
            self.max_dye,
            self.total_kinetic_energy,
            self.max_velocity,
            self.avg_velocity,
            self.velocity_divergence,
            self.vorticity,
            self.avg_pressure
        );
    }
}

#[derive(Debug, Default)]
pub struct AnalysisRecorder {
    pub metrics_history: Vec<FluidMetrics>,
}

impl AnalysisRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&mut self, simulation: &impl FluidData, frame: usize) -> &FluidMetrics {
        self.metrics_history.push(FluidMetrics::analyze(simulation, frame));
        &self.metrics_history[self.metrics_history.len() - 1]
    }

    pub fn log_trends(&self) {
        if self.metrics_history.len() < 2 {
            return;
        }

        let first = &self.metrics_history[0];
        let last = &self.metrics_history[self.metrics_history.len() - 1];

        log::info!(
            "dye: {:.4} -> {:.4} ({:+.3}%)",
            first.total_dye,
            last.total_dye,
            (last.total_dye - first.total_dye) / first.total_dye.max(0.001) * 100.0
        );
        log::info!(
            "kinetic energy: {:.5} -> {:.5} ({:+.3}%)",
            first.total_kinetic_energy,
            last.total_kinetic_energy,
            (last.total_kinetic_energy - first.total_kinetic_energy)
                / first.total_kinetic_energy.max(0.001)
                * 100.0
        );
        log::info!(
            "divergence: {:.2e} -> {:.2e}",
            first.velocity_divergence,
            last.velocity_divergence
        );
    }
}
