use crate::error::SimResult;
use crate::grid::GridBuffer;
use crate::simulator::Simulator;
use crate::visualize::{RenderMode, Visualizer};
use std::path::Path;

/// Anything that can hand over a finished grid buffer for display or analysis.
pub trait FluidData {
    fn grid(&self) -> &GridBuffer;
}

impl FluidData for GridBuffer {
    fn grid(&self) -> &GridBuffer {
        self
    }
}

impl FluidData for Simulator {
    fn grid(&self) -> &GridBuffer {
        self.state()
    }
}

pub struct ImageExporter {
    visualizer: Visualizer,
    scale: u32,
}

impl ImageExporter {
    pub fn new(mode: RenderMode, scale: u32) -> Self {
        Self {
            visualizer: Visualizer::new(mode),
            scale,
        }
    }

    pub fn export_png(&self, simulation: &impl FluidData, path: &Path) -> SimResult<()> {
        let img = self.visualizer.render_image(simulation.grid(), self.scale);
        img.save(path)?;
        log::debug!("exported {}", path.display());
        Ok(())
    }

    /// Ticks `steps` times with the live pointer, writing one PNG per tick.
    pub fn export_frame_sequence(
        &self,
        simulation: &mut Simulator,
        steps: usize,
        output_dir: &Path,
        prefix: &str,
    ) -> SimResult<()> {
        std::fs::create_dir_all(output_dir)?;
        for i in 0..steps {
            simulation.tick();

            let filename = format!("{}_frame_{:04}.png", prefix, i);
            self.export_png(simulation, &output_dir.join(filename))?;
        }
        Ok(())
    }
}
