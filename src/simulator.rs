//! Tick orchestration: one advect/force pass, a fixed budget of pressure
//! sweeps, one projection pass, strictly in that order.

use crate::advect::AdvectForcePass;
use crate::config::{SimConfig, Timestep};
use crate::error::{SimError, SimResult};
use crate::grid::{BufferIndex, GridBuffer, GridState};
use crate::input::{ForceInput, ForceSample, ForceSettings, PointerHandle};
use crate::pass::GridPass;
use crate::pressure::PressureRelaxationPass;
use crate::projection::ProjectionAdvectDyePass;
use std::time::Instant;

/// Lower bound for a measured step, so two ticks in the same instant cannot
/// divide the pointer displacement by zero.
const MIN_MEASURED_DT_MS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub start: BufferIndex,
    pub end: BufferIndex,
    pub passes: usize,
    pub force: ForceSample,
    pub dt_ms: f32,
    /// The buffers were found unusable and reallocated during this tick.
    pub recovered: bool,
}

#[derive(Debug)]
struct TickClock {
    timestep: Timestep,
    last_tick: Option<Instant>,
}

impl TickClock {
    fn new(timestep: Timestep) -> Self {
        Self {
            timestep,
            last_tick: None,
        }
    }

    fn next_dt_ms(&mut self) -> f32 {
        match self.timestep {
            Timestep::Fixed { millis } => millis,
            Timestep::Measured => {
                let now = Instant::now();
                let dt = match self.last_tick.replace(now) {
                    Some(previous) => now.duration_since(previous).as_secs_f32() * 1000.0,
                    None => 1000.0 / 60.0,
                };
                dt.max(MIN_MEASURED_DT_MS)
            }
        }
    }
}

pub struct Simulator {
    config: SimConfig,
    grid: GridState,
    input: ForceInput,
    pool: rayon::ThreadPool,
    clock: TickClock,
    ticks: u64,
}

impl Simulator {
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let grid = GridState::new(config.width, config.height)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("dyeflow-pass-{i}"))
            .build()?;

        log::info!(
            "simulator ready: {}x{} cells, {} relaxation sweeps, {} workers",
            config.width,
            config.height,
            config.relaxation_iterations,
            pool.current_num_threads()
        );

        Ok(Self {
            input: ForceInput::new(ForceSettings::from(&config)),
            clock: TickClock::new(config.timestep),
            config,
            grid,
            pool,
            ticks: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Producer handle for pointer events; clone it into the input thread.
    pub fn pointer(&self) -> PointerHandle {
        self.input.handle()
    }

    pub fn current_index(&self) -> BufferIndex {
        self.grid.current_index()
    }

    /// The buffer holding the latest tick's final state.
    pub fn state(&self) -> &GridBuffer {
        self.grid.current()
    }

    pub fn state_mut(&mut self) -> &mut GridBuffer {
        self.grid.current_mut()
    }

    pub fn passes_executed(&self) -> u64 {
        self.grid.passes_executed()
    }

    /// Changes the pressure sweep budget from the next tick on. Zero sweeps
    /// is rejected like it is in the config file.
    pub fn set_relaxation_iterations(&mut self, iterations: usize) -> SimResult<()> {
        if iterations == 0 {
            return Err(SimError::config("relaxation_iterations must be at least 1"));
        }
        self.config.relaxation_iterations = iterations;
        Ok(())
    }

    /// Advances one tick using the pointer as it stands right now.
    pub fn tick(&mut self) -> TickReport {
        let dt_ms = self.clock.next_dt_ms();
        let force = self.input.sample(dt_ms);
        self.run_tick(force, dt_ms)
    }

    /// Advances one tick with an explicit forcing, bypassing the pointer.
    pub fn tick_with(&mut self, force: ForceSample) -> TickReport {
        let dt_ms = self.clock.next_dt_ms();
        self.run_tick(force, dt_ms)
    }

    fn run_tick(&mut self, force: ForceSample, dt_ms: f32) -> TickReport {
        let start = self.grid.current_index();
        let mut passes = 0;

        self.execute(&AdvectForcePass::new(force, self.config.density));
        passes += 1;

        for _ in 0..self.config.relaxation_iterations {
            self.execute(&PressureRelaxationPass);
            passes += 1;
        }

        self.execute(&ProjectionAdvectDyePass);
        passes += 1;

        self.ticks += 1;
        let recovered = self.recover_if_unusable();
        let end = self.grid.current_index();

        log::debug!(
            "tick {}: {} passes, {:?} -> {:?}, feed {:.2}",
            self.ticks,
            passes,
            start,
            end,
            force.feed
        );

        TickReport {
            start,
            end,
            passes,
            force,
            dt_ms,
            recovered,
        }
    }

    fn execute<P: GridPass>(&mut self, pass: &P) {
        log::trace!("pass {} on {:?}", P::NAME, self.grid.current_index());
        let grid = &mut self.grid;
        self.pool.install(|| grid.execute(pass));
    }

    /// Non-finite state means the grid can no longer be advanced. Start over
    /// from rest instead of terminating.
    fn recover_if_unusable(&mut self) -> bool {
        if self.grid.current().is_finite() {
            return false;
        }
        log::warn!(
            "grid state became non-finite at tick {}, reallocating zeroed buffers",
            self.ticks
        );
        match GridState::new(self.config.width, self.config.height) {
            Ok(grid) => self.grid = grid,
            Err(err) => {
                log::error!("reallocation failed ({err}), clearing in place");
                self.grid.reset();
            }
        }
        true
    }

    /// Zeroes both buffers. Pointer state is left alone.
    pub fn reset(&mut self) {
        self.grid.reset();
        log::info!("simulation reset");
    }

    /// Changes the grid size. State is discarded, there is no resampling.
    pub fn resize(&mut self, width: usize, height: usize) -> SimResult<()> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        self.grid = GridState::new(width, height)?;
        self.config.width = width;
        self.config.height = height;
        log::info!("resized grid to {width}x{height}, state reset");
        Ok(())
    }
}
