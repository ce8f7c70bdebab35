use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the per-tick time step fed to the pointer smoother is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timestep {
    /// Constant step in milliseconds, independent of wall-clock jitter.
    Fixed { millis: f32 },
    /// Wall-clock time elapsed since the previous tick.
    Measured,
}

impl Default for Timestep {
    fn default() -> Self {
        Timestep::Fixed {
            millis: 1000.0 / 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: usize,
    pub height: usize,
    /// Jacobi sweeps per tick. Accuracy/performance knob.
    pub relaxation_iterations: usize,
    pub density: f32,
    pub force_radius: f32,
    pub push_gain: f32,
    /// Weight of the previous smoothed pointer velocity, in [0, 1).
    pub velocity_smoothing: f32,
    pub timestep: Timestep,
    pub target_hz: f32,
    /// Worker threads for the pass pool, 0 lets rayon decide.
    pub threads: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            relaxation_iterations: 10,
            density: 1.0,
            force_radius: 16.0,
            push_gain: 4.0,
            velocity_smoothing: 0.5,
            timestep: Timestep::default(),
            target_hz: 60.0,
            threads: 0,
        }
    }
}

impl SimConfig {
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.relaxation_iterations == 0 {
            return Err(SimError::config("relaxation_iterations must be at least 1"));
        }
        if !positive(self.density) {
            return Err(SimError::config(format!(
                "density must be positive, got {}",
                self.density
            )));
        }
        if !positive(self.force_radius) {
            return Err(SimError::config(format!(
                "force_radius must be positive, got {}",
                self.force_radius
            )));
        }
        if !(0.0..1.0).contains(&self.velocity_smoothing) {
            return Err(SimError::config(format!(
                "velocity_smoothing must lie in [0, 1), got {}",
                self.velocity_smoothing
            )));
        }
        if !positive(self.target_hz) {
            return Err(SimError::config(format!(
                "target_hz must be positive, got {}",
                self.target_hz
            )));
        }
        if let Timestep::Fixed { millis } = self.timestep {
            if !positive(millis) {
                return Err(SimError::config(format!(
                    "fixed timestep must be positive, got {millis} ms"
                )));
            }
        }
        Ok(())
    }

    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(1.0 / self.target_hz)
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
