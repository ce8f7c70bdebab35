//! Real-time 2D incompressible fluid with pointer forcing and a passive dye.
//!
//! Each tick runs a fixed sequence of per-cell passes over a double-buffered
//! grid: advect and force, a budget of Jacobi pressure sweeps, then
//! projection and dye advection.

pub mod advect;
pub mod analysis;
pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod input;
pub mod pass;
pub mod pressure;
pub mod projection;
pub mod scheduler;
pub mod simulator;
pub mod visualize;

pub use advect::AdvectForcePass;
pub use analysis::{AnalysisRecorder, FluidMetrics};
pub use app::{InteractiveApp, ViewSettings};
pub use config::{SimConfig, Timestep};
pub use error::{SimError, SimResult};
pub use export::{FluidData, ImageExporter};
pub use grid::{BufferIndex, Cell, GridBuffer, GridState};
pub use input::{
    ForceInput, ForceSample, ForceSettings, PointerEvent, PointerHandle, PointerMode, PointerState,
};
pub use pass::GridPass;
pub use pressure::PressureRelaxationPass;
pub use projection::ProjectionAdvectDyePass;
pub use scheduler::{FixedRateLoop, StopHandle};
pub use simulator::{Simulator, TickReport};
pub use visualize::{RenderMode, Visualizer};
