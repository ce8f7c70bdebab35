//! Pointer tracking and the per-tick forcing descriptor derived from it.
//!
//! Pointer events arrive from whatever thread owns the input device. They are
//! folded into a shared [`PointerState`]; the simulator locks it once at the
//! start of each tick and turns it into a [`ForceSample`], so the whole tick
//! sees one consistent force.

use crate::config::SimConfig;
use glam::Vec2;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerMode {
    #[default]
    None,
    Push,
    FeedDye,
}

impl PointerMode {
    /// Button 0 pushes fluid, any other button feeds dye.
    pub fn from_button(button: u32) -> Self {
        if button == 0 {
            PointerMode::Push
        } else {
            PointerMode::FeedDye
        }
    }
}

/// Raw pointer events in grid space: origin bottom-left, y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press { button: u32, position: Vec2 },
    Move { position: Vec2 },
    Release,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub current_location: Vec2,
    pub previous_location: Option<Vec2>,
    pub smoothed_velocity: Option<Vec2>,
    pub mode: PointerMode,
}

impl PointerState {
    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Press { button, position } => {
                self.mode = PointerMode::from_button(button);
                self.current_location = position;
            }
            PointerEvent::Move { position } => {
                self.current_location = position;
            }
            PointerEvent::Release => {
                // Next interaction starts unsmoothed.
                *self = PointerState {
                    current_location: self.current_location,
                    ..PointerState::default()
                };
            }
        }
    }

    /// Advances the smoother by one tick and returns that tick's forcing.
    pub fn advance(&mut self, dt_ms: f32, settings: &ForceSettings) -> ForceSample {
        if self.mode == PointerMode::None {
            return ForceSample::NONE;
        }

        let previous = *self.previous_location.get_or_insert(self.current_location);
        let last_velocity = self.smoothed_velocity.unwrap_or(Vec2::ZERO);
        let instantaneous = (self.current_location - previous) / dt_ms;
        let velocity =
            last_velocity * settings.smoothing + instantaneous * (1.0 - settings.smoothing);
        self.smoothed_velocity = Some(velocity);
        self.previous_location = Some(self.current_location);

        match self.mode {
            PointerMode::Push => ForceSample::push(
                self.current_location,
                settings.radius,
                velocity * settings.push_gain,
            ),
            PointerMode::FeedDye => ForceSample::feed(self.current_location, settings.radius),
            PointerMode::None => ForceSample::NONE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceSample {
    pub location: Vec2,
    pub radius: f32,
    pub force_vector: Vec2,
    pub feed: f32,
}

impl ForceSample {
    pub const NONE: ForceSample = ForceSample {
        location: Vec2::ZERO,
        radius: 0.0,
        force_vector: Vec2::ZERO,
        feed: 0.0,
    };

    pub fn push(location: Vec2, radius: f32, force_vector: Vec2) -> Self {
        Self {
            location,
            radius,
            force_vector,
            feed: 0.0,
        }
    }

    pub fn feed(location: Vec2, radius: f32) -> Self {
        Self {
            location,
            radius,
            force_vector: Vec2::ZERO,
            feed: 1.0,
        }
    }

    /// Radial falloff at `position`: 1 near the centre, 0 at and beyond the radius.
    pub fn falloff(&self, position: Vec2) -> f32 {
        let distance = position.distance(self.location);
        ((self.radius - distance) / (self.radius + 0.01)).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceSettings {
    pub radius: f32,
    pub push_gain: f32,
    pub smoothing: f32,
}

impl From<&SimConfig> for ForceSettings {
    fn from(config: &SimConfig) -> Self {
        Self {
            radius: config.force_radius,
            push_gain: config.push_gain,
            smoothing: config.velocity_smoothing,
        }
    }
}

/// Producer side of the pointer: cheap to clone, safe to use from any thread.
#[derive(Debug, Clone, Default)]
pub struct PointerHandle {
    state: Arc<Mutex<PointerState>>,
}

impl PointerHandle {
    pub fn send(&self, event: PointerEvent) {
        self.lock().apply(event);
    }

    pub fn press(&self, button: u32, position: Vec2) {
        self.send(PointerEvent::Press { button, position });
    }

    pub fn move_to(&self, position: Vec2) {
        self.send(PointerEvent::Move { position });
    }

    pub fn release(&self) {
        self.send(PointerEvent::Release);
    }

    pub fn snapshot(&self) -> PointerState {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, PointerState> {
        // Plain Copy data, a poisoned lock still holds a usable value.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Turns the shared pointer into one [`ForceSample`] per tick.
#[derive(Debug, Clone)]
pub struct ForceInput {
    pointer: PointerHandle,
    settings: ForceSettings,
}

impl ForceInput {
    pub fn new(settings: ForceSettings) -> Self {
        Self {
            pointer: PointerHandle::default(),
            settings,
        }
    }

    pub fn handle(&self) -> PointerHandle {
        self.pointer.clone()
    }

    /// Takes the tick-start snapshot. The lock is held only for this call.
    pub fn sample(&self, dt_ms: f32) -> ForceSample {
        self.pointer.lock().advance(dt_ms, &self.settings)
    }
}
