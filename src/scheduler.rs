use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cloneable switch that ends a running [`FixedRateLoop`].
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Calls a frame callback at a fixed period until stopped.
///
/// A late frame is followed immediately by the next one, but missed frames
/// are dropped rather than replayed in a burst.
#[derive(Debug, Clone)]
pub struct FixedRateLoop {
    period: Duration,
    stop: StopHandle,
}

impl FixedRateLoop {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            stop: StopHandle::default(),
        }
    }

    pub fn from_hz(hz: f32) -> Self {
        Self::new(Duration::from_secs_f32(1.0 / hz))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Runs until the callback returns `false` or the stop handle fires.
    /// Returns the number of frames executed.
    pub fn run<F>(&self, mut frame: F) -> u64
    where
        F: FnMut(u64) -> bool,
    {
        let mut frames = 0;
        let mut deadline = Instant::now();

        while !self.stop.is_stopped() {
            let keep_going = frame(frames);
            frames += 1;
            if !keep_going {
                break;
            }

            deadline += self.period;
            let now = Instant::now();
            if now < deadline {
                std::thread::sleep(deadline - now);
            } else {
                let behind = now - deadline;
                if behind > self.period {
                    log::warn!(
                        "frame {} overran its slot by {:.1} ms, dropping missed frames",
                        frames,
                        behind.as_secs_f64() * 1000.0
                    );
                }
                deadline = now;
            }
        }

        frames
    }
}
