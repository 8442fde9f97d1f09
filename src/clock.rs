use std::cell::Cell;

/// Seconds since the clock was created. Never goes backwards.
pub trait FrameClock {
    fn elapsed(&self) -> f64;
}

/// Clock that only moves when told to. Drives the loop headless and in tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `dt` seconds; negative steps are ignored.
    pub fn advance(&self, dt: f64) {
        if dt > 0.0 {
            self.now.set(self.now.get() + dt);
        }
    }

    /// Jumps to `t`, unless that would move backwards.
    pub fn set(&self, t: f64) {
        if t > self.now.get() {
            self.now.set(t);
        }
    }
}

impl FrameClock for ManualClock {
    fn elapsed(&self) -> f64 {
        self.now.get()
    }
}

impl<C: FrameClock + ?Sized> FrameClock for std::rc::Rc<C> {
    fn elapsed(&self) -> f64 {
        (**self).elapsed()
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::PerformanceClock;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::Cell;

    use super::FrameClock;
    use crate::error::SceneError;

    /// Wall clock backed by `performance.now()`.
    pub struct PerformanceClock {
        performance: web_sys::Performance,
        origin: f64,
        last: Cell<f64>,
    }

    impl PerformanceClock {
        pub fn new(window: &web_sys::Window) -> Result<Self, SceneError> {
            let performance = window
                .performance()
                .ok_or_else(|| SceneError::Unsupported("performance timer".into()))?;
            let origin = performance.now();
            Ok(Self {
                performance,
                origin,
                last: Cell::new(0.0),
            })
        }
    }

    impl FrameClock for PerformanceClock {
        fn elapsed(&self) -> f64 {
            let t = ((self.performance.now() - self.origin) / 1000.0).max(self.last.get());
            self.last.set(t);
            t
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_never_runs_backwards() {
        let clock = ManualClock::new();
        clock.advance(1.5);
        clock.advance(-3.0);
        clock.set(0.5);
        assert_eq!(clock.elapsed(), 1.5);
        clock.set(4.0);
        assert_eq!(clock.elapsed(), 4.0);
    }
}
