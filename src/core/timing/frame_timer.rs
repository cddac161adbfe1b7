/// Nominal delta reported before a previous sample exists (60 Hz).
pub const DEFAULT_DELTA_MS: f64 = 1000.0 / 60.0;
/// Upper clamp; a backgrounded tab can resume seconds later.
pub const MAX_DELTA_MS: f64 = 100.0;

/// Turns host clock samples (ms) into a clamped per-frame delta.
#[derive(Clone, Debug)]
pub struct FrameTimer {
    previous: Option<f64>,
    default_delta_ms: f64,
    max_delta_ms: f64,
    last_delta_ms: f64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DELTA_MS, MAX_DELTA_MS)
    }
}

impl FrameTimer {
    pub fn new(default_delta_ms: f64, max_delta_ms: f64) -> Self {
        Self {
            previous: None,
            default_delta_ms,
            max_delta_ms: max_delta_ms.max(0.0),
            last_delta_ms: default_delta_ms,
        }
    }

    /// Delta since the previous call, in [0, max_delta_ms].
    pub fn update(&mut self, current_time: f64) -> f64 {
        let delta = match self.previous {
            None => self.default_delta_ms,
            Some(prev) => {
                let raw = current_time - prev;
                if raw.is_nan() {
                    self.default_delta_ms
                } else {
                    raw.clamp(0.0, self.max_delta_ms)
                }
            }
        };
        if current_time.is_finite() {
            self.previous = Some(current_time);
        }
        self.last_delta_ms = delta;
        delta
    }

    pub fn last_delta_ms(&self) -> f64 {
        self.last_delta_ms
    }

    pub fn max_delta_ms(&self) -> f64 {
        self.max_delta_ms
    }

    /// Back to the first-call state.
    pub fn reset(&mut self) {
        self.previous = None;
        self.last_delta_ms = self.default_delta_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_returns_nominal_delta() {
        let mut timer = FrameTimer::default();
        assert!((timer.update(1234.0) - DEFAULT_DELTA_MS).abs() < 1e-9);
    }

    #[test]
    fn subsequent_calls_return_elapsed_time() {
        let mut timer = FrameTimer::default();
        timer.update(1000.0);
        assert_eq!(timer.update(1020.0), 20.0);
        assert_eq!(timer.update(1036.5), 16.5);
    }

    #[test]
    fn backgrounded_tab_delta_is_clamped() {
        let mut timer = FrameTimer::default();
        timer.update(0.0);
        let dt = timer.update(5000.0);
        assert!(dt <= MAX_DELTA_MS);
        assert_ne!(dt, 5000.0);
    }

    #[test]
    fn clock_going_backwards_yields_zero() {
        let mut timer = FrameTimer::default();
        timer.update(500.0);
        assert_eq!(timer.update(400.0), 0.0);
    }

    #[test]
    fn reset_restores_first_call_behaviour() {
        let mut timer = FrameTimer::new(10.0, 50.0);
        timer.update(0.0);
        timer.update(30.0);
        timer.reset();
        assert_eq!(timer.update(9000.0), 10.0);
        assert_eq!(timer.update(9020.0), 20.0);
    }
}
