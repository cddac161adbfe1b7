/// Stopwatch for the stats overlay's update/render split. On wasm32 it
/// reads `performance.now()` and falls back to `Date.now()` where the
/// page has no `Performance`; elsewhere it uses `Instant`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PerfTimer {
    #[cfg(target_arch = "wasm32")]
    started_at_ms: f64,
    #[cfg(not(target_arch = "wasm32"))]
    started_at: std::time::Instant,
}

#[cfg(target_arch = "wasm32")]
fn host_now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(js_sys::Date::now, |p| p.now())
}

impl PerfTimer {
    pub(crate) fn start() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            PerfTimer { started_at_ms: host_now_ms() }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            PerfTimer { started_at: std::time::Instant::now() }
        }
    }

    /// Milliseconds since `start`, never negative. A clock that steps
    /// backwards reads as zero rather than a negative phase cost.
    pub(crate) fn elapsed_ms(&self) -> f64 {
        #[cfg(target_arch = "wasm32")]
        let ms = host_now_ms() - self.started_at_ms;
        #[cfg(not(target_arch = "wasm32"))]
        let ms = self.started_at.elapsed().as_secs_f64() * 1000.0;
        if ms.is_finite() { ms.max(0.0) } else { 0.0 }
    }
}

/// Start a timer only when stats are on.
#[inline]
pub(crate) fn start_if(enabled: bool) -> Option<PerfTimer> {
    enabled.then(PerfTimer::start)
}

/// Phase cost for the stats overlay; 0 when stats were off.
#[inline]
pub(crate) fn elapsed_or_zero(timer: Option<PerfTimer>) -> f64 {
    timer.map_or(0.0, |t| t.elapsed_ms())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn disabled_stats_cost_nothing() {
        assert!(start_if(false).is_none());
        assert_eq!(elapsed_or_zero(None), 0.0);
    }

    #[test]
    fn elapsed_grows_with_wall_time() {
        let timer = start_if(true);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let ms = elapsed_or_zero(timer);
        assert!(ms >= 4.0, "{}", ms);
    }
}
