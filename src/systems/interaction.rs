//! Pointer/scroll/click input turned into a transient speed multiplier.
//! Input is only recorded here; the multiplier is advanced once per frame.

use super::kernels::NumericKernels;
use crate::core::math::Vec2;

/// Input within this window counts as "moving".
pub const MOVE_WINDOW_MS: f64 = 150.0;

#[derive(Clone, Debug)]
pub struct InteractionTracker {
    last_input_ms: f64,
    last_click_ms: f64,
    pointer: Option<Vec2>,
    scroll_total: f32,
    speed_multiplier: f32,
}

impl Default for InteractionTracker {
    fn default() -> Self {
        Self {
            last_input_ms: f64::NEG_INFINITY,
            last_click_ms: f64::NEG_INFINITY,
            pointer: None,
            scroll_total: 0.0,
            speed_multiplier: 1.0,
        }
    }
}

impl InteractionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32, now_ms: f64) {
        let p = Vec2::new(x, y);
        if p.is_finite() {
            self.pointer = Some(p);
        }
        self.touch(now_ms);
    }

    pub fn on_click(&mut self, x: f32, y: f32, now_ms: f64) {
        self.on_pointer_move(x, y, now_ms);
        if now_ms.is_finite() {
            self.last_click_ms = now_ms;
        }
    }

    pub fn on_scroll(&mut self, delta_y: f32, now_ms: f64) {
        if delta_y.is_finite() {
            self.scroll_total += delta_y;
        }
        self.touch(now_ms);
    }

    pub fn pointer_leave(&mut self) {
        self.pointer = None;
    }

    #[inline]
    fn touch(&mut self, now_ms: f64) {
        if now_ms.is_finite() {
            self.last_input_ms = now_ms;
        }
    }

    pub fn is_moving(&self, now_ms: f64) -> bool {
        let since = now_ms - self.last_input_ms;
        (0.0..MOVE_WINDOW_MS).contains(&since)
    }

    /// Advance the smoothed multiplier for this frame.
    pub fn update(&mut self, now_ms: f64, kernels: &dyn NumericKernels) -> f32 {
        let next = kernels.calculate_speed_multiplier(
            self.is_moving(now_ms),
            self.last_click_ms,
            now_ms,
            self.speed_multiplier,
        );
        self.speed_multiplier = finite_or!(next, 1.0);
        self.speed_multiplier
    }

    #[inline]
    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn scroll_total(&self) -> f32 {
        self.scroll_total
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::kernels::ScalarKernels;

    #[test]
    fn idle_tracker_stays_at_unit_speed() {
        let mut t = InteractionTracker::new();
        for frame in 0..10 {
            assert_eq!(t.update(frame as f64 * 16.0, &ScalarKernels), 1.0);
        }
        assert!(t.pointer().is_none());
    }

    #[test]
    fn moving_window_is_150ms() {
        let mut t = InteractionTracker::new();
        t.on_pointer_move(10.0, 20.0, 1000.0);
        assert!(t.is_moving(1000.0));
        assert!(t.is_moving(1149.0));
        assert!(!t.is_moving(1150.0));
        assert_eq!(t.pointer(), Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn movement_speeds_up_then_settles() {
        let mut t = InteractionTracker::new();
        t.on_scroll(120.0, 0.0);
        let boosted = t.update(10.0, &ScalarKernels);
        assert!(boosted > 1.0);
        let mut last = boosted;
        for frame in 1..200 {
            last = t.update(10.0 + frame as f64 * 16.0, &ScalarKernels);
        }
        assert!((last - 1.0).abs() < 1e-3);
        assert_eq!(t.scroll_total(), 120.0);
    }

    #[test]
    fn click_boost_beats_plain_movement() {
        let mut moving = InteractionTracker::new();
        moving.on_pointer_move(0.0, 0.0, 0.0);
        let mut clicked = InteractionTracker::new();
        clicked.on_click(0.0, 0.0, 0.0);
        assert!(clicked.update(1.0, &ScalarKernels) > moving.update(1.0, &ScalarKernels));
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut t = InteractionTracker::new();
        t.on_pointer_move(f32::NAN, 0.0, f64::NAN);
        assert!(t.pointer().is_none());
        assert!(!t.is_moving(0.0));
        t.reset();
        assert_eq!(t.speed_multiplier(), 1.0);
    }
}
