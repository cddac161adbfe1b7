use wasm_bindgen::prelude::*;

use crate::domain::tiers::QualityTier;
use crate::systems::quality::SampleWindow;

/// Snapshot of the last frame, handed to JS for a debug overlay.
/// All zeros while stats are disabled.
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct FrameStats {
    pub(super) fps: f32,
    pub(super) avg_frame_ms: f32,
    pub(super) tier: QualityTier,
    pub(super) update_ms: f64,
    pub(super) render_ms: f64,
    pub(super) draw_commands: u32,
    pub(super) dropped_draws: u32,
    pub(super) active_entities: u32,
    pub(super) pooled_capacity: u32,
    pub(super) effects: u32,
    pub(super) frame: u64,
}

impl FrameStats {
    pub(crate) fn reset(&mut self) {
        *self = FrameStats::default();
    }
}

#[wasm_bindgen]
impl FrameStats {
    #[wasm_bindgen(getter)]
    pub fn fps(&self) -> f32 { self.fps }
    #[wasm_bindgen(getter)]
    pub fn avg_frame_ms(&self) -> f32 { self.avg_frame_ms }
    #[wasm_bindgen(getter)]
    pub fn tier(&self) -> String { self.tier.as_str().to_string() }
    #[wasm_bindgen(getter)]
    pub fn update_ms(&self) -> f64 { self.update_ms }
    #[wasm_bindgen(getter)]
    pub fn render_ms(&self) -> f64 { self.render_ms }
    #[wasm_bindgen(getter)]
    pub fn draw_commands(&self) -> u32 { self.draw_commands }
    #[wasm_bindgen(getter)]
    pub fn dropped_draws(&self) -> u32 { self.dropped_draws }
    #[wasm_bindgen(getter)]
    pub fn active_entities(&self) -> u32 { self.active_entities }
    #[wasm_bindgen(getter)]
    pub fn pooled_capacity(&self) -> u32 { self.pooled_capacity }
    #[wasm_bindgen(getter)]
    pub fn effects(&self) -> u32 { self.effects }
    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 { self.frame }
}

/// Rolling frame-time average over the last `capacity` frames.
pub(crate) struct FpsMeter {
    window: SampleWindow,
}

impl FpsMeter {
    pub(crate) fn new(capacity: usize) -> Self {
        Self { window: SampleWindow::new(capacity) }
    }

    pub(crate) fn record(&mut self, frame_ms: f64) {
        if frame_ms.is_finite() && frame_ms > 0.0 {
            self.window.push(frame_ms as f32);
        }
    }

    /// (fps, average frame ms); zeros until the first sample.
    pub(crate) fn snapshot(&self) -> (f32, f32) {
        match self.window.mean() {
            Some(avg) if avg > 0.0 => (1000.0 / avg, avg),
            _ => (0.0, 0.0),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.window.clear();
    }
}
