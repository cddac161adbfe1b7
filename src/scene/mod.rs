//! Scene - one canvas, its effects and the per-frame loop
//!
//! `SceneCore` is the host-independent part: it owns the frame timer, the
//! quality manager, the kernel table, input tracking and every mounted
//! effect, and turns one host timestamp into one `DrawList`.
//!
//! Frame order:
//! 1. timer → dt
//! 2. quality metrics (may change tier)
//! 3. tier change delivered to every effect
//! 4. interaction speed multiplier
//! 5. effect updates
//! 6. render into the draw list
//!
//! The browser side (`FxScene`, canvas replay, rAF loop) only exists on
//! wasm32.

#[path = "render/draw_list.rs"]
mod draw_list;
#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/frame_stats.rs"]
mod frame_stats;
#[cfg(target_arch = "wasm32")]
#[path = "render/canvas.rs"]
mod canvas;
#[cfg(target_arch = "wasm32")]
#[path = "runtime/animation_loop.rs"]
mod animation_loop;
#[cfg(target_arch = "wasm32")]
mod facade;

pub use draw_list::{Color, DrawCommand, DrawList};
pub use frame_stats::FrameStats;
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
#[cfg(target_arch = "wasm32")]
pub use facade::FxScene;

use frame_stats::FpsMeter;
use perf_timer::{elapsed_or_zero, start_if};

use crate::core::error::FxResult;
use crate::core::math::Vec2;
use crate::core::timing::FrameTimer;
use crate::domain::config::FxConfig;
use crate::domain::tiers::{DeviceHint, QualityTier};
use crate::systems::effects::{Effect, EffectContext, Viewport};
use crate::systems::interaction::InteractionTracker;
use crate::systems::kernels::{get_optimized_functions, BackendKind, KernelTable};
use crate::systems::quality::{ListenerId, QualityManager, TierChange};

/// Night-sky fill drawn before any effect.
pub const BACKGROUND: Color = Color::rgb(4, 6, 18);
const STATS_WINDOW: usize = 60;

pub struct SceneCore {
    config: FxConfig,
    timer: FrameTimer,
    quality: QualityManager,
    kernels: KernelTable,
    interaction: InteractionTracker,
    effects: Vec<Box<dyn Effect>>,
    draw_list: DrawList,
    viewport: Viewport,
    frame: u64,
    time_ms: f64,

    stats_enabled: bool,
    stats: FrameStats,
    fps_meter: FpsMeter,
}

/// Builds the read-only view effects get. Takes fields, not `&self`, so
/// the effect list can be borrowed mutably alongside it.
#[inline]
fn context<'a>(
    quality: &'a QualityManager,
    kernels: &'a KernelTable,
    interaction: &InteractionTracker,
    viewport: Viewport,
    dt_ms: f64,
    time_ms: f64,
    frame: u64,
) -> EffectContext<'a> {
    EffectContext {
        dt_ms,
        time_ms,
        viewport,
        speed_multiplier: interaction.speed_multiplier(),
        pointer: interaction.pointer(),
        quality,
        kernels: kernels.kernels(),
        frame,
    }
}

impl SceneCore {
    pub fn new(config: FxConfig, viewport: Viewport) -> FxResult<Self> {
        Self::with_device_hint(config, viewport, &DeviceHint::default())
    }

    pub fn with_device_hint(config: FxConfig, viewport: Viewport, hint: &DeviceHint) -> FxResult<Self> {
        config.validate()?;
        let kernels = get_optimized_functions(&config.backend);
        Ok(Self::with_kernels(config, viewport, hint, kernels))
    }

    /// Explicit kernel table (tests pin a backend this way).
    pub fn with_kernels(config: FxConfig, viewport: Viewport, hint: &DeviceHint, kernels: KernelTable) -> Self {
        let timer = FrameTimer::new(config.timer.default_delta_ms, config.timer.max_delta_ms);
        let quality = QualityManager::new(config.quality.clone()).with_device_hint(hint);
        Self {
            config,
            timer,
            quality,
            kernels,
            interaction: InteractionTracker::new(),
            effects: Vec::new(),
            draw_list: DrawList::new(),
            viewport: viewport.sanitized(),
            frame: 0,
            time_ms: 0.0,
            stats_enabled: false,
            stats: FrameStats::default(),
            fps_meter: FpsMeter::new(STATS_WINDOW),
        }
    }

    // === Effects ===

    /// Set the effect up and add it. A failed setup is logged and the
    /// effect is dropped; mounted siblings are untouched.
    pub fn mount(&mut self, mut effect: Box<dyn Effect>) -> FxResult<()> {
        let ctx = context(
            &self.quality,
            &self.kernels,
            &self.interaction,
            self.viewport,
            0.0,
            self.time_ms,
            self.frame,
        );
        if let Err(e) = effect.setup(&ctx) {
            fx_warn!("{}: not mounted ({})", effect.name(), e);
            effect.teardown();
            return Err(e);
        }
        fx_log!("{}: mounted", effect.name());
        self.effects.push(effect);
        Ok(())
    }

    /// Tear down and remove every effect with this name.
    pub fn unmount(&mut self, name: &str) -> bool {
        let before = self.effects.len();
        self.effects.retain_mut(|e| {
            if e.name() == name {
                e.teardown();
                false
            } else {
                true
            }
        });
        self.effects.len() != before
    }

    pub fn effect_names(&self) -> Vec<&'static str> {
        self.effects.iter().map(|e| e.name()).collect()
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    // === Frame ===

    /// Advance everything by one host tick and rebuild the draw list.
    pub fn frame(&mut self, now_ms: f64) -> &DrawList {
        let dt = self.timer.update(now_ms);
        self.time_ms = if now_ms.is_finite() { now_ms } else { self.time_ms + dt };
        self.frame += 1;

        if let Some(change) = self.quality.update_metrics(dt) {
            self.deliver(&change);
        }
        self.interaction.update(self.time_ms, self.kernels.kernels());

        let update_timer = start_if(self.stats_enabled);
        {
            let ctx = context(
                &self.quality,
                &self.kernels,
                &self.interaction,
                self.viewport,
                dt,
                self.time_ms,
                self.frame,
            );
            for effect in self.effects.iter_mut() {
                effect.update(&ctx);
            }
        }
        let update_ms = elapsed_or_zero(update_timer);

        let render_timer = start_if(self.stats_enabled);
        self.draw_list.reset();
        self.draw_list.clear(BACKGROUND, 1.0);
        for effect in &self.effects {
            effect.render(&mut self.draw_list);
        }
        let render_ms = elapsed_or_zero(render_timer);

        if self.stats_enabled {
            self.fps_meter.record(dt);
            self.collect_stats(update_ms, render_ms);
        }
        &self.draw_list
    }

    fn deliver(&mut self, change: &TierChange) {
        let ctx = context(
            &self.quality,
            &self.kernels,
            &self.interaction,
            self.viewport,
            0.0,
            self.time_ms,
            self.frame,
        );
        for effect in self.effects.iter_mut() {
            effect.on_tier_change(change, &ctx);
        }
    }

    fn collect_stats(&mut self, update_ms: f64, render_ms: f64) {
        let (fps, avg) = self.fps_meter.snapshot();
        let s = &mut self.stats;
        s.fps = fps;
        s.avg_frame_ms = avg;
        s.tier = self.quality.get_tier();
        s.update_ms = update_ms;
        s.render_ms = render_ms;
        s.draw_commands = self.draw_list.len() as u32;
        s.dropped_draws = self.draw_list.dropped();
        s.active_entities = self.effects.iter().map(|e| e.active_entities()).sum::<usize>() as u32;
        s.pooled_capacity = self.effects.iter().map(|e| e.pooled_capacity()).sum::<usize>() as u32;
        s.effects = self.effects.len() as u32;
        s.frame = self.frame;
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    // === Quality ===

    pub fn quality(&self) -> &QualityManager {
        &self.quality
    }

    pub fn tier(&self) -> QualityTier {
        self.quality.get_tier()
    }

    pub fn set_quality_preference(&mut self, preference: Option<QualityTier>) {
        if let Some(change) = self.quality.set_user_preference(preference) {
            self.deliver(&change);
        }
    }

    /// Outside observers (the JS callback); effects are notified directly.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TierChange) + 'static,
    {
        self.quality.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.quality.unsubscribe(id)
    }

    pub fn backend(&self) -> BackendKind {
        self.kernels.backend()
    }

    // === Input ===

    pub fn pointer_move(&mut self, x: f32, y: f32, now_ms: f64) {
        self.interaction.on_pointer_move(x, y, now_ms);
    }

    pub fn pointer_leave(&mut self) {
        self.interaction.pointer_leave();
    }

    pub fn click(&mut self, x: f32, y: f32, now_ms: f64) {
        self.interaction.on_click(x, y, now_ms);
        let ctx = context(
            &self.quality,
            &self.kernels,
            &self.interaction,
            self.viewport,
            0.0,
            self.time_ms,
            self.frame,
        );
        for effect in self.effects.iter_mut() {
            effect.on_click(Vec2::new(x, y), &ctx);
        }
    }

    pub fn scroll(&mut self, delta_y: f32, now_ms: f64) {
        self.interaction.on_scroll(delta_y, now_ms);
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.interaction.speed_multiplier()
    }

    // === Viewport ===

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height).sanitized();
        let ctx = context(
            &self.quality,
            &self.kernels,
            &self.interaction,
            self.viewport,
            0.0,
            self.time_ms,
            self.frame,
        );
        for effect in self.effects.iter_mut() {
            effect.resize(&ctx);
        }
    }

    // === Stats ===

    pub fn enable_stats(&mut self, enabled: bool) {
        self.stats_enabled = enabled;
        if !enabled {
            self.stats.reset();
            self.fps_meter.clear();
        }
    }

    pub fn stats(&self) -> FrameStats {
        self.stats.clone()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn active_entities(&self) -> usize {
        self.effects.iter().map(|e| e.active_entities()).sum()
    }

    pub fn config(&self) -> &FxConfig {
        &self.config
    }

    // === Teardown ===

    /// Tear down every effect and forget them; the timer starts over.
    /// Nothing is left half-alive, whatever state the scene was in.
    pub fn teardown(&mut self) {
        for mut effect in self.effects.drain(..) {
            effect.teardown();
        }
        self.draw_list.reset();
        self.timer.reset();
        self.interaction.reset();
        self.fps_meter.clear();
        self.stats.reset();
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
