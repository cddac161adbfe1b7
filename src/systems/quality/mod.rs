//! Quality Manager - adaptive tier controller
//!
//! Samples FPS once per frame into a bounded window and moves the tier one
//! step at a time when the window mean stays past a threshold for
//! `dwell_samples` consecutive frames. Listeners hear about every change
//! synchronously, before the frame that caused it renders.
//!
//! One instance is built by the scene and lent to every effect through
//! `EffectContext`; effects only ever read it.

#[path = "sample_window.rs"]
mod sample_window;

pub use sample_window::SampleWindow;

use serde::Serialize;

use crate::domain::config::QualityConfig;
use crate::domain::tiers::{DeviceHint, QualityTier, TierSettings};

/// Why the tier moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeCause {
    Measured,
    UserPreference,
}

/// Payload of a tier-change notification.
#[derive(Clone, Debug, PartialEq)]
pub struct TierChange {
    pub tier: QualityTier,
    pub previous: QualityTier,
    pub settings: TierSettings,
    pub cause: ChangeCause,
}

impl TierChange {
    /// `{ tier, previous, settings }` for JS listeners.
    pub fn to_json(&self) -> String {
        #[derive(Serialize)]
        struct Event<'a> {
            tier: QualityTier,
            previous: QualityTier,
            settings: &'a TierSettings,
        }
        serde_json::to_string(&Event { tier: self.tier, previous: self.previous, settings: &self.settings })
            .unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pressure {
    Neutral,
    Down(u32),
    Up(u32),
}

type Listener = Box<dyn FnMut(&TierChange)>;

pub struct QualityManager {
    config: QualityConfig,
    tier: QualityTier,
    settings: TierSettings,
    window: SampleWindow,
    pressure: Pressure,
    pinned: bool,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u32,
    changes: u32,
}

impl QualityManager {
    /// Starts at Balanced with an empty window.
    pub fn new(config: QualityConfig) -> Self {
        let window = SampleWindow::new(config.window_size);
        let tier = QualityTier::default();
        Self {
            config,
            tier,
            settings: tier.settings(),
            window,
            pressure: Pressure::Neutral,
            pinned: false,
            listeners: Vec::new(),
            next_listener: 0,
            changes: 0,
        }
    }

    pub fn with_initial_tier(mut self, tier: QualityTier) -> Self {
        self.tier = tier;
        self.settings = tier.settings();
        self
    }

    pub fn with_device_hint(self, hint: &DeviceHint) -> Self {
        let tier = QualityTier::initial_for(hint);
        self.with_initial_tier(tier)
    }

    // === Metrics ===

    /// Feed one frame delta (ms). Returns the change, if this sample caused
    /// one; listeners have already been called by then.
    pub fn update_metrics(&mut self, delta_time_ms: f64) -> Option<TierChange> {
        if !(delta_time_ms.is_finite() && delta_time_ms > 0.0) {
            return None;
        }
        self.window.push((1000.0 / delta_time_ms) as f32);
        if self.pinned {
            return None;
        }

        let mean = self.window.mean()?;
        self.pressure = if mean < self.config.low_fps {
            match self.pressure {
                Pressure::Down(n) => Pressure::Down(n + 1),
                _ => Pressure::Down(1),
            }
        } else if mean > self.config.high_fps {
            match self.pressure {
                Pressure::Up(n) => Pressure::Up(n + 1),
                _ => Pressure::Up(1),
            }
        } else {
            Pressure::Neutral
        };

        let target = match self.pressure {
            Pressure::Down(n) if n >= self.config.dwell_samples => self.tier.downgrade(),
            Pressure::Up(n) if n >= self.config.dwell_samples => self.tier.upgrade(),
            _ => return None,
        };

        // Measure the new tier from scratch either way.
        self.pressure = Pressure::Neutral;
        self.window.clear();
        self.transition(target, ChangeCause::Measured)
    }

    pub fn mean_fps(&self) -> Option<f32> {
        self.window.mean()
    }

    pub fn sample_count(&self) -> usize {
        self.window.len()
    }

    // === Reads ===

    #[inline]
    pub fn get_tier(&self) -> QualityTier {
        self.tier
    }

    #[inline]
    pub fn get_settings(&self) -> &TierSettings {
        &self.settings
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Number of tier changes so far, measured or pinned.
    pub fn change_count(&self) -> u32 {
        self.changes
    }

    /// Base count scaled by viewport area against the reference resolution
    /// (clamped), then by the tier multiplier. Never 0 for a non-zero base.
    pub fn get_adaptive_count(&self, base_count: usize, viewport_width: f32, viewport_height: f32) -> usize {
        if base_count == 0 {
            return 0;
        }
        let reference = self.config.reference_width * self.config.reference_height;
        let area = viewport_width * viewport_height;
        let scale = if area.is_finite() && area > 0.0 {
            (area / reference).clamp(self.config.min_area_scale, self.config.max_area_scale)
        } else {
            self.config.min_area_scale
        };
        let scaled = (base_count as f32 * scale * self.tier.count_multiplier()).round();
        (scaled as usize).max(1)
    }

    // === User preference ===

    /// `Some` pins the tier and stops automatic changes; `None` hands
    /// control back to the measurements, starting from the current tier.
    pub fn set_user_preference(&mut self, preference: Option<QualityTier>) -> Option<TierChange> {
        self.pressure = Pressure::Neutral;
        match preference {
            Some(tier) => {
                self.pinned = true;
                self.transition(tier, ChangeCause::UserPreference)
            }
            None => {
                self.pinned = false;
                self.window.clear();
                None
            }
        }
    }

    // === Listeners ===

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TierChange) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn transition(&mut self, tier: QualityTier, cause: ChangeCause) -> Option<TierChange> {
        if tier == self.tier {
            return None;
        }
        let change = TierChange { tier, previous: self.tier, settings: tier.settings(), cause };
        self.tier = tier;
        self.settings = change.settings;
        self.changes += 1;
        fx_log!(
            "quality tier {} -> {} ({:?})",
            change.previous.as_str(),
            change.tier.as_str(),
            cause
        );
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
        Some(change)
    }
}
