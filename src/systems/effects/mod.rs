//! Effect controllers
//!
//! Each effect owns its entities outright and sees the rest of the frame
//! only through a read-only `EffectContext`. Effects never talk to each
//! other; the scene just runs them side by side.

mod meteor_shower;
mod nebula;
mod skill_universe;
mod star_field;

pub use meteor_shower::{Meteor, MeteorKind, MeteorShower, TrailParticle};
pub use nebula::Nebula;
pub use skill_universe::SkillUniverse;
pub use star_field::StarField;

use crate::core::error::FxResult;
use crate::core::math::Vec2;
use crate::core::timing::DEFAULT_DELTA_MS;
use crate::domain::tiers::TierSettings;
use crate::scene::DrawList;
use crate::systems::kernels::NumericKernels;
use crate::systems::quality::{QualityManager, TierChange};

/// Drawing surface size in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Non-finite or negative sizes collapse to 0.
    pub fn sanitized(self) -> Self {
        Self {
            width: finite_or!(self.width, 0.0).max(0.0),
            height: finite_or!(self.height, 0.0).max(0.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    #[inline]
    pub fn contains(&self, p: Vec2, margin: f32) -> bool {
        p.x >= -margin && p.y >= -margin && p.x <= self.width + margin && p.y <= self.height + margin
    }
}

/// Everything an effect may read during one frame.
pub struct EffectContext<'a> {
    pub dt_ms: f64,
    pub time_ms: f64,
    pub viewport: Viewport,
    pub speed_multiplier: f32,
    pub pointer: Option<Vec2>,
    pub quality: &'a QualityManager,
    pub kernels: &'a dyn NumericKernels,
    pub frame: u64,
}

impl<'a> EffectContext<'a> {
    /// dt in nominal 60 Hz frames; the per-frame constants are tuned in
    /// these units.
    #[inline]
    pub fn frame_scale(&self) -> f32 {
        (self.dt_ms / DEFAULT_DELTA_MS) as f32
    }

    #[inline]
    pub fn settings(&self) -> &TierSettings {
        self.quality.get_settings()
    }
}

pub trait Effect {
    fn name(&self) -> &'static str;

    /// Allocate entities for the current tier. An error means this effect
    /// stays unmounted; nothing else is affected.
    fn setup(&mut self, ctx: &EffectContext) -> FxResult<()>;

    fn on_tier_change(&mut self, change: &TierChange, ctx: &EffectContext);

    fn update(&mut self, ctx: &EffectContext);

    fn render(&self, out: &mut DrawList);

    /// Drop every entity and pending timer. Safe to call twice.
    fn teardown(&mut self);

    fn active_entities(&self) -> usize;

    /// Records held by this effect's pools, live or not.
    fn pooled_capacity(&self) -> usize {
        0
    }

    /// `ctx.viewport` holds the new size.
    fn resize(&mut self, ctx: &EffectContext) {
        let _ = ctx;
    }

    fn on_click(&mut self, position: Vec2, ctx: &EffectContext) {
        let _ = (position, ctx);
    }
}
