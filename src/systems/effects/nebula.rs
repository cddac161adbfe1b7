//! Nebula: soft clouds orbiting a few slowly drifting centers.
//! Layout is kept in viewport-relative units so a resize needs no rebuild.

use std::f32::consts::TAU;

use super::{Effect, EffectContext, Viewport};
use crate::core::error::FxResult;
use crate::core::math::Vec2;
use crate::core::random::FastRandom;
use crate::domain::tiers::{NebulaSettings, QualityTier};
use crate::scene::{Color, DrawList};
use crate::systems::quality::TierChange;

/// Pairs closer than this share of their summed radii count as overlapping.
const OVERLAP_FACTOR: f32 = 0.8;

#[derive(Clone, Debug)]
struct Center {
    /// Home position, 0..1 of the viewport.
    home: Vec2,
    /// Drift amplitude, fraction of the short viewport side.
    drift: f32,
    phase: f32,
    speed: f32,
    /// Current position in pixels, shared read-only by the clouds.
    position: Vec2,
}

#[derive(Clone, Debug)]
struct Cloud {
    center: usize,
    /// Fraction of the short viewport side.
    orbit: f32,
    angle: f32,
    /// rad/s
    angular_speed: f32,
    /// Fraction of the short viewport side.
    radius: f32,
    base_alpha: f32,
    color: Color,
    /// Pulse phase, kept in [0, TAU).
    morph_phase: f32,
    morph_speed: f32,
    position: Vec2,
    alpha: f32,
    scale: f32,
}

pub struct Nebula {
    seed: u32,
    settings: NebulaSettings,
    centers: Vec<Center>,
    clouds: Vec<Cloud>,
    viewport: Viewport,
    /// dt gathered while skipping frames.
    pending_ms: f64,
    skipped: u32,
    mounted: bool,
}

impl Nebula {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            settings: QualityTier::default().settings().nebula,
            centers: Vec::new(),
            clouds: Vec::new(),
            viewport: Viewport::default(),
            pending_ms: 0.0,
            skipped: 0,
            mounted: false,
        }
    }

    pub fn cloud_count(&self) -> usize {
        self.clouds.len()
    }

    pub fn center_count(&self) -> usize {
        self.centers.len()
    }

    /// Current cloud positions in pixels.
    pub fn cloud_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.clouds.iter().map(|c| c.position)
    }

    /// Overlapping cloud pairs as (midpoint, strength in 0..1, glow radius,
    /// first cloud of the pair).
    fn overlaps(&self) -> impl Iterator<Item = (Vec2, f32, f32, usize)> + '_ {
        let short = self.viewport.width.min(self.viewport.height);
        let clouds = &self.clouds;
        (0..clouds.len()).flat_map(move |i| {
            (i + 1..clouds.len()).filter_map(move |j| {
                let (a, b) = (&clouds[i], &clouds[j]);
                let ra = a.radius * short * a.scale;
                let rb = b.radius * short * b.scale;
                let reach = (ra + rb) * OVERLAP_FACTOR;
                let d = a.position.distance(b.position);
                (d < reach).then(|| ((a.position + b.position) * 0.5, 1.0 - d / reach, ra.min(rb), i))
            })
        })
    }

    fn build(&mut self, settings: NebulaSettings, ctx: &EffectContext) {
        self.settings = settings;
        let mut rng = FastRandom::new(self.seed ^ 0x4E45_4255);

        let centers = settings.center_count.max(1);
        self.centers.clear();
        for _ in 0..centers {
            self.centers.push(Center {
                home: Vec2::new(rng.range(0.2, 0.8), rng.range(0.2, 0.8)),
                drift: rng.range(0.02, 0.08),
                phase: rng.angle(),
                speed: rng.range(0.02, 0.06),
                position: Vec2::zero(),
            });
        }

        let count = ctx
            .quality
            .get_adaptive_count(settings.cloud_count, self.viewport.width, self.viewport.height);
        self.clouds.clear();
        for i in 0..count {
            // Blue or purple, as in the reference palette.
            let color = if rng.chance(0.5) {
                Color::rgb(rng.range(100.0, 150.0) as u8, rng.range(150.0, 200.0) as u8, 255)
            } else {
                Color::rgb(rng.range(150.0, 200.0) as u8, rng.range(100.0, 150.0) as u8, rng.range(200.0, 255.0) as u8)
            };
            let base_alpha = rng.range(0.1, 0.3);
            self.clouds.push(Cloud {
                center: i % centers,
                orbit: rng.range(0.05, 0.3),
                angle: rng.angle(),
                angular_speed: rng.range(0.01, 0.05) * if rng.chance(0.5) { 1.0 } else { -1.0 },
                radius: rng.range(0.08, 0.25),
                base_alpha,
                color,
                morph_phase: rng.range(0.0, TAU),
                morph_speed: rng.range(0.5, 2.0),
                position: Vec2::zero(),
                alpha: base_alpha,
                scale: 1.0,
            });
        }
        self.step(0.0, 1.0, ctx);
    }

    fn step(&mut self, dt_s: f32, speed: f32, ctx: &EffectContext) {
        let vp = self.viewport;
        let short = vp.width.min(vp.height);

        for c in &mut self.centers {
            c.phase = (c.phase + c.speed * dt_s * TAU) % TAU;
            let (s, co) = ctx.kernels.sin_cos(c.phase);
            c.position = Vec2::new(c.home.x * vp.width, c.home.y * vp.height) + Vec2::new(co, s * 0.7) * (c.drift * short);
        }

        let morph = self.settings.morph;
        let centers = &self.centers;
        for cloud in &mut self.clouds {
            cloud.angle = (cloud.angle + cloud.angular_speed * TAU * dt_s * speed) % TAU;
            let (s, co) = ctx.kernels.sin_cos(cloud.angle);
            let anchor = centers.get(cloud.center).map_or(vp.center(), |c| c.position);
            let p = anchor + Vec2::new(co, s) * (cloud.orbit * short);
            if p.is_finite() {
                cloud.position = p;
            }
            if morph {
                cloud.morph_phase = (cloud.morph_phase + cloud.morph_speed * dt_s) % TAU;
                let (pulse_sin, _) = ctx.kernels.sin_cos(cloud.morph_phase);
                let pulse = (pulse_sin + 1.0) * 0.5;
                cloud.alpha = cloud.base_alpha * (0.7 + pulse * 0.3);
                cloud.scale = 0.9 + pulse * 0.2;
            } else {
                cloud.alpha = cloud.base_alpha;
                cloud.scale = 1.0;
            }
        }
    }
}

impl Effect for Nebula {
    fn name(&self) -> &'static str {
        "nebula"
    }

    fn setup(&mut self, ctx: &EffectContext) -> FxResult<()> {
        self.teardown();
        self.viewport = ctx.viewport.sanitized();
        self.build(ctx.settings().nebula, ctx);
        self.mounted = true;
        Ok(())
    }

    fn on_tier_change(&mut self, change: &TierChange, ctx: &EffectContext) {
        if self.mounted {
            self.build(change.settings.nebula, ctx);
        }
    }

    fn update(&mut self, ctx: &EffectContext) {
        if !self.mounted {
            return;
        }
        self.pending_ms += finite_or!(ctx.dt_ms, 0.0).max(0.0);
        self.skipped += 1;
        if self.skipped < self.settings.update_every.max(1) {
            return;
        }
        let dt_s = (self.pending_ms / 1000.0) as f32;
        self.pending_ms = 0.0;
        self.skipped = 0;
        self.step(dt_s, ctx.speed_multiplier, ctx);
    }

    fn render(&self, out: &mut DrawList) {
        let short = self.viewport.width.min(self.viewport.height);
        for cloud in &self.clouds {
            let r = cloud.radius * short * cloud.scale;
            out.glow(cloud.position.x, cloud.position.y, r, cloud.color, cloud.alpha);
            out.glow(cloud.position.x, cloud.position.y, r * 0.3, cloud.color, cloud.alpha * 0.5);
        }
        if self.settings.overlap_glow {
            for (mid, strength, r, i) in self.overlaps() {
                let cloud = &self.clouds[i];
                out.glow(mid.x, mid.y, r * (0.5 + 0.5 * strength), cloud.color, cloud.alpha * strength);
            }
        }
    }

    fn teardown(&mut self) {
        self.clouds.clear();
        self.centers.clear();
        self.pending_ms = 0.0;
        self.skipped = 0;
        self.mounted = false;
    }

    fn active_entities(&self) -> usize {
        self.clouds.len()
    }

    fn resize(&mut self, ctx: &EffectContext) {
        self.viewport = ctx.viewport.sanitized();
    }
}
