//! Meteor shower: meteors fly along precomputed quadratic Bezier paths and
//! shed trail particles. Both live in object pools owned by the shower.

use std::f32::consts::FRAC_PI_4;

use super::{Effect, EffectContext, Viewport};
use crate::core::error::FxResult;
use crate::core::math::Vec2;
use crate::core::pool::{AcquireOutcome, ExhaustionPolicy, ObjectPool, PoolHandle};
use crate::core::random::FastRandom;
use crate::domain::config::PoolConfig;
use crate::domain::tiers::{MeteorSettings, QualityTier};
use crate::scene::{Color, DrawList};
use crate::spatial::BezierPath;
use crate::systems::quality::TierChange;

/// Trail particles die at this age (60 Hz frames).
pub const PARTICLE_MAX_LIFE: f32 = 50.0;
const AIR_DRAG: f32 = 0.99;
const DRIFT: f32 = 0.02;
/// Cap on per-frame life advance, whatever the interaction boost.
const MAX_LIFE_STEP: f32 = 2.0;
/// Meteors this far outside the viewport are simulated but not drawn.
const VISIBILITY_MARGIN: f32 = 50.0;
/// Spacing of the staggered first wave (ms).
const INITIAL_STAGGER_MS: f64 = 350.0;
/// Meteors launched per click.
const CLICK_BURST: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeteorKind {
    Cool,
    Warm,
    Bright,
}

impl MeteorKind {
    fn pick(rng: &mut FastRandom) -> Self {
        let roll = rng.next_f32();
        if roll < 0.5 {
            MeteorKind::Cool
        } else if roll < 0.85 {
            MeteorKind::Warm
        } else {
            MeteorKind::Bright
        }
    }

    /// (core, glow, glow intensity, size scale)
    fn palette(self) -> (Color, Color, f32, f32) {
        match self {
            MeteorKind::Cool => (Color::rgb(200, 220, 255), Color::rgb(120, 170, 255), 0.8, 1.0),
            MeteorKind::Warm => (Color::rgb(255, 230, 200), Color::rgb(255, 170, 90), 0.9, 1.1),
            MeteorKind::Bright => (Color::WHITE, Color::rgb(255, 250, 220), 1.2, 1.4),
        }
    }
}

/// Pooled meteor record.
#[derive(Clone, Debug)]
pub struct Meteor {
    path: BezierPath,
    position: Vec2,
    /// Last finite position, used when interpolation misbehaves.
    last_good: Vec2,
    velocity: Vec2,
    progress: f32,
    life: f32,
    max_life: f32,
    speed: f32,
    size: f32,
    kind: MeteorKind,
    visible: bool,
    children: usize,
}

impl Default for Meteor {
    fn default() -> Self {
        Self {
            path: BezierPath::default(),
            position: Vec2::zero(),
            last_good: Vec2::zero(),
            velocity: Vec2::zero(),
            progress: 0.0,
            life: 0.0,
            max_life: 100.0,
            speed: 1.0,
            size: 1.0,
            kind: MeteorKind::Cool,
            visible: false,
            children: 0,
        }
    }
}

impl Meteor {
    /// Back to empty; keeps the path allocation.
    fn reset(&mut self) {
        self.path.clear();
        self.position = Vec2::zero();
        self.last_good = Vec2::zero();
        self.velocity = Vec2::zero();
        self.progress = 0.0;
        self.life = 0.0;
        self.visible = false;
        self.children = 0;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn kind(&self) -> MeteorKind {
        self.kind
    }

    pub fn path(&self) -> &BezierPath {
        &self.path
    }

    /// Fade in over the first eighth of the flight, out over the last quarter.
    fn fade(&self) -> f32 {
        (self.progress * 8.0).min(1.0) * ((1.0 - self.progress) * 4.0).min(1.0)
    }
}

/// Pooled trail particle. `parent` goes stale once its meteor finishes or
/// is recycled; the particle then lives out its own life.
#[derive(Clone, Debug, Default)]
pub struct TrailParticle {
    position: Vec2,
    velocity: Vec2,
    life: f32,
    size: f32,
    opacity: f32,
    color: Option<Color>,
    parent: Option<PoolHandle>,
}

impl TrailParticle {
    fn reset(&mut self) {
        *self = TrailParticle::default();
    }

    pub fn parent(&self) -> Option<PoolHandle> {
        self.parent
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    fn alpha(&self) -> f32 {
        self.opacity * (1.0 - self.life / PARTICLE_MAX_LIFE).max(0.0).powf(0.3)
    }
}

pub struct MeteorShower {
    meteors: ObjectPool<Meteor>,
    particles: ObjectPool<TrailParticle>,
    rng: FastRandom,
    settings: MeteorSettings,
    viewport: Viewport,
    /// Target number of meteors in flight for this tier and viewport.
    target: usize,
    /// Staggered first-wave spawns, ms remaining.
    pending: Vec<f64>,
    since_spawn_ms: f64,
    /// Scratch: meteors that finished this frame.
    finished: Vec<PoolHandle>,
    mounted: bool,
}

impl MeteorShower {
    pub fn new(pools: &PoolConfig, seed: u32) -> Self {
        let max_meteors = pools.max_meteors.max(1);
        let max_particles = pools.max_particles.max(1);
        Self {
            meteors: ObjectPool::new(Meteor::default, Meteor::reset, max_meteors / 2, max_meteors),
            // Trails degrade by skipping spawns, not by stealing live particles.
            particles: ObjectPool::new(TrailParticle::default, TrailParticle::reset, max_particles / 2, max_particles)
                .with_policy(ExhaustionPolicy::Refuse),
            rng: FastRandom::new(seed ^ 0x4D45_5445),
            settings: QualityTier::default().settings().meteor,
            viewport: Viewport::default(),
            target: 0,
            pending: Vec::new(),
            since_spawn_ms: 0.0,
            finished: Vec::new(),
            mounted: false,
        }
    }

    pub fn meteors(&self) -> &ObjectPool<Meteor> {
        &self.meteors
    }

    pub fn particles(&self) -> &ObjectPool<TrailParticle> {
        &self.particles
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn pending_spawns(&self) -> usize {
        self.pending.len()
    }

    fn apply_settings(&mut self, settings: MeteorSettings, ctx: &EffectContext) {
        self.settings = settings;
        let adaptive = ctx
            .quality
            .get_adaptive_count(settings.max_meteors, self.viewport.width, self.viewport.height);
        self.target = adaptive.min(self.meteors.max_capacity());
    }

    /// Launch one meteor from the top or right edge towards the lower left.
    fn spawn(&mut self) -> Option<PoolHandle> {
        if self.viewport.is_empty() {
            return None;
        }
        let acquired = self.meteors.acquire().ok()?;
        if acquired.outcome == AcquireOutcome::RecycledOldest {
            fx_log!("meteor pool full, recycled the oldest meteor");
        }

        let (w, h) = (self.viewport.width, self.viewport.height);
        let rng = &mut self.rng;
        let start = if rng.chance(0.5) {
            Vec2::new(rng.range(0.3 * w, 1.1 * w), -VISIBILITY_MARGIN)
        } else {
            Vec2::new(w + VISIBILITY_MARGIN, rng.range(-0.1 * h, 0.5 * h))
        };
        let heading = 3.0 * FRAC_PI_4 + rng.range(-0.25, 0.25);
        let length = rng.range(0.6, 1.0) * (w * w + h * h).sqrt();
        let dir = Vec2::new(heading.cos(), heading.sin());
        let end = start + dir * length;
        let normal = Vec2::new(-dir.y, dir.x);
        let control = start.lerp(end, 0.5) + normal * (rng.range(-0.15, 0.15) * length);

        let kind = MeteorKind::pick(rng);
        let (_, _, _, size_scale) = kind.palette();
        let size = rng.range(1.2, 2.4) * size_scale;
        let max_life = rng.range(80.0, 140.0);
        let speed = rng.range(0.8, 1.3);

        let segments = self.settings.bezier_segments.max(1);
        let meteor = self.meteors.get_mut(acquired.handle)?;
        meteor.path.respawn(start, control, end, segments);
        meteor.position = start;
        meteor.last_good = start;
        meteor.kind = kind;
        meteor.size = size;
        meteor.max_life = max_life;
        meteor.speed = speed;
        meteor.visible = self.viewport.contains(start, VISIBILITY_MARGIN);
        Some(acquired.handle)
    }

    fn advance_meteors(&mut self, life_step: f32) {
        let viewport = self.viewport;
        let finished = &mut self.finished;
        finished.clear();
        self.meteors.retain_active(|handle, m| {
            let prev = m.position;
            m.life += life_step * m.speed;
            m.progress = if m.max_life > 0.0 { (m.life / m.max_life).min(1.0) } else { 1.0 };
            let p = m.path.point_at(m.progress);
            if p.is_finite() {
                m.position = p;
                m.last_good = p;
            } else {
                m.position = m.last_good;
            }
            if life_step > 0.0 {
                let v = (m.position - prev) * (1.0 / life_step);
                if v.is_finite() {
                    m.velocity = v;
                }
            }
            m.visible = viewport.contains(m.position, VISIBILITY_MARGIN);
            let done = m.progress >= 1.0;
            if done {
                finished.push(handle);
            }
            !done
        });
    }

    fn shed_particles(&mut self, frame_scale: f32) {
        let chance = (self.settings.particle_spawn_chance * frame_scale).min(1.0);
        let per_meteor = self.settings.particles_per_meteor;
        let particles = &mut self.particles;
        let rng = &mut self.rng;
        self.meteors.for_each_active_mut(|handle, m| {
            if m.children >= per_meteor || !rng.chance(chance) {
                return;
            }
            let Ok(acquired) = particles.acquire() else {
                return;
            };
            let Some(p) = particles.get_mut(acquired.handle) else {
                return;
            };
            let (_, glow, _, _) = m.kind.palette();
            let jitter = Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0)) * m.size;
            let back = rng.range(0.1, 0.25);
            let lateral = rng.range(0.4, 0.8);
            let angle = rng.angle();
            p.position = m.position + jitter;
            p.velocity = m.velocity * -back + Vec2::new(angle.cos(), angle.sin()) * lateral;
            p.life = 0.0;
            p.size = rng.range(0.8, 1.6);
            p.opacity = 0.64;
            p.color = Some(glow);
            p.parent = Some(handle);
            m.children += 1;
        });
    }

    fn advance_particles(&mut self, life_step: f32) {
        let finished = &self.finished;
        let rng = &mut self.rng;
        self.particles.retain_active(|_, p| {
            if p.parent.map_or(false, |h| finished.contains(&h)) {
                return false;
            }
            p.position = p.position + p.velocity * life_step;
            p.life += life_step;
            p.velocity = p.velocity * AIR_DRAG.powf(life_step);
            p.velocity = p.velocity + Vec2::new(rng.range(-0.5, 0.5), rng.range(-0.5, 0.5)) * (DRIFT * life_step);
            p.life < PARTICLE_MAX_LIFE && p.position.is_finite()
        });
    }
}

impl Effect for MeteorShower {
    fn name(&self) -> &'static str {
        "meteor-shower"
    }

    fn setup(&mut self, ctx: &EffectContext) -> FxResult<()> {
        self.teardown();
        self.viewport = ctx.viewport.sanitized();
        self.apply_settings(ctx.settings().meteor, ctx);
        for i in 0..self.target {
            self.pending.push(i as f64 * INITIAL_STAGGER_MS + self.rng.range(0.0, 200.0) as f64);
        }
        self.mounted = true;
        fx_log!("{}: {} meteors planned", self.name(), self.target);
        Ok(())
    }

    fn on_tier_change(&mut self, change: &TierChange, ctx: &EffectContext) {
        // Meteors in flight finish naturally; only new spawns follow the tier.
        self.apply_settings(change.settings.meteor, ctx);
    }

    fn update(&mut self, ctx: &EffectContext) {
        if !self.mounted {
            return;
        }
        let dt = finite_or!(ctx.dt_ms, 0.0).max(0.0);
        let frame_scale = ctx.frame_scale();
        let life_step = ctx.speed_multiplier.clamp(0.0, MAX_LIFE_STEP) * frame_scale;

        // Staggered first wave.
        let mut due = 0;
        self.pending.retain_mut(|remaining| {
            *remaining -= dt;
            if *remaining <= 0.0 {
                due += 1;
                false
            } else {
                true
            }
        });
        for _ in 0..due {
            self.spawn();
        }

        // Steady state: top up one meteor per interval.
        self.since_spawn_ms += dt;
        if self.pending.is_empty()
            && self.meteors.active_count() < self.target
            && self.since_spawn_ms >= self.settings.spawn_interval_ms as f64
        {
            self.since_spawn_ms = 0.0;
            self.spawn();
        }

        self.advance_meteors(life_step);
        self.shed_particles(frame_scale);
        self.advance_particles(life_step);
    }

    fn render(&self, out: &mut DrawList) {
        let trail_len = self.settings.trail_length;
        for (_, p) in self.particles.iter_active() {
            if let Some(color) = p.color {
                out.circle(p.position.x, p.position.y, p.size, color, p.alpha());
            }
        }
        for (_, m) in self.meteors.iter_active() {
            if !m.visible {
                continue;
            }
            let (core, glow, intensity, _) = m.kind.palette();
            let fade = m.fade();
            for i in 1..=trail_len {
                let k = i as f32 / trail_len as f32;
                let t = m.progress - k * 0.12;
                if t <= 0.0 {
                    break;
                }
                let q = m.path.point_at(t);
                out.circle(q.x, q.y, m.size * (1.0 - k * 0.8), glow, 0.5 * fade * (1.0 - k));
            }
            if self.settings.glow {
                out.glow(m.position.x, m.position.y, m.size * 6.0 * intensity, glow, 0.35 * fade);
            }
            out.circle(m.position.x, m.position.y, m.size, core, fade);
        }
    }

    fn teardown(&mut self) {
        self.pending.clear();
        self.particles.clear();
        self.meteors.clear();
        self.finished.clear();
        self.since_spawn_ms = 0.0;
        self.mounted = false;
    }

    fn active_entities(&self) -> usize {
        self.meteors.active_count() + self.particles.active_count()
    }

    fn pooled_capacity(&self) -> usize {
        self.meteors.capacity() + self.particles.capacity()
    }

    fn resize(&mut self, ctx: &EffectContext) {
        self.viewport = ctx.viewport.sanitized();
        if self.mounted {
            self.apply_settings(self.settings, ctx);
        }
    }

    fn on_click(&mut self, _position: Vec2, _ctx: &EffectContext) {
        if !self.mounted {
            return;
        }
        for _ in 0..CLICK_BURST {
            self.spawn();
        }
    }
}
