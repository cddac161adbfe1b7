//! Skill universe: one orb per skill, orbiting its category's ring.
//! Hovered orbs brighten and shed pooled sparkles.

use std::f32::consts::TAU;

use super::{Effect, EffectContext, Viewport};
use crate::core::error::{FxError, FxResult};
use crate::core::math::Vec2;
use crate::core::pool::ObjectPool;
use crate::core::random::FastRandom;
use crate::domain::config::PoolConfig;
use crate::domain::skills::SkillCatalog;
use crate::domain::tiers::{QualityTier, SkillSettings};
use crate::scene::{Color, DrawList};
use crate::systems::quality::TierChange;

/// Orb radius in px at scale 1.
const ORB_RADIUS: f32 = 8.0;
/// Pointer within this many orb radii hovers the orb.
const HOVER_REACH: f32 = 1.8;
/// Hover highlight easing per 60 Hz frame.
const HOVER_EASE: f32 = 0.15;
/// Sparkle life drains at this rate per second.
const SPARKLE_DECAY: f32 = 1.2;

const PALETTE: [Color; 5] = [
    Color::rgb(97, 218, 251),
    Color::rgb(255, 138, 101),
    Color::rgb(174, 129, 255),
    Color::rgb(129, 230, 160),
    Color::rgb(255, 214, 102),
];

#[derive(Clone, Debug)]
struct Orb {
    category: usize,
    /// Fraction of the short viewport side.
    orbit: f32,
    /// Current orbit angle, kept in [0, TAU).
    angle: f32,
    /// rad/s
    speed: f32,
    scale: f32,
    color: Color,
    position: Vec2,
    hovered: bool,
    /// Eased 0..1 highlight.
    highlight: f32,
}

#[derive(Clone, Debug, Default)]
struct Sparkle {
    position: Vec2,
    velocity: Vec2,
    life: f32,
    color: Option<Color>,
}

pub struct SkillUniverse {
    catalog: SkillCatalog,
    orbs: Vec<Orb>,
    /// Same-category neighbour pairs.
    links: Vec<(usize, usize)>,
    sparkles: ObjectPool<Sparkle>,
    settings: SkillSettings,
    viewport: Viewport,
    rng: FastRandom,
    pending_ms: f64,
    skipped: u32,
    mounted: bool,
}

impl SkillUniverse {
    pub fn new(catalog: SkillCatalog, pools: &PoolConfig, seed: u32) -> Self {
        let max_sparkles = pools.max_sparkles.max(1);
        Self {
            catalog,
            orbs: Vec::new(),
            links: Vec::new(),
            sparkles: ObjectPool::new(Sparkle::default, |s: &mut Sparkle| *s = Sparkle::default(), 0, max_sparkles),
            settings: QualityTier::default().settings().skills,
            viewport: Viewport::default(),
            rng: FastRandom::new(seed ^ 0x534B_494C),
            pending_ms: 0.0,
            skipped: 0,
            mounted: false,
        }
    }

    pub fn from_json(json: &str, pools: &PoolConfig, seed: u32) -> FxResult<Self> {
        Ok(Self::new(SkillCatalog::from_json(json)?, pools, seed))
    }

    pub fn orb_count(&self) -> usize {
        self.orbs.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn sparkle_count(&self) -> usize {
        self.sparkles.active_count()
    }

    /// Names of the skills under the pointer.
    pub fn hovered(&self) -> impl Iterator<Item = &str> + '_ {
        self.orbs
            .iter()
            .zip(self.catalog.skills())
            .filter(|(o, _)| o.hovered)
            .map(|(_, s)| s.name.as_str())
    }

    pub fn orb_position(&self, index: usize) -> Option<Vec2> {
        self.orbs.get(index).map(|o| o.position)
    }

    fn build(&mut self) {
        let categories = self.catalog.categories().len().max(1);
        let mut per_category = vec![0usize; categories];
        for skill in self.catalog.skills() {
            per_category[self.catalog.category_index(&skill.category)] += 1;
        }

        let mut seen = vec![0usize; categories];
        let mut last_in_category: Vec<Option<usize>> = vec![None; categories];
        self.orbs.clear();
        self.links.clear();
        for (i, skill) in self.catalog.skills().iter().enumerate() {
            let category = self.catalog.category_index(&skill.category);
            let slot = seen[category];
            seen[category] += 1;
            let proficiency = skill.level as f32 / 100.0;
            self.orbs.push(Orb {
                category,
                orbit: 0.08 + 0.02 * (slot % 3) as f32,
                angle: slot as f32 * TAU / per_category[category].max(1) as f32,
                speed: 0.3 + 0.05 * (slot % 4) as f32,
                scale: 0.8 + proficiency * 0.4,
                color: PALETTE[category % PALETTE.len()],
                position: Vec2::zero(),
                hovered: false,
                highlight: 0.0,
            });
            if let Some(prev) = last_in_category[category] {
                self.links.push((prev, i));
            }
            last_in_category[category] = Some(i);
        }
    }

    fn ring_center(&self, category: usize) -> Vec2 {
        let categories = self.catalog.categories().len();
        let center = self.viewport.center();
        if categories <= 1 {
            return center;
        }
        let short = self.viewport.width.min(self.viewport.height);
        let angle = category as f32 * TAU / categories as f32 - TAU / 4.0;
        center + Vec2::new(angle.cos(), angle.sin()) * (0.28 * short)
    }

    fn step(&mut self, dt_s: f32, ctx: &EffectContext) {
        let short = self.viewport.width.min(self.viewport.height);
        let ease = (HOVER_EASE * ctx.frame_scale() * self.settings.update_every.max(1) as f32).min(1.0);
        let centers: Vec<Vec2> = (0..self.catalog.categories().len().max(1)).map(|c| self.ring_center(c)).collect();

        for orb in &mut self.orbs {
            orb.angle = (orb.angle + orb.speed * ctx.speed_multiplier.max(0.0) * dt_s) % TAU;
            let (s, c) = ctx.kernels.sin_cos(orb.angle);
            let p = centers[orb.category] + Vec2::new(c, s) * (orb.orbit * short);
            if p.is_finite() {
                orb.position = p;
            }
            orb.hovered = ctx
                .pointer
                .map_or(false, |ptr| ptr.distance(orb.position) <= ORB_RADIUS * orb.scale * HOVER_REACH);
            let target = if orb.hovered { 1.0 } else { 0.0 };
            orb.highlight += (target - orb.highlight) * ease;
        }

        // Sparkles from hovered orbs, capped by tier.
        let budget = self.settings.orb_sparkles;
        for orb in self.orbs.iter().filter(|o| o.hovered) {
            if self.sparkles.active_count() >= budget {
                break;
            }
            let Ok(acquired) = self.sparkles.acquire() else {
                break;
            };
            if let Some(s) = self.sparkles.get_mut(acquired.handle) {
                let a = self.rng.angle();
                let v = self.rng.range(20.0, 60.0);
                s.position = orb.position;
                s.velocity = Vec2::new(a.cos(), a.sin()) * v;
                s.life = 1.0;
                s.color = Some(orb.color);
            }
        }
        self.sparkles.retain_active(|_, s| {
            s.position = s.position + s.velocity * dt_s;
            s.life -= SPARKLE_DECAY * dt_s;
            s.life > 0.0 && s.position.is_finite()
        });
    }
}

impl Effect for SkillUniverse {
    fn name(&self) -> &'static str {
        "skill-universe"
    }

    fn setup(&mut self, ctx: &EffectContext) -> FxResult<()> {
        self.teardown();
        if self.catalog.is_empty() {
            return Err(FxError::InvalidSkillData("no skills to show".into()));
        }
        self.viewport = ctx.viewport.sanitized();
        self.settings = ctx.settings().skills;
        self.build();
        self.step(0.0, ctx);
        self.mounted = true;
        Ok(())
    }

    fn on_tier_change(&mut self, change: &TierChange, _ctx: &EffectContext) {
        self.settings = change.settings.skills;
        if self.sparkles.active_count() > self.settings.orb_sparkles {
            self.sparkles.clear();
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
        self.step(dt_s, ctx);
    }

    fn render(&self, out: &mut DrawList) {
        if self.settings.connections {
            for &(a, b) in &self.links {
                let (oa, ob) = (&self.orbs[a], &self.orbs[b]);
                let alpha = 0.15 + 0.35 * oa.highlight.max(ob.highlight);
                out.line(oa.position.x, oa.position.y, ob.position.x, ob.position.y, 1.0, oa.color, alpha);
            }
        }
        for orb in &self.orbs {
            let r = ORB_RADIUS * orb.scale * (1.0 + 0.25 * orb.highlight);
            for layer in 1..=self.settings.glow_layers {
                let k = layer as f32;
                out.glow(orb.position.x, orb.position.y, r * (1.0 + k), orb.color, (0.25 + 0.3 * orb.highlight) / k);
            }
            out.circle(orb.position.x, orb.position.y, r, orb.color, 0.85 + 0.15 * orb.highlight);
        }
        for (_, s) in self.sparkles.iter_active() {
            if let Some(color) = s.color {
                out.circle(s.position.x, s.position.y, 1.5, color, s.life);
            }
        }
    }

    fn teardown(&mut self) {
        self.orbs.clear();
        self.links.clear();
        self.sparkles.clear();
        self.pending_ms = 0.0;
        self.skipped = 0;
        self.mounted = false;
    }

    fn active_entities(&self) -> usize {
        self.orbs.len() + self.sparkles.active_count()
    }

    fn pooled_capacity(&self) -> usize {
        self.sparkles.capacity()
    }

    fn resize(&mut self, ctx: &EffectContext) {
        self.viewport = ctx.viewport.sanitized();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::effects::test_support::{ctx, quality};

    const SKILLS: &str = r#"[
        {"name":"Rust","category":"systems","level":90},
        {"name":"C++","category":"systems","level":70},
        {"name":"Go","category":"systems","level":60},
        {"name":"WebGL","category":"graphics","level":80},
        {"name":"Canvas","category":"graphics","level":85}
    ]"#;

    fn universe() -> SkillUniverse {
        SkillUniverse::from_json(SKILLS, &PoolConfig::default(), 4).unwrap()
    }

    #[test]
    fn orbs_and_same_category_links() {
        let qm = quality();
        let mut u = universe();
        u.setup(&ctx(&qm, 0.0, 0)).unwrap();
        assert_eq!(u.orb_count(), 5);
        // systems: 2 links, graphics: 1
        assert_eq!(u.link_count(), 3);
        let mut list = DrawList::new();
        u.render(&mut list);
        assert_eq!(list.dropped(), 0);
        assert!(list.len() >= 5 + 3);
    }

    #[test]
    fn empty_catalog_fails_setup() {
        let qm = quality();
        let mut u = SkillUniverse::from_json("[]", &PoolConfig::default(), 1).unwrap();
        assert!(matches!(u.setup(&ctx(&qm, 0.0, 0)), Err(FxError::InvalidSkillData(_))));
        assert_eq!(u.active_entities(), 0);
    }

    #[test]
    fn bad_json_is_rejected() {
        assert!(SkillUniverse::from_json("{", &PoolConfig::default(), 1).is_err());
    }

    #[test]
    fn hovering_an_orb_emits_bounded_sparkles() {
        let qm = quality();
        let budget = qm.get_settings().skills.orb_sparkles;
        let mut u = universe();
        u.setup(&ctx(&qm, 0.0, 0)).unwrap();
        for f in 1..120u64 {
            let mut c = ctx(&qm, f as f64 * 16.67, f);
            // Track the first orb with the pointer.
            c.pointer = u.orb_position(0);
            u.update(&c);
            assert!(u.sparkle_count() <= budget);
        }
        assert_eq!(u.hovered().next(), Some("Rust"));
        assert!(u.sparkle_count() > 0);

        u.teardown();
        assert_eq!(u.sparkle_count(), 0);
        assert_eq!(u.orb_count(), 0);
    }

    #[test]
    fn no_pointer_no_hover() {
        let qm = quality();
        let mut u = universe();
        u.setup(&ctx(&qm, 0.0, 0)).unwrap();
        for f in 1..30u64 {
            u.update(&ctx(&qm, f as f64 * 16.67, f));
        }
        assert_eq!(u.hovered().count(), 0);
        assert_eq!(u.sparkle_count(), 0);
    }

    #[test]
    fn speed_change_after_long_idle_does_not_jump() {
        let qm = quality();
        let mut u = universe();
        u.setup(&ctx(&qm, 0.0, 0)).unwrap();
        let every = qm.get_settings().skills.update_every.max(1) as u64;
        let mut frame = 0u64;
        let mut run = |u: &mut SkillUniverse, frames: u64, multiplier: f32| {
            for _ in 0..frames {
                frame += 1;
                let mut c = ctx(&qm, frame as f64 * 16.67, frame);
                c.speed_multiplier = multiplier;
                u.update(&c);
            }
        };

        // A minute at rest.
        run(&mut u, 3600, 1.0);
        let before = u.orb_position(0).unwrap();
        run(&mut u, every, 1.0);
        let idle_step = u.orb_position(0).unwrap().distance(before);

        let before = u.orb_position(0).unwrap();
        run(&mut u, every, 1.5);
        let boosted_step = u.orb_position(0).unwrap().distance(before);

        assert!(idle_step > 0.0);
        assert!(boosted_step < 2.0 * idle_step, "idle {} boosted {}", idle_step, boosted_step);
    }
}
