//! Star field: a rotating shell of stars projected through a perspective
//! camera at its center. Generation, culling and twinkle all go through
//! the numeric kernel table.

use std::f64::consts::TAU as TAU_F64;

use super::{Effect, EffectContext, Viewport};
use crate::core::error::FxResult;
use crate::core::math::Mat4;
use crate::core::random::hash01;
use crate::domain::tiers::{QualityTier, StarFieldSettings};
use crate::scene::{Color, DrawList};
use crate::systems::quality::TierChange;

const MIN_RADIUS: f32 = 50.0;
const MAX_RADIUS: f32 = 400.0;
const FOV_Y: f32 = 75.0 * std::f32::consts::PI / 180.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;
/// Culling slack in world units so stars do not pop at the edges.
const CULL_MARGIN: f32 = 4.0;
/// Idle rotation per 60 Hz frame (rad).
const BASE_ROTATION_X: f32 = 0.00005;
const BASE_ROTATION_Y: f32 = 0.0001;
/// Projected size = base * DEPTH_SCALE / w, clamped.
const DEPTH_SCALE: f32 = 150.0;

/// One star after projection, ready to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedStar {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub alpha: f32,
    pub color: Color,
    pub sparkle: bool,
}

pub struct StarField {
    start_index: usize,
    settings: StarFieldSettings,
    viewport: Viewport,
    // SoA, xyz-interleaved where noted
    positions: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
    /// Per-star LOD band: 0 near, 1 mid, 2 far.
    bands: Vec<u8>,
    rotation_x: f32,
    rotation_y: f32,
    /// f64 so twinkle phases stay exact over long sessions.
    time_s: f64,
    // Per-frame scratch
    cull_mask: Vec<u8>,
    visible: Vec<u32>,
    phase_in: Vec<f32>,
    phase_out: Vec<f32>,
    projected: Vec<ProjectedStar>,
    mounted: bool,
}

impl StarField {
    pub fn new(seed: u32) -> Self {
        Self {
            start_index: (seed as usize).wrapping_mul(100_003),
            settings: QualityTier::default().settings().stars,
            viewport: Viewport::default(),
            positions: Vec::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
            bands: Vec::new(),
            rotation_x: 0.0,
            rotation_y: 0.0,
            time_s: 0.0,
            cull_mask: Vec::new(),
            visible: Vec::new(),
            phase_in: Vec::new(),
            phase_out: Vec::new(),
            projected: Vec::new(),
            mounted: false,
        }
    }

    pub fn star_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn projected(&self) -> &[ProjectedStar] {
        &self.projected
    }

    pub fn rotation(&self) -> (f32, f32) {
        (self.rotation_x, self.rotation_y)
    }

    /// Column-major camera matrix for the current rotation.
    pub fn view_projection(&self) -> Mat4 {
        let aspect = if self.viewport.height > 0.0 { self.viewport.width / self.viewport.height } else { 1.0 };
        let view = Mat4::rotation_x(self.rotation_x).mul(&Mat4::rotation_y(self.rotation_y));
        Mat4::perspective(FOV_Y, aspect, NEAR, FAR).mul(&view)
    }

    fn generate(&mut self, settings: StarFieldSettings, ctx: &EffectContext) {
        self.settings = settings;
        let count = ctx
            .quality
            .get_adaptive_count(settings.star_count, self.viewport.width, self.viewport.height);
        let k = ctx.kernels;
        self.positions.clear();
        self.colors.clear();
        self.sizes.clear();
        k.generate_star_positions(count, self.start_index, MIN_RADIUS, MAX_RADIUS, &mut self.positions);
        k.generate_star_colors(count, self.start_index, &mut self.colors);
        k.generate_star_sizes(count, self.start_index, settings.size_multiplier, &mut self.sizes);

        let [near, mid, _] = k.lod_distribution(count, settings.lod_near_ratio, settings.lod_mid_ratio);
        self.bands.clear();
        self.bands.extend((0..count as u32).map(|i| {
            if i < near {
                0
            } else if i < near + mid {
                1
            } else {
                2
            }
        }));
        fx_log!("star field: {} stars ({} backend)", count, k.backend().as_str());
    }

    fn project(&mut self, ctx: &EffectContext) {
        let vp = self.view_projection();
        let k = ctx.kernels;
        if self.settings.frustum_cull {
            k.visible_indices(&self.positions, vp.as_slice(), CULL_MARGIN, &mut self.cull_mask, &mut self.visible);
        } else {
            self.visible.clear();
            self.visible.extend(0..self.sizes.len() as u32);
        }

        // Twinkle phases for the visible subset only.
        self.phase_in.clear();
        if self.settings.twinkle {
            let t = self.time_s;
            let start = self.start_index;
            self.phase_in.extend(self.visible.iter().map(|&i| {
                let g = start.wrapping_add(i as usize) as u32;
                let rate = 0.5 + 2.5 * hash01(g ^ 0x7417) as f64;
                (t * rate).rem_euclid(TAU_F64) as f32 + hash01(g ^ 0x0F0F) * std::f32::consts::TAU
            }));
            self.phase_out.resize(self.phase_in.len(), 0.0);
            k.sin_batch(&self.phase_in, &mut self.phase_out);
        }

        let (w, h) = (self.viewport.width, self.viewport.height);
        self.projected.clear();
        for (n, &i) in self.visible.iter().enumerate() {
            let i = i as usize;
            let p = &self.positions[i * 3..i * 3 + 3];
            let [cx, cy, _, cw] = vp.transform_point(p[0], p[1], p[2]);
            if !(cw > NEAR) {
                continue;
            }
            let (nx, ny) = (cx / cw, cy / cw);
            if nx.abs() > 1.05 || ny.abs() > 1.05 {
                continue;
            }
            let band = self.bands[i];
            let twinkle = if self.settings.twinkle { 0.6 + 0.4 * self.phase_out[n] } else { 1.0 };
            let far_dim = if band == 2 { 0.6 } else { 1.0 };
            let depth = (DEPTH_SCALE / cw).clamp(0.25, 1.5);
            let c = &self.colors[i * 3..i * 3 + 3];
            let star = ProjectedStar {
                x: (nx * 0.5 + 0.5) * w,
                y: (0.5 - ny * 0.5) * h,
                size: self.sizes[i] * depth * far_dim,
                alpha: (twinkle * far_dim).clamp(0.0, 1.0),
                color: Color::from_unit(c[0], c[1], c[2]),
                sparkle: self.settings.sparkle && band == 0,
            };
            self.projected.push(star);
        }
    }
}

impl Effect for StarField {
    fn name(&self) -> &'static str {
        "star-field"
    }

    fn setup(&mut self, ctx: &EffectContext) -> FxResult<()> {
        self.teardown();
        self.viewport = ctx.viewport.sanitized();
        self.generate(ctx.settings().stars, ctx);
        self.project(ctx);
        self.mounted = true;
        Ok(())
    }

    fn on_tier_change(&mut self, change: &TierChange, ctx: &EffectContext) {
        if self.mounted {
            self.generate(change.settings.stars, ctx);
        }
    }

    fn update(&mut self, ctx: &EffectContext) {
        if !self.mounted {
            return;
        }
        let frame_scale = ctx.frame_scale();
        let (dx, dy) = ctx.kernels.calculate_rotation_delta(
            BASE_ROTATION_X,
            BASE_ROTATION_Y,
            ctx.speed_multiplier,
            frame_scale,
        );
        self.rotation_x = finite_or!((self.rotation_x + dx) % std::f32::consts::TAU, 0.0);
        self.rotation_y = finite_or!((self.rotation_y + dy) % std::f32::consts::TAU, 0.0);
        self.time_s += finite_or!(ctx.dt_ms, 0.0).max(0.0) / 1000.0;
        self.project(ctx);
    }

    fn render(&self, out: &mut DrawList) {
        for s in &self.projected {
            if s.sparkle {
                out.glow(s.x, s.y, s.size * 3.0, s.color, s.alpha * 0.4);
            }
            out.circle(s.x, s.y, s.size * 0.5, s.color, s.alpha);
        }
    }

    fn teardown(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.sizes.clear();
        self.bands.clear();
        self.cull_mask.clear();
        self.visible.clear();
        self.projected.clear();
        self.rotation_x = 0.0;
        self.rotation_y = 0.0;
        self.time_s = 0.0;
        self.mounted = false;
    }

    fn active_entities(&self) -> usize {
        self.sizes.len()
    }

    fn resize(&mut self, ctx: &EffectContext) {
        self.viewport = ctx.viewport.sanitized();
    }
}
