//! Kernel table exported as plain functions, for page code that wants the
//! batch math without mounting a scene. The backend is loaded on first
//! call and kept for the life of the module.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::core::math::Vec2;
use crate::domain::config::BackendConfig;
use crate::spatial::bezier;
use crate::systems::kernels::{KernelSlot, NumericKernels};

thread_local! {
    static KERNELS: RefCell<KernelSlot> = RefCell::new(KernelSlot::default());
}

fn with_kernels<R>(f: impl FnOnce(&dyn NumericKernels) -> R) -> R {
    KERNELS.with(|slot| {
        let mut slot = slot.borrow_mut();
        f(slot.get_or_load(&BackendConfig::default()).kernels())
    })
}

/// "accelerated" or "fallback".
#[wasm_bindgen]
pub fn kernel_backend() -> String {
    with_kernels(|k| k.backend().as_str().to_string())
}

// === Trig ===

#[wasm_bindgen]
pub fn fast_sin_batch(input: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; input.len()];
    with_kernels(|k| k.sin_batch(input, &mut out));
    out
}

#[wasm_bindgen]
pub fn fast_cos_batch(input: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; input.len()];
    with_kernels(|k| k.cos_batch(input, &mut out));
    out
}

// === Star field ===

#[wasm_bindgen]
pub fn generate_star_positions(count: u32, start_index: u32, min_radius: f32, max_radius: f32) -> Vec<f32> {
    let mut out = Vec::new();
    with_kernels(|k| {
        k.generate_star_positions(count as usize, start_index as usize, min_radius, max_radius, &mut out)
    });
    out
}

#[wasm_bindgen]
pub fn generate_star_colors(count: u32, start_index: u32) -> Vec<f32> {
    let mut out = Vec::new();
    with_kernels(|k| k.generate_star_colors(count as usize, start_index as usize, &mut out));
    out
}

#[wasm_bindgen]
pub fn generate_star_sizes(count: u32, start_index: u32, size_multiplier: f32) -> Vec<f32> {
    let mut out = Vec::new();
    with_kernels(|k| k.generate_star_sizes(count as usize, start_index as usize, size_multiplier, &mut out));
    out
}

/// One byte per xyz triple: 1 visible, 0 culled.
#[wasm_bindgen]
pub fn cull_frustum(positions: &[f32], view_projection: &[f32], margin: f32) -> Vec<u8> {
    let mut mask = vec![0u8; positions.len() / 3];
    with_kernels(|k| k.cull_frustum(positions, view_projection, margin, &mut mask));
    mask
}

#[wasm_bindgen]
pub fn lod_distribution(total: u32, near_ratio: f32, mid_ratio: f32) -> Vec<u32> {
    with_kernels(|k| k.lod_distribution(total as usize, near_ratio, mid_ratio).to_vec())
}

// === Motion ===

#[wasm_bindgen]
pub fn calculate_speed_multiplier(is_moving: bool, click_time: f64, current_time: f64, current: f32) -> f32 {
    with_kernels(|k| k.calculate_speed_multiplier(is_moving, click_time, current_time, current))
}

/// `[dx, dy]`
#[wasm_bindgen]
pub fn calculate_rotation_delta(base_x: f32, base_y: f32, speed_multiplier: f32, delta_time: f32) -> Vec<f32> {
    let (dx, dy) = with_kernels(|k| k.calculate_rotation_delta(base_x, base_y, speed_multiplier, delta_time));
    vec![dx, dy]
}

// === Bezier ===

/// Flattened x,y samples, `segments + 1` of them.
#[wasm_bindgen]
pub fn precalculate_bezier_path(
    start_x: f32,
    start_y: f32,
    control_x: f32,
    control_y: f32,
    end_x: f32,
    end_y: f32,
    segments: u32,
) -> Vec<f32> {
    bezier::calculate_bezier_path(
        Vec2::new(start_x, start_y),
        Vec2::new(control_x, control_y),
        Vec2::new(end_x, end_y),
        segments as usize,
    )
    .into_iter()
    .flat_map(|p| [p.x, p.y])
    .collect()
}

/// Many paths at once from `[sx, sy, cx, cy, ex, ey]` records.
#[wasm_bindgen]
pub fn precalculate_bezier_paths(paths_data: &[f32], segments: u32) -> Vec<f32> {
    bezier::calculate_bezier_paths_batch(paths_data, segments as usize)
}

/// `[x, y]` at progress `t` along a flattened path.
#[wasm_bindgen]
pub fn interpolate_bezier_point(path: &[f32], t: f32) -> Vec<f32> {
    let points: Vec<Vec2> = path.chunks_exact(2).map(|p| Vec2::new(p[0], p[1])).collect();
    let p = bezier::interpolate_point(&points, t);
    vec![p.x, p.y]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_is_loaded_once() {
        let first = kernel_backend();
        assert_eq!(kernel_backend(), first);
        KERNELS.with(|slot| assert!(slot.borrow().is_loaded()));
    }

    #[test]
    fn sin_batch_matches_std() {
        let input = [0.0, 0.5, -1.25, 3.0];
        let out = fast_sin_batch(&input);
        assert_eq!(out.len(), 4);
        for (x, s) in input.iter().zip(&out) {
            assert!((x.sin() - s).abs() < 1e-4);
        }
    }

    #[test]
    fn star_outputs_have_expected_strides() {
        assert_eq!(generate_star_positions(10, 0, 50.0, 400.0).len(), 30);
        assert_eq!(generate_star_colors(10, 0).len(), 30);
        assert_eq!(generate_star_sizes(10, 0, 1.0).len(), 10);
    }

    #[test]
    fn bad_matrix_keeps_everything() {
        let positions = [0.0, 0.0, -10.0, 5.0, 5.0, 5.0];
        assert_eq!(cull_frustum(&positions, &[1.0; 3], 0.0), vec![1, 1]);
    }

    #[test]
    fn bezier_endpoints_are_exact() {
        let path = precalculate_bezier_path(0.0, 0.0, 50.0, 100.0, 100.0, 0.0, 20);
        assert_eq!(path.len(), 42);
        assert_eq!(interpolate_bezier_point(&path, 0.0), vec![0.0, 0.0]);
        assert_eq!(interpolate_bezier_point(&path, 1.0), vec![100.0, 0.0]);
        let mid = interpolate_bezier_point(&path, 0.5);
        assert!((mid[0] - 50.0).abs() < 1e-3);
        assert!((mid[1] - 50.0).abs() < 1e-3);
    }

    #[test]
    fn batch_paths_match_single_path() {
        let single = precalculate_bezier_path(0.0, 0.0, 50.0, 100.0, 100.0, 0.0, 8);
        let batch = precalculate_bezier_paths(&[0.0, 0.0, 50.0, 100.0, 100.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0], 8);
        assert_eq!(batch.len(), single.len() * 2);
        assert_eq!(&batch[..single.len()], &single[..]);
    }

    #[test]
    fn rotation_delta_pair() {
        assert_eq!(calculate_rotation_delta(0.001, 0.002, 2.0, 16.0), vec![0.032, 0.064]);
    }
}
