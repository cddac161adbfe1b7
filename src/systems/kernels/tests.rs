use super::*;
use crate::core::math::Mat4;
use crate::core::random::FastRandom;

fn accelerated() -> AcceleratedKernels {
    AcceleratedKernels::try_new().expect("sine table should pass its self-check")
}

fn random_angles(n: usize, seed: u32) -> Vec<f32> {
    let mut rng = FastRandom::new(seed);
    (0..n).map(|_| rng.range(-10.0, 10.0)).collect()
}

#[test]
fn sin_batch_backends_agree_on_ten_thousand_angles() {
    let angles = random_angles(10_000, 2024);
    let mut fast = vec![0.0; angles.len()];
    let mut reference = vec![0.0; angles.len()];
    accelerated().sin_batch(&angles, &mut fast);
    ScalarKernels.sin_batch(&angles, &mut reference);
    for (i, (a, b)) in fast.iter().zip(&reference).enumerate() {
        assert!((a - b).abs() <= 1e-4, "angle {} = {}: {} vs {}", i, angles[i], a, b);
    }
}

#[test]
fn backends_agree_on_accumulated_angles() {
    // Phases that grew for hours of frames before being handed in.
    let mut rng = FastRandom::new(18_667);
    let angles: Vec<f32> = (0..2_000)
        .map(|i| {
            let x = rng.range(1_000.0, 20_000.0);
            if i % 2 == 0 { x } else { -x }
        })
        .collect();
    let acc = accelerated();
    let mut fast = vec![0.0; angles.len()];
    let mut reference = vec![0.0; angles.len()];
    acc.sin_batch(&angles, &mut fast);
    ScalarKernels.sin_batch(&angles, &mut reference);
    for (i, (a, b)) in fast.iter().zip(&reference).enumerate() {
        assert!((a - b).abs() <= 1e-4, "angle {} = {}: {} vs {}", i, angles[i], a, b);
    }
    for &x in &angles {
        let (s, c) = acc.sin_cos(x);
        let (es, ec) = ScalarKernels.sin_cos(x);
        assert!((s - es).abs() <= 1e-4 && (c - ec).abs() <= 1e-4, "angle {}", x);
    }
}

#[test]
fn cos_batch_and_sin_cos_backends_agree() {
    let angles = random_angles(4_099, 7);
    let mut fast = vec![0.0; angles.len()];
    let mut reference = vec![0.0; angles.len()];
    let acc = accelerated();
    acc.cos_batch(&angles, &mut fast);
    ScalarKernels.cos_batch(&angles, &mut reference);
    for (a, b) in fast.iter().zip(&reference) {
        assert!((a - b).abs() <= 1e-4);
    }
    for &x in angles.iter().take(100) {
        let (s, c) = acc.sin_cos(x);
        let (es, ec) = ScalarKernels.sin_cos(x);
        assert!((s - es).abs() <= 1e-4 && (c - ec).abs() <= 1e-4);
    }
}

#[test]
fn batch_writes_only_overlapping_length() {
    let mut out = [9.0_f32; 3];
    accelerated().sin_batch(&[0.0, 0.0, 0.0, 0.0, 0.0], &mut out);
    assert_eq!(out, [0.0, 0.0, 0.0]);
    let mut long = [9.0_f32; 6];
    ScalarKernels.sin_batch(&[0.0, 0.0], &mut long);
    assert_eq!(long, [0.0, 0.0, 9.0, 9.0, 9.0, 9.0]);
}

#[test]
fn star_generation_is_deterministic_and_equivalent() {
    let acc = accelerated();
    let mut a = Vec::new();
    let mut b = Vec::new();
    acc.generate_star_positions(500, 10, 50.0, 400.0, &mut a);
    ScalarKernels.generate_star_positions(500, 10, 50.0, 400.0, &mut b);
    assert_eq!(a.len(), 1500);
    for (x, y) in a.iter().zip(&b) {
        // Only the trig differs between backends.
        assert!((x - y).abs() <= 400.0 * 1e-4);
    }
    for p in a.chunks_exact(3) {
        let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
        assert!(r >= 50.0 - 0.1 && r <= 400.0 + 0.1, "radius {}", r);
    }

    let mut colors_a = Vec::new();
    let mut colors_b = Vec::new();
    acc.generate_star_colors(64, 0, &mut colors_a);
    ScalarKernels.generate_star_colors(64, 0, &mut colors_b);
    assert_eq!(colors_a, colors_b);

    let mut sizes = Vec::new();
    acc.generate_star_sizes(1000, 0, 2.0, &mut sizes);
    assert!(sizes.iter().all(|s| (2.0..=9.0).contains(s)));
}

#[test]
fn culling_backends_agree() {
    let acc = accelerated();
    let mut positions = Vec::new();
    ScalarKernels.generate_star_positions(2_003, 0, 10.0, 300.0, &mut positions);
    let vp = Mat4::perspective(1.0, 16.0 / 9.0, 0.1, 1000.0).mul(&Mat4::rotation_y(0.4));

    let mut mask_a = vec![0u8; 2_003];
    let mut mask_b = vec![0u8; 2_003];
    let vis_a = acc.cull_frustum(&positions, vp.as_slice(), 2.0, &mut mask_a);
    let vis_b = ScalarKernels.cull_frustum(&positions, vp.as_slice(), 2.0, &mut mask_b);
    assert_eq!(mask_a, mask_b);
    assert_eq!(vis_a, vis_b);
    assert!(vis_a > 0 && vis_a < 2_003);

    let mut indices = Vec::new();
    let mut scratch = Vec::new();
    acc.visible_indices(&positions, vp.as_slice(), 2.0, &mut scratch, &mut indices);
    assert_eq!(scratch, mask_a);
    assert_eq!(indices.len(), vis_a);
    assert!(indices.iter().all(|&i| mask_a[i as usize] == 1));
}

#[test]
fn invalid_matrix_marks_everything_visible() {
    let positions = [0.0, 0.0, 100.0, 1.0, 2.0, 3.0];
    let mut mask = [0u8; 2];
    assert_eq!(ScalarKernels.cull_frustum(&positions, &[1.0; 4], 0.0, &mut mask), 2);
    assert_eq!(mask, [1, 1]);
    let mut indices = Vec::new();
    accelerated().visible_indices(&positions, &[], 0.0, &mut Vec::new(), &mut indices);
    assert_eq!(indices, vec![0, 1]);
}

#[test]
fn speed_multiplier_eases_towards_boosted_target() {
    let k = ScalarKernels;
    // Idle stays at 1.
    assert_eq!(k.calculate_speed_multiplier(false, -10_000.0, 0.0, 1.0), 1.0);
    // Moving eases 20 % of the way to 4.5 per call.
    let m = k.calculate_speed_multiplier(true, -10_000.0, 0.0, 1.0);
    assert!((m - 1.7).abs() < 1e-6);
    // Fresh click: target 1 + 4.3.
    let c = k.calculate_speed_multiplier(false, 1000.0, 1000.0, 1.0);
    assert!((c - (1.0 + 4.3 * 0.2)).abs() < 1e-5);
    // Click boost expires after 1200 ms.
    assert_eq!(k.calculate_speed_multiplier(false, 0.0, 1300.0, 1.0), 1.0);
}

#[test]
fn rotation_delta_and_lod_split() {
    let k = ScalarKernels;
    assert_eq!(k.calculate_rotation_delta(0.001, 0.002, 2.0, 16.0), (0.032, 0.064));
    assert_eq!(k.lod_distribution(1000, 0.25, 0.5), [250, 500, 250]);
    let [n, m, f] = k.lod_distribution(7, 0.9, 0.9);
    assert_eq!(n + m + f, 7);
}

#[test]
fn backend_selection_respects_config_and_loads_once() {
    let fallback = get_optimized_functions(&BackendConfig { prefer_accelerated: false });
    assert_eq!(fallback.backend(), BackendKind::Fallback);
    assert!(fallback.fallback_reason().is_some());

    let table = get_optimized_functions(&BackendConfig::default());
    assert_eq!(table.backend(), BackendKind::Accelerated);
    assert!(table.fallback_reason().is_none());

    let mut slot = KernelSlot::default();
    assert!(!slot.is_loaded());
    assert_eq!(slot.get_or_load(&BackendConfig::default()).backend(), BackendKind::Accelerated);
    // Later config changes do not re-select.
    assert_eq!(
        slot.get_or_load(&BackendConfig { prefer_accelerated: false }).backend(),
        BackendKind::Accelerated
    );
    assert!(slot.table().is_some());
}
