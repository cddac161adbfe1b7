/// Six normalized clip planes (left, right, bottom, top, near, far), each
/// `[a, b, c, d]` with `a*x + b*y + c*z + d >= 0` inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub planes: [[f32; 4]; 6],
}

impl Frustum {
    /// Extract planes from a column-major view-projection matrix.
    /// Returns None unless exactly 16 values are given.
    pub fn from_view_projection(m: &[f32]) -> Option<Self> {
        if m.len() != 16 {
            return None;
        }
        let mut planes = [
            [m[3] + m[0], m[7] + m[4], m[11] + m[8], m[15] + m[12]],
            [m[3] - m[0], m[7] - m[4], m[11] - m[8], m[15] - m[12]],
            [m[3] + m[1], m[7] + m[5], m[11] + m[9], m[15] + m[13]],
            [m[3] - m[1], m[7] - m[5], m[11] - m[9], m[15] - m[13]],
            [m[3] + m[2], m[7] + m[6], m[11] + m[10], m[15] + m[14]],
            [m[3] - m[2], m[7] - m[6], m[11] - m[10], m[15] - m[14]],
        ];
        for plane in &mut planes {
            let len = (plane[0] * plane[0] + plane[1] * plane[1] + plane[2] * plane[2]).sqrt();
            if len > 0.0 {
                for v in plane.iter_mut() {
                    *v /= len;
                }
            }
        }
        Some(Self { planes })
    }

    /// Inside unless more than `margin` behind any plane.
    #[inline]
    pub fn contains(&self, x: f32, y: f32, z: f32, margin: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p[0] * x + p[1] * y + p[2] * z + p[3] >= -margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Mat4;

    #[test]
    fn wrong_length_matrix_has_no_frustum() {
        assert!(Frustum::from_view_projection(&[0.0; 9]).is_none());
    }

    #[test]
    fn perspective_frustum_keeps_front_and_drops_back() {
        let vp = Mat4::perspective(1.2, 1.0, 0.1, 500.0);
        let f = Frustum::from_view_projection(vp.as_slice()).unwrap();
        assert!(f.contains(0.0, 0.0, -50.0, 0.0));
        assert!(!f.contains(0.0, 0.0, 50.0, 0.0));
        assert!(!f.contains(0.0, 0.0, -1000.0, 0.0));
        // Far off to the side
        assert!(!f.contains(500.0, 0.0, -10.0, 0.0));
    }
}
