//! Geometry used by the effects: precomputed Bezier trajectories and
//! view-frustum planes.

pub mod bezier;
pub mod frustum;

pub use bezier::{calculate_bezier_path, interpolate_point, BezierPath};
pub use frustum::Frustum;
