//! JS-facing surface that is not tied to a scene.

pub mod kernels;
