//! Per-frame systems: numeric kernels, the quality controller, input
//! tracking and the effect controllers that sit on top of them.

pub mod effects;
pub mod interaction;
pub mod kernels;
pub mod quality;
