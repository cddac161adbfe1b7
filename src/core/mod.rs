//! Core building blocks shared by every effect: logging/safety macros,
//! errors, small math types, deterministic randomness, frame timing and
//! the object pool.

#[macro_use]
pub mod utils;
pub mod error;
pub mod math;
pub mod pool;
pub mod random;
pub mod timing;
