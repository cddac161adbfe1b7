mod frame_timer;

pub use frame_timer::{FrameTimer, DEFAULT_DELTA_MS, MAX_DELTA_MS};
