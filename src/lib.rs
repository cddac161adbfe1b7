//! Cosmos FX - adaptive-quality backdrop effects in WASM
//!
//! Meteor showers, nebula clouds, a rotating star field and a skill
//! constellation, drawn on a 2d canvas and scaled to hold a frame rate.
//!
//! Layout:
//! - core/     - macros, errors, math, pools, timing
//! - domain/   - tiers, config, skill data
//! - spatial/  - Bezier paths, frustum
//! - systems/  - kernels, quality manager, input, effects
//! - scene/    - frame loop, draw list, browser facade
//! - api/      - kernel functions for JS

// Logging macros are exported from here, so this stays first.
#[macro_use]
pub mod core;
pub mod domain;
pub mod spatial;
pub mod systems;
pub mod scene;
pub mod api;

use wasm_bindgen::prelude::*;

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    fx_log!("cosmos-fx {} initialized", env!("CARGO_PKG_VERSION"));
}

#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub use crate::core::error::{FxError, FxResult};
pub use domain::config::FxConfig;
pub use domain::tiers::{QualityTier, TierSettings};
pub use scene::{DrawList, FrameStats, SceneCore};
pub use systems::effects::{Effect, MeteorShower, Nebula, SkillUniverse, StarField, Viewport};
pub use systems::quality::QualityManager;

#[cfg(target_arch = "wasm32")]
pub use scene::FxScene;
