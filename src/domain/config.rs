//! Runtime configuration, loaded from JSON handed over by the page.
//! Every field has a default so `{}` is a valid config.

use serde::{Deserialize, Serialize};

use crate::core::error::{FxError, FxResult};
use crate::core::timing::{DEFAULT_DELTA_MS, MAX_DELTA_MS};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Rolling FPS window length in samples.
    pub window_size: usize,
    /// Mean FPS below this pushes towards a cheaper tier.
    pub low_fps: f32,
    /// Mean FPS above this pushes towards a richer tier.
    pub high_fps: f32,
    /// Consecutive samples past a threshold before the tier moves.
    pub dwell_samples: u32,
    pub reference_width: f32,
    pub reference_height: f32,
    pub min_area_scale: f32,
    pub max_area_scale: f32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            window_size: 60,
            low_fps: 30.0,
            high_fps: 55.0,
            dwell_samples: 90,
            reference_width: 1920.0,
            reference_height: 1080.0,
            min_area_scale: 0.5,
            max_area_scale: 2.0,
        }
    }
}

impl QualityConfig {
    pub fn validate(&self) -> FxResult<()> {
        if self.window_size == 0 {
            return Err(FxError::InvalidConfig("quality.window_size must be >= 1".into()));
        }
        if self.dwell_samples == 0 {
            return Err(FxError::InvalidConfig("quality.dwell_samples must be >= 1".into()));
        }
        if !(self.low_fps < self.high_fps) {
            return Err(FxError::InvalidConfig(format!(
                "quality.low_fps ({}) must be below quality.high_fps ({})",
                self.low_fps, self.high_fps
            )));
        }
        if !(self.reference_width > 0.0 && self.reference_height > 0.0) {
            return Err(FxError::InvalidConfig("quality reference resolution must be positive".into()));
        }
        if !(self.min_area_scale > 0.0 && self.min_area_scale <= self.max_area_scale) {
            return Err(FxError::InvalidConfig("quality area scale bounds are inverted".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub default_delta_ms: f64,
    pub max_delta_ms: f64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self { default_delta_ms: DEFAULT_DELTA_MS, max_delta_ms: MAX_DELTA_MS }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Try the accelerated kernels first; false forces the fallback table.
    pub prefer_accelerated: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { prefer_accelerated: true }
    }
}

/// Hard ceilings for pooled entities, independent of tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_meteors: usize,
    pub max_particles: usize,
    pub max_sparkles: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_meteors: 20, max_particles: 200, max_sparkles: 128 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    pub quality: QualityConfig,
    pub timer: TimerConfig,
    pub backend: BackendConfig,
    pub pools: PoolConfig,
    /// Seed for every effect's generator.
    pub seed: u32,
}

impl FxConfig {
    pub fn from_json(json: &str) -> FxResult<Self> {
        let config: FxConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FxResult<()> {
        self.quality.validate()?;
        if !(self.timer.max_delta_ms > 0.0) {
            return Err(FxError::InvalidConfig("timer.max_delta_ms must be positive".into()));
        }
        if self.pools.max_meteors == 0 || self.pools.max_particles == 0 {
            return Err(FxError::InvalidConfig("pool ceilings must be >= 1".into()));
        }
        Ok(())
    }
}
