//! Quality tiers and their per-effect settings
//!
//! Each tier maps to one immutable `TierSettings` table. Effects read only
//! their own section.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Performance,
    Balanced,
    Ultra,
}

impl Default for QualityTier {
    fn default() -> Self {
        QualityTier::Balanced
    }
}

/// What the host can tell us about the device before any frame is timed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeviceHint {
    pub logical_cores: Option<u32>,
    pub device_memory_gb: Option<f32>,
    pub is_mobile: bool,
}

impl QualityTier {
    pub const ALL: [QualityTier; 3] =
        [QualityTier::Performance, QualityTier::Balanced, QualityTier::Ultra];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Performance => "performance",
            QualityTier::Balanced => "balanced",
            QualityTier::Ultra => "ultra",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "performance" | "low" => Some(QualityTier::Performance),
            "balanced" | "medium" => Some(QualityTier::Balanced),
            "ultra" | "high" => Some(QualityTier::Ultra),
            _ => None,
        }
    }

    /// One step cheaper; saturates at Performance.
    pub fn downgrade(self) -> Self {
        match self {
            QualityTier::Ultra => QualityTier::Balanced,
            _ => QualityTier::Performance,
        }
    }

    /// One step richer; saturates at Ultra.
    pub fn upgrade(self) -> Self {
        match self {
            QualityTier::Performance => QualityTier::Balanced,
            _ => QualityTier::Ultra,
        }
    }

    /// Scale applied to entity counts after viewport scaling.
    pub fn count_multiplier(self) -> f32 {
        match self {
            QualityTier::Performance => 0.5,
            QualityTier::Balanced => 0.75,
            QualityTier::Ultra => 1.0,
        }
    }

    /// Starting tier from a device hint; Balanced when nothing is known.
    pub fn initial_for(hint: &DeviceHint) -> Self {
        if hint.is_mobile {
            return QualityTier::Performance;
        }
        match (hint.logical_cores, hint.device_memory_gb) {
            (Some(cores), _) if cores <= 2 => QualityTier::Performance,
            (_, Some(mem)) if mem < 4.0 => QualityTier::Performance,
            (Some(cores), Some(mem)) if cores >= 8 && mem >= 8.0 => QualityTier::Ultra,
            _ => QualityTier::Balanced,
        }
    }

    pub fn settings(self) -> TierSettings {
        TierSettings::for_tier(self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeteorSettings {
    pub max_meteors: usize,
    pub particles_per_meteor: usize,
    /// Per-frame probability that a meteor sheds a trail particle.
    pub particle_spawn_chance: f32,
    pub bezier_segments: usize,
    pub trail_length: usize,
    pub glow: bool,
    pub spawn_interval_ms: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NebulaSettings {
    pub cloud_count: usize,
    pub center_count: usize,
    pub morph: bool,
    /// Extra glow where two clouds overlap.
    pub overlap_glow: bool,
    /// Simulate every Nth frame (dt accumulates in between).
    pub update_every: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarFieldSettings {
    pub star_count: usize,
    pub twinkle: bool,
    pub sparkle: bool,
    pub frustum_cull: bool,
    pub size_multiplier: f32,
    pub lod_near_ratio: f32,
    pub lod_mid_ratio: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillSettings {
    pub orb_sparkles: usize,
    pub connections: bool,
    pub glow_layers: u32,
    pub update_every: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierSettings {
    pub tier: QualityTier,
    pub count_multiplier: f32,
    pub meteor: MeteorSettings,
    pub nebula: NebulaSettings,
    pub stars: StarFieldSettings,
    pub skills: SkillSettings,
}

impl TierSettings {
    pub fn for_tier(tier: QualityTier) -> Self {
        match tier {
            QualityTier::Performance => TierSettings {
                tier,
                count_multiplier: tier.count_multiplier(),
                meteor: MeteorSettings {
                    max_meteors: 6,
                    particles_per_meteor: 4,
                    particle_spawn_chance: 0.2,
                    bezier_segments: 20,
                    trail_length: 8,
                    glow: false,
                    spawn_interval_ms: 2400.0,
                },
                nebula: NebulaSettings { cloud_count: 6, center_count: 2, morph: false, overlap_glow: false, update_every: 3 },
                stars: StarFieldSettings {
                    star_count: 1500,
                    twinkle: false,
                    sparkle: false,
                    frustum_cull: true,
                    size_multiplier: 0.8,
                    lod_near_ratio: 0.1,
                    lod_mid_ratio: 0.3,
                },
                skills: SkillSettings { orb_sparkles: 0, connections: false, glow_layers: 1, update_every: 2 },
            },
            QualityTier::Balanced => TierSettings {
                tier,
                count_multiplier: tier.count_multiplier(),
                meteor: MeteorSettings {
                    max_meteors: 12,
                    particles_per_meteor: 8,
                    particle_spawn_chance: 0.4,
                    bezier_segments: 40,
                    trail_length: 14,
                    glow: true,
                    spawn_interval_ms: 1600.0,
                },
                nebula: NebulaSettings { cloud_count: 10, center_count: 3, morph: true, overlap_glow: true, update_every: 2 },
                stars: StarFieldSettings {
                    star_count: 3000,
                    twinkle: true,
                    sparkle: false,
                    frustum_cull: true,
                    size_multiplier: 1.0,
                    lod_near_ratio: 0.15,
                    lod_mid_ratio: 0.35,
                },
                skills: SkillSettings { orb_sparkles: 24, connections: true, glow_layers: 2, update_every: 1 },
            },
            QualityTier::Ultra => TierSettings {
                tier,
                count_multiplier: tier.count_multiplier(),
                meteor: MeteorSettings {
                    max_meteors: 20,
                    particles_per_meteor: 10,
                    particle_spawn_chance: 0.6,
                    bezier_segments: 60,
                    trail_length: 20,
                    glow: true,
                    spawn_interval_ms: 1000.0,
                },
                nebula: NebulaSettings { cloud_count: 16, center_count: 4, morph: true, overlap_glow: true, update_every: 1 },
                stars: StarFieldSettings {
                    star_count: 5000,
                    twinkle: true,
                    sparkle: true,
                    frustum_cull: true,
                    size_multiplier: 1.2,
                    lod_near_ratio: 0.2,
                    lod_mid_ratio: 0.4,
                },
                skills: SkillSettings { orb_sparkles: 64, connections: true, glow_layers: 3, update_every: 1 },
            },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_step_one_at_a_time_and_saturate() {
        assert_eq!(QualityTier::Ultra.downgrade(), QualityTier::Balanced);
        assert_eq!(QualityTier::Balanced.downgrade(), QualityTier::Performance);
        assert_eq!(QualityTier::Performance.downgrade(), QualityTier::Performance);
        assert_eq!(QualityTier::Performance.upgrade(), QualityTier::Balanced);
        assert_eq!(QualityTier::Ultra.upgrade(), QualityTier::Ultra);
    }

    #[test]
    fn richer_tiers_never_have_fewer_entities() {
        let p = TierSettings::for_tier(QualityTier::Performance);
        let b = TierSettings::for_tier(QualityTier::Balanced);
        let u = TierSettings::for_tier(QualityTier::Ultra);
        assert!(p.meteor.max_meteors <= b.meteor.max_meteors);
        assert!(b.meteor.max_meteors <= u.meteor.max_meteors);
        assert!(p.stars.star_count <= b.stars.star_count);
        assert!(b.nebula.cloud_count <= u.nebula.cloud_count);
    }

    #[test]
    fn parse_accepts_names_and_aliases() {
        assert_eq!(QualityTier::parse("Ultra"), Some(QualityTier::Ultra));
        assert_eq!(QualityTier::parse("low"), Some(QualityTier::Performance));
        assert_eq!(QualityTier::parse("auto"), None);
    }

    #[test]
    fn initial_tier_from_device_hint() {
        assert_eq!(QualityTier::initial_for(&DeviceHint::default()), QualityTier::Balanced);
        let phone = DeviceHint { is_mobile: true, ..DeviceHint::default() };
        assert_eq!(QualityTier::initial_for(&phone), QualityTier::Performance);
        let workstation = DeviceHint {
            logical_cores: Some(16),
            device_memory_gb: Some(8.0),
            is_mobile: false,
        };
        assert_eq!(QualityTier::initial_for(&workstation), QualityTier::Ultra);
    }

    #[test]
    fn settings_serialize_with_lowercase_tier() {
        let json = TierSettings::for_tier(QualityTier::Balanced).to_json();
        assert!(json.contains("\"tier\":\"balanced\""));
    }
}
