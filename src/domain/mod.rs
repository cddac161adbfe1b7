pub mod config;
pub mod skills;
pub mod tiers;
