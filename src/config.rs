// config.rs

use std::fmt;

use bevy::prelude::Resource;
use serde::Deserialize;

use crate::emitter::EmitterConfig;
use crate::particles::{LinkConfig, ParticleConfig};
use crate::scan::machine::TeardownPolicy;

const SCAN_CONFIG_JSON: &str = include_str!("../assets/scan_config.json");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Contacts that must finish together for a complete scan
    pub required_contacts: usize,
    /// Progress gained per tick
    pub progress_step: f32,
    /// Particles emitted per tick at every contact still scanning
    pub scan_emission_per_tick: usize,
    /// Particles emitted at every contact when the scan completes
    pub completion_burst: usize,
    pub teardown_policy: TeardownPolicy,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            required_contacts: 5,
            progress_step: 0.03,
            scan_emission_per_tick: 2,
            completion_burst: 40,
            teardown_policy: TeardownPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Seconds between two activations that count as a reset
    pub double_tap_window: f64,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            double_tap_window: 0.5,
        }
    }
}

/// Everything tunable about the effect
#[derive(Resource, Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub scan: ScanSettings,
    pub particles: ParticleConfig,
    pub links: LinkConfig,
    pub emitter: EmitterConfig,
    pub input: InputSettings,
    /// Fixed seed for reproducible runs; entropy when absent
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "could not parse scan config: {}", e),
            ConfigError::Invalid(reason) => write!(f, "invalid scan config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ScanConfig {
    /// Load the embedded configuration
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_json(SCAN_CONFIG_JSON)
    }

    /// Parse and validate; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| Err(ConfigError::Invalid(reason.to_string()));

        if self.scan.required_contacts == 0 {
            return invalid("scan.required_contacts must be at least 1");
        }
        if !(self.scan.progress_step > 0.0 && self.scan.progress_step <= 1.0) {
            return invalid("scan.progress_step must be in (0, 1]");
        }

        let p = &self.particles;
        if p.capacity == 0 {
            return invalid("particles.capacity must be at least 1");
        }
        if !(p.drag > 0.0 && p.drag <= 1.0) {
            return invalid("particles.drag must be in (0, 1]");
        }
        if !p.gravity.is_finite() || !(p.max_lift >= 0.0 && p.max_lift.is_finite()) {
            return invalid("particles.gravity and particles.max_lift must be finite, lift non-negative");
        }
        for (name, (min, max)) in [("speed", p.speed), ("size", p.size), ("hue", p.hue)] {
            if !(min.is_finite() && max.is_finite() && min <= max) {
                return Err(ConfigError::Invalid(format!(
                    "particles.{} must be a finite [min, max] range",
                    name
                )));
            }
        }
        for (name, (min, max)) in [("life", p.life), ("ttl", p.ttl)] {
            if min < 1 || min > max {
                return Err(ConfigError::Invalid(format!(
                    "particles.{} must be a [min, max] range starting at 1 or more",
                    name
                )));
            }
        }

        if !(self.links.link_distance > 0.0 && self.links.link_distance.is_finite()) {
            return invalid("links.link_distance must be positive");
        }

        let e = &self.emitter;
        if !(e.growth_duration >= 0.0 && e.fade_duration >= 0.0) {
            return invalid("emitter durations must be non-negative");
        }
        if !e.cold.is_finite() || !e.warm.is_finite() {
            return invalid("emitter cold/warm parameters must be finite");
        }

        if !(self.input.double_tap_window > 0.0) {
            return invalid("input.double_tap_window must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_loads() {
        let config = ScanConfig::load().unwrap();
        assert_eq!(config.scan.required_contacts, 5);
        assert_eq!(config.particles.capacity, 2500);
        assert_eq!(config.links.sample_limit, 100);
        assert_eq!(config.emitter.growth_duration, 1.4);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = ScanConfig::from_json(r#"{ "scan": { "progress_step": 0.1 } }"#).unwrap();

        assert_eq!(config.scan.progress_step, 0.1);
        assert_eq!(config.scan.required_contacts, 5);
        assert_eq!(config.particles, ParticleConfig::default());
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn test_teardown_policy_and_seed() {
        let config = ScanConfig::from_json(
            r#"{ "scan": { "teardown_policy": "on_lift" }, "rng_seed": 42 }"#,
        )
        .unwrap();

        assert_eq!(config.scan.teardown_policy, TeardownPolicy::OnLift);
        assert_eq!(config.rng_seed, Some(42));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ScanConfig::from_json(r#"{ "scan": { "progress_step": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ScanConfig::from_json(r#"{ "particles": { "life": [50, 40] } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ScanConfig::from_json(r#"{ "links": { "link_distance": -1 } }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        assert!(matches!(
            ScanConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
