use std::fmt;

use bevy::math::Vec2;
use serde::Deserialize;

/// Opaque handle to one visual sub-system instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterHandle(pub u64);

impl fmt::Display for EmitterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "emitter-{}", self.0)
    }
}

/// Live-tunable parameters of an emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitterParam {
    Speed,
    LinkDistance,
    Opacity,
}

impl EmitterParam {
    pub const ALL: [EmitterParam; 3] = [
        EmitterParam::Speed,
        EmitterParam::LinkDistance,
        EmitterParam::Opacity,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EmitterParams {
    /// Pixels per tick
    pub speed: f32,
    /// Pixels
    pub link_distance: f32,
    pub opacity: f32,
}

impl EmitterParams {
    pub fn get(&self, param: EmitterParam) -> f32 {
        match param {
            EmitterParam::Speed => self.speed,
            EmitterParam::LinkDistance => self.link_distance,
            EmitterParam::Opacity => self.opacity,
        }
    }

    pub fn set(&mut self, param: EmitterParam, value: f32) {
        match param {
            EmitterParam::Speed => self.speed = value,
            EmitterParam::LinkDistance => self.link_distance = value,
            EmitterParam::Opacity => self.opacity = value,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.speed.is_finite() && self.link_distance.is_finite() && self.opacity.is_finite()
    }
}

/// Configuration handed to the factory for every emitter
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Motes per emitter
    pub particle_count: usize,
    /// Side of the square region around the anchor, pixels
    pub region_size: f32,
    pub particle_size: (f32, f32),
    /// Instances the backend will hold at once
    pub max_instances: usize,
    /// Ease cold -> warm on creation
    pub growth_enabled: bool,
    /// Seconds
    pub growth_duration: f32,
    /// Seconds; 0 removes emitters immediately
    pub fade_duration: f32,
    pub cold: EmitterParams,
    pub warm: EmitterParams,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            particle_count: 40,
            region_size: 220.0,
            particle_size: (0.5, 2.0),
            max_instances: 8,
            growth_enabled: true,
            growth_duration: 1.4,
            fade_duration: 0.4,
            cold: EmitterParams {
                speed: 0.2,
                link_distance: 10.0,
                opacity: 0.0,
            },
            warm: EmitterParams {
                speed: 2.5,
                link_distance: 80.0,
                opacity: 0.8,
            },
        }
    }
}

impl EmitterConfig {
    /// Parameters an instance is created with
    pub fn initial_params(&self) -> EmitterParams {
        if self.growth_enabled {
            self.cold
        } else {
            self.warm
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmitterError {
    CapacityReached { limit: usize },
    InvalidConfig(String),
    UnknownInstance(EmitterHandle),
}

impl fmt::Display for EmitterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitterError::CapacityReached { limit } => {
                write!(f, "emitter capacity of {} instances reached", limit)
            }
            EmitterError::InvalidConfig(reason) => write!(f, "invalid emitter config: {}", reason),
            EmitterError::UnknownInstance(handle) => write!(f, "no live instance {}", handle),
        }
    }
}

impl std::error::Error for EmitterError {}

/// Capability surface of the visual sub-system backend.
///
/// The lifecycle manager only talks to emitters through this, so the
/// rendering side can be swapped or mocked.
pub trait EmitterFactory {
    fn create(&mut self, anchor: Vec2, config: &EmitterConfig)
    -> Result<EmitterHandle, EmitterError>;

    /// Release an instance. Unknown handles are ignored.
    fn destroy(&mut self, handle: EmitterHandle);

    fn set_parameter(
        &mut self,
        handle: EmitterHandle,
        param: EmitterParam,
        value: f32,
    ) -> Result<(), EmitterError>;

    fn reposition(&mut self, handle: EmitterHandle, anchor: Vec2);
}
