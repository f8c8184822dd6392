pub mod links;
pub mod pool;

pub use links::{LinkConfig, ProximityLink, falloff, proximity_links};
pub use pool::{ParticleConfig, ParticlePool};
