pub mod ambient;
pub mod factory;
pub mod growth;
pub mod manager;

pub use ambient::{AmbientFields, step_ambient_fields};
pub use factory::{EmitterConfig, EmitterFactory};
pub use manager::EmitterManager;
