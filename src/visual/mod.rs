pub mod emitters;
pub mod fingerprint;
pub mod interactions;
pub mod particles;
pub mod plugin;
pub mod utils;
