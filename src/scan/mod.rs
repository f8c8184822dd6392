pub mod contact;
pub mod machine;
pub mod reset;
pub mod session;

pub use machine::LifecycleCommand;
pub use reset::ResetGesture;
pub use session::ScanSession;
