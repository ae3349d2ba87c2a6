//! System orchestration, startup, and shutdown logic.

pub mod admin_system;
pub mod logging;
pub mod operator;

pub use admin_system::*;
pub use logging::*;
pub use operator::*;
