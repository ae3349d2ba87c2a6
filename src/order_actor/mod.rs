//! Order-specific domain logic: the entity binding, its actions, errors and status transitions.

mod actions;
pub mod entity;
pub mod error;
pub mod transitions;

pub use actions::*;
pub use error::*;
pub use transitions::*;
