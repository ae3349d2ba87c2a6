pub mod customer;
pub mod order;
pub mod status;

pub use customer::*;
pub use order::*;
pub use status::*;
