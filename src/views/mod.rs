//! Screen controllers for the order list and the order detail, plus the text
//! formatting they share. Both compute totals through `domain::order_total`.

pub mod format;
pub mod order_detail;
pub mod order_list;

pub use order_detail::*;
pub use order_list::*;
