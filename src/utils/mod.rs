//! Utility modules

pub mod string;
pub mod timeout;

pub use string::{truncate_str, truncate_with_suffix};
pub use timeout::{with_timeout, TimeoutError};
