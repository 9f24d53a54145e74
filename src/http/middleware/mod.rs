//! Router middleware.

pub mod observer;
pub mod probe;

pub use observer::log_request;
pub use probe::encoding_probe;
