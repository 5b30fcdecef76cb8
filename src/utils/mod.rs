//! Common utilities shared across modules

pub mod cancel;

pub use cancel::{cancellation, CancelHandle, CancelToken};
