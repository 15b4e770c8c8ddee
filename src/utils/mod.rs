//! Shared utilities: the error taxonomy of the notification pipeline and
//! logging initialization.

pub mod error;
pub mod logging;
