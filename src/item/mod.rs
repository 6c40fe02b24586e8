/// Profile generator drawing from built-in sample pools.
pub mod random_generator;

/// In-process contacts store.
pub mod memory;

#[cfg(feature = "logger")]
/// This module provides a sink that logs every contact it receives.
pub mod logger;

#[cfg(feature = "csv")]
/// This module provides a CSV contact sink.
pub mod csv;

#[cfg(feature = "fake")]
/// This module provides a profile generator backed by the `fake` crate.
pub mod fake;

#[cfg(feature = "json")]
/// This module provides a JSON contact sink.
pub mod json;
