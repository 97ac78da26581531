#![forbid(unsafe_code)]

//! Core: terminal sequence tables, device attribute probing, and capability resolution.

pub mod logging;
pub mod probe;
pub mod raw_mode;
pub mod resolve;
pub mod sequences;
pub mod term_db;

// Same paths as the no-op macros, which `#[macro_export]` puts at the root.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, trace, warn};
