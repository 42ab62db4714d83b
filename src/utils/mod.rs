//! Utility modules and helper functions
//!
//! Shared helpers for encodings, files and logging.

pub mod encoding;
pub mod file_utils;
pub mod logging;

pub use encoding::*;
pub use file_utils::*;
pub use logging::*;
