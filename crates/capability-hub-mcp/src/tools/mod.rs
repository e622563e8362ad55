//! Tool providers.
//!
//! Each module exposes a function returning its descriptors; nothing is
//! registered at import time.

pub mod calculator;
pub mod file_operations;
pub mod text_processing;

pub use calculator::calculator_tools;
pub use file_operations::file_tools;
pub use text_processing::text_tools;
