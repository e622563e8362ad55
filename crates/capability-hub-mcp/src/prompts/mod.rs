//! Prompt providers: guided instructions for code and data work.

pub mod code_review;
pub mod data_analysis;

pub use code_review::code_prompts;
pub use data_analysis::analysis_prompts;
