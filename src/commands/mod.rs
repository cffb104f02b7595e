//! Command implementations for the catminer CLI

pub mod completions;
pub mod run;
pub mod types;
pub mod version;
