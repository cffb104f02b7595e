//! catminer - configuration-driven record mining for planetary catalog metadata
//!
//! Records ([`resource::Resource`]) are loaded into a [`resource::ResourceList`]
//! and run through an ordered [`strategy::Pipeline`] of configured strategies.
//! Each strategy narrows, annotates, reorders or pairs the active records;
//! nested pipelines run on the same list or on per-record asset lists.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod expression;
pub mod geometry;
pub mod logging;
pub mod resource;
pub mod strategy;
pub mod ui;
