//! CLI library components for the dataset generator.

pub mod logging;
