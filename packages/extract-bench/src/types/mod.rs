//! Wire types exchanged with the benchmark service.

pub mod report;
pub mod strategy;

pub use report::{ExtractionReport, StrategyResult};
pub use strategy::{Strategy, StrategyPromptDetail};
