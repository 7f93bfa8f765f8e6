//! Analysis modules.
//!
//! Grouping, ranking and bucketing queries over loaded results.

pub mod aggregator;

pub use aggregator::*;
