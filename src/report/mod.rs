//! Report assembly and rendering.
//!
//! [`build_report`] runs every aggregation over a dataset; the generator
//! renders the result as Markdown or JSON.

pub mod builder;
pub mod generator;

pub use builder::{build_report, ReportSettings};
pub use generator::{generate_json_report, generate_markdown_report};
