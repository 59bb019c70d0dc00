//! Holocron CLI support
//!
//! Loading of JSON inputs and the reports printed by the `holocron` binary.
//! Everything here is offline: inputs are files, nothing touches a store.

#![warn(unreachable_pub)]

pub mod input;
pub mod report;

pub use input::{load_answers, load_config, load_snapshot, load_template, read_json};
pub use report::{
    cross_tab_report, pages_report, summary_report, walk_pages, CrossTabReport, MetricsReport,
    PageView, PagesReport, SummaryReport,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
