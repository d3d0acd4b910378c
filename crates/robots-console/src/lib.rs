//! Console front end for the Robots log store
//!
//! Provides the application context, a live log viewer and the scenarios
//! behind the `robots` binary.

pub mod context;
pub mod scenarios;
pub mod settings;
pub mod viewer;

pub use context::AppContext;
pub use scenarios::{StressReport, run_demo, run_stress, run_watch};
pub use settings::Settings;
pub use viewer::{LogCursor, LogViewer};
