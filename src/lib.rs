//! Automated watch-progress updates for the LMS video player.
//!
//! Logs in with the configured account, recovers the video id and duration
//! from the target course page, then submits a progress record claiming
//! every second of the video was watched.

pub mod config;
pub mod extract;
pub mod progress;
pub mod session;
pub mod target;

// Re-export main types for easy access
pub use crate::config::Config;
pub use crate::progress::{ProgressForm, ProgressRecord};
pub use crate::session::LmsSession;
pub use crate::target::TargetReference;

/// Tracing filter directives for command-line runs. The binary crate
/// (`lms_progress`) and this library are distinct tracing targets, so the
/// directives name both; the bare level covers third-party crates.
pub fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "lms_progress=debug,lms_progress_rust=debug,info"
    } else {
        "lms_progress=info,lms_progress_rust=info,warn"
    }
}

/// Result type for progress pipeline operations
pub type Result<T> = std::result::Result<T, LmsError>;

/// Error types for the progress pipeline
#[derive(thiserror::Error, Debug)]
pub enum LmsError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Login failed: {0}")]
    Auth(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Progress update failed: {0}")]
    Submission(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
