//! Issue detection and quality scoring.

mod detector;
mod quality;

pub use detector::{detect_issues, DataIssues, IssueDetector};
pub use quality::QualityReport;
