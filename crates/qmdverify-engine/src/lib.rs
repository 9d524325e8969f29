//! Filtering, dependency roots and compatibility matrices over decoded
//! comparison results. No network or file access happens here.

pub mod deps;
pub mod filter;
pub mod matrix;
pub mod report;
pub mod version;

pub use deps::{DependencyGraph, identify_roots};
pub use filter::{EmptyReason, FilterCriteria, filter_response, matches_file, matches_result};
pub use matrix::{Cell, CompatibilityMatrix, device_order};
pub use report::{CheckReport, FileEntry, FileOutcome};
pub use version::{compare_versions, sort_versions_desc, version_matches};
