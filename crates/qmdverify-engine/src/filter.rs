use crate::version::version_matches;
use globset::GlobBuilder;
use qmdverify_types::{ComparisonResponse, ComparisonResult};
use serde::Serialize;

/// Client-side narrowing of comparison results.
///
/// Built once per invocation from command-line flags. Empty lists place no
/// constraint on their axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub devices: Vec<String>,
    pub versions: Vec<String>,
    pub files: Vec<String>,
    pub failed_only: bool,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices<I, S>(mut self, devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.devices = devices.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions = versions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_files<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn failed_only(mut self, failed_only: bool) -> Self {
        self.failed_only = failed_only;
        self
    }

    /// Apply the device and version predicates to one response.
    pub fn apply(&self, response: &ComparisonResponse) -> ComparisonResponse {
        filter_response(response, &self.devices, &self.versions)
    }

    pub fn matches_file(&self, filename: &str) -> bool {
        matches_file(filename, &self.files)
    }
}

/// Why a response filtered down to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The server compared against nothing in the first place.
    NoData,
    /// The server had results but none survived the filters.
    FilteredOut,
}

impl EmptyReason {
    /// Classify an empty filtered response from its unfiltered total.
    pub fn classify(original_total: usize) -> Self {
        if original_total == 0 {
            EmptyReason::NoData
        } else {
            EmptyReason::FilteredOut
        }
    }

    pub fn advisory(&self) -> &'static str {
        match self {
            EmptyReason::NoData => "Server has no hashtables to compare against this QMD file",
            EmptyReason::FilteredOut => "No devices matched your filter criteria",
        }
    }
}

pub fn matches_result(result: &ComparisonResult, devices: &[String], versions: &[String]) -> bool {
    let device_match = devices.is_empty() || devices.iter().any(|d| *d == result.device);
    let version_match =
        versions.is_empty() || versions.iter().any(|v| version_matches(&result.os_version, v));

    device_match && version_match
}

/// Keep only results matching both the device and version predicates.
///
/// `total_checked` is recounted from the kept results. With no device and
/// no version constraint the response comes back unchanged.
pub fn filter_response(
    response: &ComparisonResponse,
    devices: &[String],
    versions: &[String],
) -> ComparisonResponse {
    if devices.is_empty() && versions.is_empty() {
        return response.clone();
    }

    let keep = |results: &[ComparisonResult]| -> Vec<ComparisonResult> {
        results
            .iter()
            .filter(|r| matches_result(r, devices, versions))
            .cloned()
            .collect()
    };

    let compatible = keep(&response.compatible);
    let incompatible = keep(&response.incompatible);
    let total_checked = compatible.len() + incompatible.len();

    ComparisonResponse {
        compatible,
        incompatible,
        total_checked,
        mode: response.mode.clone(),
    }
}

/// True if the filename matches any pattern as a glob or contains it.
///
/// Globs follow shell rules where `*` stops at `/`. A pattern that is not a
/// valid glob still gets the substring check.
pub fn matches_file(filename: &str, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return true;
    }

    patterns
        .iter()
        .any(|pattern| glob_matches(pattern, filename) || filename.contains(pattern.as_str()))
}

fn glob_matches(pattern: &str, filename: &str) -> bool {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher().is_match(filename))
        .unwrap_or(false)
}
