use crate::deps::DependencyGraph;
use crate::filter::{EmptyReason, FilterCriteria};
use qmdverify_types::{BatchComparisonResponse, ComparisonResponse};
use serde::Serialize;

/// What is shown for one file after filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum FileOutcome {
    Results(ComparisonResponse),
    Empty(EmptyReason),
}

impl FileOutcome {
    /// Filter a response and classify an empty result.
    pub fn evaluate(response: &ComparisonResponse, criteria: &FilterCriteria) -> Self {
        let filtered = criteria.apply(response);
        if filtered.total_checked == 0 {
            FileOutcome::Empty(EmptyReason::classify(response.total_checked))
        } else {
            FileOutcome::Results(filtered)
        }
    }

    pub fn has_incompatible(&self) -> bool {
        matches!(self, FileOutcome::Results(r) if !r.incompatible.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// `None` for a single-file job.
    pub name: Option<String>,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Final, filtered view of a comparison job.
///
/// The overall verdict is a value; the caller decides what a failure means
/// for the process exit status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub files: Vec<FileEntry>,
    /// Uploaded files that only appear as another file's dependency.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Set when a non-empty batch resolved to no root files at all.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub roots_empty: bool,
}

impl CheckReport {
    /// Report for a single-file job. File pattern and failed-only criteria
    /// apply to batches only.
    pub fn single(response: &ComparisonResponse, criteria: &FilterCriteria) -> Self {
        Self {
            files: vec![FileEntry {
                name: None,
                outcome: FileOutcome::evaluate(response, criteria),
            }],
            ..Default::default()
        }
    }

    /// Report for a batch job: root files in lexical order, narrowed by the
    /// file patterns and, when requested, to files with failures.
    pub fn batch(batch: &BatchComparisonResponse, criteria: &FilterCriteria) -> Self {
        let graph = DependencyGraph::from_batch(batch);
        let roots = graph.roots();

        if roots.is_empty() && !batch.is_empty() {
            tracing::warn!(
                files = batch.len(),
                "every uploaded file is a dependency of another; nothing to show"
            );
        }

        let mut files = Vec::new();
        for (filename, response) in batch.sorted() {
            if !roots.contains(filename) {
                tracing::debug!(file = filename, "hiding dependency file");
                continue;
            }

            if !criteria.matches_file(filename) {
                continue;
            }

            let outcome = FileOutcome::evaluate(response, criteria);
            if criteria.failed_only && !outcome.has_incompatible() {
                continue;
            }

            files.push(FileEntry {
                name: Some(filename.to_string()),
                outcome,
            });
        }

        Self {
            files,
            dependencies: graph.non_roots().into_iter().collect(),
            roots_empty: roots.is_empty() && !batch.is_empty(),
        }
    }

    /// False when any shown file has an incompatible result left after
    /// filtering.
    pub fn passed(&self) -> bool {
        !self.files.iter().any(|entry| entry.outcome.has_incompatible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmdverify_types::ComparisonResult;
    use std::collections::BTreeMap;

    fn result(device: &str, version: &str, deps: &[&str]) -> ComparisonResult {
        ComparisonResult {
            device: device.to_string(),
            os_version: version.to_string(),
            dependency_results: (!deps.is_empty())
                .then(|| deps.iter().map(|d| (d.to_string(), None)).collect::<BTreeMap<_, _>>()),
            ..Default::default()
        }
    }

    fn response(ok: &[(&str, &str)], bad: &[(&str, &str)], deps: &[&str]) -> ComparisonResponse {
        ComparisonResponse {
            compatible: ok.iter().map(|(d, v)| result(d, v, deps)).collect(),
            incompatible: bad.iter().map(|(d, v)| result(d, v, deps)).collect(),
            total_checked: ok.len() + bad.len(),
            mode: String::new(),
        }
    }

    #[test]
    fn test_single_pass_and_fail() {
        let passing = response(&[("rmpp", "3.22.4.2")], &[], &[]);
        assert!(CheckReport::single(&passing, &FilterCriteria::new()).passed());

        let failing = response(&[("rmpp", "3.22.4.2")], &[("rm1", "3.22.4.2")], &[]);
        let report = CheckReport::single(&failing, &FilterCriteria::new());
        assert!(!report.passed());
        assert_eq!(report.files[0].name, None);
    }

    #[test]
    fn test_single_filtered_failure_passes() {
        let failing = response(&[("rmpp", "3.22.4.2")], &[("rm1", "3.22.4.2")], &[]);
        let report = CheckReport::single(&failing, &FilterCriteria::new().with_devices(["rmpp"]));
        assert!(report.passed());
    }

    #[test]
    fn test_single_empty_reasons() {
        let none = ComparisonResponse::default();
        let report = CheckReport::single(&none, &FilterCriteria::new());
        assert_eq!(report.files[0].outcome, FileOutcome::Empty(EmptyReason::NoData));

        let some = response(&[("rmpp", "3.22.4.2")], &[], &[]);
        let report = CheckReport::single(&some, &FilterCriteria::new().with_devices(["rm1"]));
        assert_eq!(
            report.files[0].outcome,
            FileOutcome::Empty(EmptyReason::FilteredOut)
        );
        assert!(report.passed());
    }

    #[test]
    fn test_single_ignores_batch_only_criteria() {
        let some = response(&[("rmpp", "3.22.4.2")], &[], &[]);
        let criteria = FilterCriteria::new().with_files(["nomatch"]).failed_only(true);
        let report = CheckReport::single(&some, &criteria);
        assert_eq!(report.files.len(), 1);
    }

    #[test]
    fn test_batch_hides_dependencies() {
        let mut batch = BatchComparisonResponse::new();
        batch.insert("main.qmd", response(&[("rmpp", "3.22.4.2")], &[], &["lib.qmd"]));
        batch.insert("lib.qmd", response(&[], &[("rmpp", "3.22.4.2")], &[]));
        batch.insert("extra.qmd", response(&[("rm2", "3.22.4.2")], &[], &[]));

        let report = CheckReport::batch(&batch, &FilterCriteria::new());
        let names: Vec<_> = report.files.iter().map(|f| f.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["extra.qmd", "main.qmd"]);
        assert_eq!(report.dependencies, vec!["lib.qmd"]);
        assert!(report.passed());
        assert!(!report.roots_empty);
    }

    #[test]
    fn test_batch_file_filter_and_failed_only() {
        let mut batch = BatchComparisonResponse::new();
        batch.insert("ui/toolbar.qmd", response(&[], &[("rm1", "3.22.4.2")], &[]));
        batch.insert("ui/menu.qmd", response(&[("rm1", "3.22.4.2")], &[], &[]));
        batch.insert("core/boot.qmd", response(&[], &[("rm2", "3.22.4.2")], &[]));

        let criteria = FilterCriteria::new().with_files(["ui/*"]);
        let report = CheckReport::batch(&batch, &criteria);
        assert_eq!(report.files.len(), 2);
        assert!(!report.passed());

        let criteria = FilterCriteria::new().with_files(["ui/*"]).failed_only(true);
        let report = CheckReport::batch(&batch, &criteria);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].name.as_deref(), Some("ui/toolbar.qmd"));
    }

    #[test]
    fn test_batch_failed_only_after_device_filter() {
        let mut batch = BatchComparisonResponse::new();
        batch.insert("a.qmd", response(&[("rmpp", "3.22.4.2")], &[("rm1", "3.22.4.2")], &[]));

        let criteria = FilterCriteria::new().with_devices(["rmpp"]).failed_only(true);
        let report = CheckReport::batch(&batch, &criteria);
        assert!(report.files.is_empty());
        assert!(report.passed());
    }

    #[test]
    fn test_batch_cycle_flags_empty_roots() {
        let mut batch = BatchComparisonResponse::new();
        batch.insert("a.qmd", response(&[], &[("rm1", "3.22.4.2")], &["b.qmd"]));
        batch.insert("b.qmd", response(&[("rm1", "3.22.4.2")], &[], &["a.qmd"]));

        let report = CheckReport::batch(&batch, &FilterCriteria::new());
        assert!(report.files.is_empty());
        assert!(report.roots_empty);
        assert!(report.passed());
    }

    #[test]
    fn test_report_serializes_outcomes() {
        let report = CheckReport::single(&ComparisonResponse::default(), &FilterCriteria::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"][0]["outcome"], "empty");
        assert_eq!(json["files"][0]["detail"], "no_data");
    }
}
