use crate::nullable::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A single hash that failed validation inside a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashError {
    pub hash_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub error: String,
}

/// Validation outcome of one dependency file, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub hash_errors: Vec<HashError>,
}

/// One (device, OS version) verdict for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonResult {
    #[serde(deserialize_with = "null_as_default")]
    pub hashtable: String,
    #[serde(deserialize_with = "null_as_default")]
    pub os_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub device: String,
    pub compatible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub validation_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_processed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_modified: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_with_errors: Option<u32>,
    pub tree_validation_used: bool,
    /// Keyed by dependency filename. A `null` value means the server listed
    /// the dependency without an outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_results: Option<BTreeMap<String, Option<ValidationResult>>>,
}

impl ComparisonResult {
    /// Filenames this result declares as dependencies.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependency_results
            .iter()
            .flat_map(|deps| deps.keys().map(String::as_str))
    }
}

/// Per-file comparison result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub compatible: Vec<ComparisonResult>,
    #[serde(deserialize_with = "null_as_default")]
    pub incompatible: Vec<ComparisonResult>,
    pub total_checked: usize,
    #[serde(deserialize_with = "null_as_default")]
    pub mode: String,
}

impl ComparisonResponse {
    /// True when the response carries actual comparison data rather than
    /// the zero value of an unrelated JSON object.
    pub fn has_data(&self) -> bool {
        self.total_checked > 0 || !self.compatible.is_empty() || !self.incompatible.is_empty()
    }

    /// Every result, compatible ones first.
    pub fn results(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.compatible.iter().chain(self.incompatible.iter())
    }

    pub fn is_passing(&self) -> bool {
        self.incompatible.is_empty()
    }
}

/// Results of a multi-file job keyed by the relative path supplied at upload.
///
/// Map order carries no meaning; use [`BatchComparisonResponse::sorted`] for
/// display order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchComparisonResponse(HashMap<String, ComparisonResponse>);

impl BatchComparisonResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, response: ComparisonResponse) {
        self.0.insert(filename.into(), response);
    }

    pub fn get(&self, filename: &str) -> Option<&ComparisonResponse> {
        self.0.get(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.0.contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComparisonResponse)> {
        self.0.iter().map(|(name, response)| (name.as_str(), response))
    }

    /// Entries in lexical filename order.
    pub fn sorted(&self) -> Vec<(&str, &ComparisonResponse)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl FromIterator<(String, ComparisonResponse)> for BatchComparisonResponse {
    fn from_iter<I: IntoIterator<Item = (String, ComparisonResponse)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
