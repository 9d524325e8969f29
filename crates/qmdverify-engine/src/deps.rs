use qmdverify_types::BatchComparisonResponse;
use std::collections::{BTreeMap, BTreeSet};

/// Dependency edges declared inside a batch job's results.
///
/// Built in one pass over every result of every file. There is no cycle
/// detection: files that name each other as dependencies are all non-roots,
/// so a cycle can leave the root set empty.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    files: BTreeSet<String>,
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn from_batch(batch: &BatchComparisonResponse) -> Self {
        let mut graph = DependencyGraph::default();

        for (filename, response) in batch.iter() {
            graph.files.insert(filename.to_string());

            let deps: BTreeSet<String> = response
                .results()
                .flat_map(|result| result.dependency_names())
                .filter(|dep| *dep != filename)
                .map(str::to_string)
                .collect();

            if !deps.is_empty() {
                graph.edges.insert(filename.to_string(), deps);
            }
        }

        graph
    }

    /// Files the given file declares as dependencies.
    pub fn dependencies_of(&self, filename: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(filename)
            .into_iter()
            .flat_map(|deps| deps.iter().map(String::as_str))
    }

    /// Every filename some other file depends on, whether or not it was
    /// part of the upload.
    pub fn dependency_targets(&self) -> BTreeSet<&str> {
        self.edges
            .values()
            .flat_map(|deps| deps.iter().map(String::as_str))
            .collect()
    }

    pub fn is_dependency(&self, filename: &str) -> bool {
        self.edges.values().any(|deps| deps.contains(filename))
    }

    /// Uploaded files nothing else depends on.
    pub fn roots(&self) -> BTreeSet<String> {
        let targets = self.dependency_targets();
        self.files
            .iter()
            .filter(|file| !targets.contains(file.as_str()))
            .cloned()
            .collect()
    }

    /// Uploaded files that are somebody's dependency.
    pub fn non_roots(&self) -> BTreeSet<String> {
        let targets = self.dependency_targets();
        self.files
            .iter()
            .filter(|file| targets.contains(file.as_str()))
            .cloned()
            .collect()
    }
}

/// Filenames in the batch that no other file in the batch depends on.
pub fn identify_roots(batch: &BatchComparisonResponse) -> BTreeSet<String> {
    let roots = DependencyGraph::from_batch(batch).roots();
    tracing::debug!(files = batch.len(), roots = roots.len(), "resolved batch roots");
    roots
}
