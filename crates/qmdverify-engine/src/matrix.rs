use crate::version::sort_versions_desc;
use qmdverify_types::{ComparisonResponse, canonical_rank};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// One populated grid cell. Absent cells are simply missing from the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Cell {
    Compatible,
    Incompatible { detail: Option<String> },
}

impl Cell {
    pub fn is_compatible(&self) -> bool {
        matches!(self, Cell::Compatible)
    }
}

/// Version x device view of one file's results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityMatrix {
    rows: HashMap<String, HashMap<String, Cell>>,
}

impl CompatibilityMatrix {
    /// Incompatible results are placed after compatible ones and win when
    /// both exist for the same cell.
    pub fn build(response: &ComparisonResponse) -> Self {
        let mut rows: HashMap<String, HashMap<String, Cell>> = HashMap::new();

        for result in &response.compatible {
            rows.entry(result.os_version.clone())
                .or_default()
                .insert(result.device.clone(), Cell::Compatible);
        }

        for result in &response.incompatible {
            let detail = result.error_detail.clone().filter(|d| !d.is_empty());
            rows.entry(result.os_version.clone())
                .or_default()
                .insert(result.device.clone(), Cell::Incompatible { detail });
        }

        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, version: &str, device: &str) -> Option<&Cell> {
        self.rows.get(version).and_then(|row| row.get(device))
    }

    /// Row keys, newest version first.
    pub fn versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.rows.keys().cloned().collect();
        sort_versions_desc(&mut versions);
        versions
    }

    /// Column keys in canonical device order.
    pub fn devices(&self) -> Vec<String> {
        let seen: BTreeSet<&str> = self
            .rows
            .values()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();
        device_order(seen)
    }

    /// Incompatible cells with a detail message, in display order.
    pub fn error_details(&self) -> Vec<(String, String, String)> {
        let devices = self.devices();
        let mut details = Vec::new();

        for version in self.versions() {
            for device in &devices {
                if let Some(Cell::Incompatible {
                    detail: Some(detail),
                }) = self.cell(&version, device)
                {
                    details.push((version.clone(), device.clone(), detail.clone()));
                }
            }
        }

        details
    }
}

/// Known devices in canonical priority, then everything else lexically.
pub fn device_order<'a, I>(devices: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut devices: Vec<String> = devices
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    devices.sort_by(|a, b| match (canonical_rank(a), canonical_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    });

    devices
}
