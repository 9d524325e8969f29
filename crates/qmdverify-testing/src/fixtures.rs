//! Wire-format JSON builders for scripting the stub server.
//!
//! Builders return `serde_json::Value` so tests can nest them; the
//! `job_*` helpers return finished bodies ready for `StubReply`.

use serde_json::{Value, json};

/// One per-hashtable comparison row.
pub fn result(os_version: &str, device: &str, compatible: bool) -> Value {
    json!({
        "hashtable": format!("{}-{}", os_version, device),
        "os_version": os_version,
        "device": device,
        "compatible": compatible,
        "validation_mode": "hash",
    })
}

/// Incompatible row carrying an error detail.
pub fn failure(os_version: &str, device: &str, detail: &str) -> Value {
    let mut row = result(os_version, device, false);
    row["error_detail"] = json!(detail);
    row
}

/// Row that reports the files it imported.
pub fn with_dependencies(mut row: Value, dependencies: &[&str]) -> Value {
    let map: serde_json::Map<String, Value> = dependencies
        .iter()
        .map(|dep| (dep.to_string(), json!({"status": "ok"})))
        .collect();
    row["dependency_results"] = Value::Object(map);
    row
}

pub fn comparison(compatible: Vec<Value>, incompatible: Vec<Value>) -> Value {
    let total = compatible.len() + incompatible.len();
    json!({
        "compatible": compatible,
        "incompatible": incompatible,
        "total_checked": total,
        "mode": "hash",
    })
}

pub fn batch<'a>(files: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
    Value::Object(
        files
            .into_iter()
            .map(|(name, response)| (name.to_string(), response))
            .collect(),
    )
}

pub fn job_submitted(job_id: &str) -> String {
    json!({ "jobId": job_id }).to_string()
}

pub fn job_running() -> String {
    json!({ "status": "running" }).to_string()
}

pub fn job_success(results: Value) -> String {
    json!({ "status": "success", "results": results }).to_string()
}

pub fn job_error(message: &str) -> String {
    json!({ "status": "error", "error": message }).to_string()
}

pub fn hashtables(entries: &[(&str, &str, u64)]) -> String {
    let hashtables: Vec<Value> = entries
        .iter()
        .map(|(version, device, count)| {
            json!({
                "name": format!("{}-{}", version, device),
                "os_version": version,
                "device": device,
                "entry_count": count,
            })
        })
        .collect();
    json!({ "count": hashtables.len(), "hashtables": hashtables }).to_string()
}

pub fn trees(entries: &[(&str, &str, u64)]) -> String {
    let trees: Vec<Value> = entries
        .iter()
        .map(|(version, device, count)| {
            json!({
                "version": version,
                "device": device,
                "qml_count": count,
                "path": format!("/trees/{}/{}", version, device),
                "directory": format!("{}-{}", version, device),
            })
        })
        .collect();
    json!({ "count": trees.len(), "trees": trees }).to_string()
}

pub fn server_version(version: &str) -> String {
    json!({ "version": version, "commit": "abc1234", "build_time": "2024-06-01T12:00:00Z" })
        .to_string()
}

/// Minimal QMD patch text; the server never sees it parsed in tests.
pub fn sample_qmd(name: &str) -> String {
    format!(
        "AFFECT /qml/{name}.qml\n  TRAVERSE Item\n    REPLACE visible: true WITH visible: false\n  END TRAVERSE\nEND AFFECT\n"
    )
}
