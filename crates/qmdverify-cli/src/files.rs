//! Turning command-line paths into the set of QMD files to upload.

use anyhow::{Context, Result, bail};
use qmdverify_client::QmdFile;
use qmdverify_types::{CANONICAL_DEVICES, is_known_device};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Files selected for upload plus the directory-walk files that were
/// skipped for being empty.
#[derive(Debug, Default)]
pub struct Collected {
    pub files: Vec<QmdFile>,
    pub skipped_empty: Vec<PathBuf>,
}

pub fn validate_device_filters(devices: &[String]) -> Result<()> {
    if let Some(device) = devices.iter().find(|d| !is_known_device(d)) {
        bail!(
            "invalid device '{}'. Valid devices: {}",
            device,
            CANONICAL_DEVICES.join(", ")
        );
    }
    Ok(())
}

pub fn has_qmd_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("qmd"))
}

/// Checks for a file named explicitly on the command line.
pub fn validate_qmd_file(path: &Path) -> Result<()> {
    if !has_qmd_extension(path) {
        bail!("file must have .qmd extension: {}", path.display());
    }

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            bail!("file does not exist: {}", path.display())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to access file {}", path.display()));
        }
    };

    if metadata.is_dir() {
        bail!("path is a directory, not a file: {}", path.display());
    }
    if metadata.len() == 0 {
        bail!("file is empty: {}", path.display());
    }
    Ok(())
}

/// The first directory argument, else the parent of the first argument.
pub fn determine_base_dir(args: &[PathBuf]) -> Result<PathBuf> {
    if let Some(dir) = args.iter().find(|arg| arg.is_dir()) {
        return absolute(dir);
    }

    match args.first() {
        Some(first) => Ok(absolute(first)?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()),
        None => std::env::current_dir().context("failed to read current directory"),
    }
}

/// Expand files and directories into QMD files with base-relative names.
pub fn collect_qmd_files(args: &[PathBuf]) -> Result<Collected> {
    let base_dir = determine_base_dir(args)?;
    let mut collected = Collected::default();

    for arg in args {
        if arg.is_dir() {
            for entry in WalkDir::new(arg).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("failed to walk directory {}", arg.display()))?;
                if !entry.file_type().is_file() || !has_qmd_extension(entry.path()) {
                    continue;
                }

                let size = entry
                    .metadata()
                    .with_context(|| format!("failed to access {}", entry.path().display()))?
                    .len();
                if size == 0 {
                    tracing::debug!(path = %entry.path().display(), "skipping empty file");
                    collected.skipped_empty.push(entry.path().to_path_buf());
                    continue;
                }

                let path = absolute(entry.path())?;
                let relative = relative_name(&path, &base_dir);
                collected.files.push(QmdFile::new(path, relative));
            }
        } else {
            validate_qmd_file(arg)?;
            let path = absolute(arg)?;
            let relative = relative_name(&path, &base_dir);
            collected.files.push(QmdFile::new(path, relative));
        }
    }

    ensure_unique_names(&collected.files)?;

    tracing::debug!(
        files = collected.files.len(),
        base = %base_dir.display(),
        "collected QMD files"
    );
    Ok(collected)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("failed to resolve {}", path.display()))
}

/// Path of `path` relative to `base` with `/` separators, stepping out of
/// `base` with `..` where needed. Both paths are compared lexically.
fn relative_name(path: &Path, base: &Path) -> String {
    let (path_prefix, path_parts) = lexical_parts(path);
    let (base_prefix, base_parts) = lexical_parts(base);
    if path_prefix != base_prefix {
        return path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
    }

    let shared = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    std::iter::repeat_n("..".to_string(), base_parts.len() - shared)
        .chain(path_parts[shared..].iter().cloned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Drive prefix plus normal components, with `.` dropped and `..` folded.
fn lexical_parts(path: &Path) -> (Option<String>, Vec<String>) {
    let mut prefix = None;
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => prefix = Some(p.as_os_str().to_string_lossy().to_string()),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                parts.pop();
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
        }
    }
    (prefix, parts)
}

/// Batch results come back keyed by upload path, so two files must never
/// share one.
fn ensure_unique_names(files: &[QmdFile]) -> Result<()> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for file in files {
        let Some(name) = file.relative_path.as_deref() else {
            continue;
        };
        if let Some(previous) = seen.insert(name, &file.path) {
            bail!(
                "duplicate upload path '{}': {} and {}",
                name,
                previous.display(),
                file.path.display()
            );
        }
    }
    Ok(())
}
