use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A local QMD file selected for a batch upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QmdFile {
    pub path: PathBuf,
    /// Path relative to the upload base directory. The server keys batch
    /// results and dependency edges by this value.
    pub relative_path: Option<String>,
}

impl QmdFile {
    pub fn new(path: impl Into<PathBuf>, relative_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            relative_path: Some(relative_path.into()),
        }
    }

    pub fn without_relative(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            relative_path: None,
        }
    }
}

/// One file part of a multipart upload, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    /// Value of the `paths` field accompanying this file in a batch.
    pub path_field: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    /// Read a file fully into memory.
    pub fn read(path: &Path, relative_path: Option<&str>) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Error::input(path, "file does not exist")
            } else {
                Error::Io {
                    path: path.to_path_buf(),
                    source: err,
                }
            }
        })?;

        if metadata.is_dir() {
            return Err(Error::input(path, "path is a directory, not a file"));
        }

        let content = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = base_name(path);
        let path_field = relative_path
            .filter(|rel| !rel.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| file_name.clone());

        Ok(Self {
            file_name,
            path_field,
            content,
        })
    }
}

/// Body of a `POST /api/compare` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upload {
    /// Sent as a single `file` part.
    Single(UploadFile),
    /// Sent as `files` parts, each followed by its `paths` field.
    Batch(Vec<UploadFile>),
}

impl Upload {
    pub fn single(path: &Path) -> Result<Self> {
        Ok(Upload::Single(UploadFile::read(path, None)?))
    }

    /// Read every file before anything is sent; the first failure aborts the
    /// whole upload.
    pub fn batch(files: &[QmdFile]) -> Result<Self> {
        let parts = files
            .iter()
            .map(|file| UploadFile::read(&file.path, file.relative_path.as_deref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Upload::Batch(parts))
    }

    pub fn files(&self) -> &[UploadFile] {
        match self {
            Upload::Single(file) => std::slice::from_ref(file),
            Upload::Batch(files) => files,
        }
    }

    pub fn total_bytes(&self) -> usize {
        self.files().iter().map(|f| f.content.len()).sum()
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_single_reads_content() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("test.qmd");
        fs::write(&path, b"test content")?;

        let upload = Upload::single(&path)?;
        let file = &upload.files()[0];
        assert_eq!(file.file_name, "test.qmd");
        assert_eq!(file.path_field, "test.qmd");
        assert_eq!(file.content, b"test content");
        Ok(())
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let err = Upload::single(Path::new("/nonexistent/file.qmd")).unwrap_err();
        assert!(matches!(err, Error::Input { .. }));
    }

    #[test]
    fn test_directory_is_input_error() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let err = Upload::single(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Input { .. }));
        Ok(())
    }

    #[test]
    fn test_batch_keeps_relative_paths() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join("ui"))?;
        fs::write(dir.path().join("ui/toolbar.qmd"), b"a")?;
        fs::write(dir.path().join("main.qmd"), b"bb")?;

        let upload = Upload::batch(&[
            QmdFile::new(dir.path().join("ui/toolbar.qmd"), "ui/toolbar.qmd"),
            QmdFile::without_relative(dir.path().join("main.qmd")),
        ])?;

        let fields: Vec<_> = upload.files().iter().map(|f| f.path_field.as_str()).collect();
        assert_eq!(fields, vec!["ui/toolbar.qmd", "main.qmd"]);
        assert_eq!(upload.total_bytes(), 3);
        Ok(())
    }

    #[test]
    fn test_batch_aborts_on_first_missing_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("ok.qmd"), b"a")?;

        let result = Upload::batch(&[
            QmdFile::new(dir.path().join("ok.qmd"), "ok.qmd"),
            QmdFile::new(dir.path().join("gone.qmd"), "gone.qmd"),
        ]);
        assert!(matches!(result, Err(Error::Input { .. })));
        Ok(())
    }
}
