//! Multi-file hashing with bounded concurrency
//!
//! Used both to produce manifests (fail on the first unreadable file) and
//! to verify them (collect a per-file outcome for every entry).

use crate::Hash;
use esmc_errors::{Error, StorageError};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Result of hashing a single file
#[derive(Debug, Clone)]
pub struct FileHashResult {
    /// Relative path within the package, `/`-separated
    pub relative_path: String,
    /// SHA-256 of the file contents
    pub hash: Hash,
    /// File size in bytes
    pub size: u64,
}

/// Configuration for file hashing operations
#[derive(Debug, Clone)]
pub struct FileHasherConfig {
    /// Maximum number of concurrent hash operations
    pub max_concurrency: usize,
    /// Deadline for hashing a single file
    pub timeout: Option<Duration>,
}

impl Default for FileHasherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            timeout: None,
        }
    }
}

/// File hasher for processing multiple files
#[derive(Debug, Clone)]
pub struct FileHasher {
    config: FileHasherConfig,
}

impl FileHasher {
    /// Create a new file hasher with the given configuration
    #[must_use]
    pub fn new(config: FileHasherConfig) -> Self {
        Self { config }
    }

    /// Hash a single file below `base_path`
    ///
    /// `relative_path` must stay inside `base_path`; absolute paths and
    /// `..` components are rejected without touching the filesystem.
    ///
    /// # Errors
    /// Returns an error if the path escapes the base, is not a regular file,
    /// cannot be read, or the configured timeout elapses.
    pub async fn hash_relative(
        &self,
        base_path: &Path,
        relative_path: &str,
    ) -> Result<FileHashResult, Error> {
        let full_path = contained_path(base_path, relative_path)?;
        let work = hash_regular_file(&full_path, relative_path);

        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, work).await.map_err(|_| {
                let err = std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("hashing exceeded {}s", limit.as_secs_f64()),
                );
                Error::io_with_path(&err, &full_path)
            })?,
            None => work.await,
        }
    }

    /// Hash every path and return one outcome per path
    ///
    /// All paths are attempted; a failing file does not stop the others.
    /// Outcomes are sorted by relative path.
    ///
    /// # Errors
    /// Returns an error only if the worker pool itself fails.
    pub async fn hash_each<I, S>(
        &self,
        base_path: &Path,
        paths: I,
    ) -> Result<Vec<(String, Result<FileHashResult, Error>)>, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tasks = JoinSet::new();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let base_path = base_path.to_path_buf();

        for path in paths {
            let relative_path: String = path.into();
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| StorageError::IoError {
                    message: format!("semaphore acquire error: {e}"),
                })?;
            let base_path = base_path.clone();
            let hasher = self.clone();

            tasks.spawn(async move {
                let _permit = permit; // Hold permit until task completes
                let outcome = hasher.hash_relative(&base_path, &relative_path).await;
                (relative_path, outcome)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let entry = joined.map_err(|e| StorageError::IoError {
                message: format!("task join error: {e}"),
            })?;
            results.push(entry);
        }

        results.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(results)
    }

    /// Hash files from an iterator of relative paths, failing on the first error
    ///
    /// # Errors
    /// Returns the first per-file error in path order.
    pub async fn hash_files<I, S>(
        &self,
        base_path: &Path,
        paths: I,
    ) -> Result<Vec<FileHashResult>, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hash_each(base_path, paths)
            .await?
            .into_iter()
            .map(|(_, outcome)| outcome)
            .collect()
    }

    /// Hash all regular files below `dir_path`
    ///
    /// Top-level entries named in `exclude` are skipped entirely.
    ///
    /// # Errors
    /// Returns an error if directory traversal fails or any file cannot be hashed
    pub async fn hash_directory(
        &self,
        dir_path: &Path,
        exclude: &[&str],
    ) -> Result<Vec<FileHashResult>, Error> {
        let mut relative_paths = Vec::new();
        collect_files_for_hashing(dir_path, dir_path, exclude, &mut relative_paths).await?;
        self.hash_files(dir_path, relative_paths).await
    }
}

async fn hash_regular_file(full_path: &Path, relative_path: &str) -> Result<FileHashResult, Error> {
    let metadata = tokio::fs::metadata(full_path)
        .await
        .map_err(|e| StorageError::from_io_with_path(&e, full_path))?;
    if !metadata.is_file() {
        return Err(StorageError::InvalidPath {
            path: full_path.display().to_string(),
        }
        .into());
    }
    let hash = Hash::hash_file(full_path).await?;
    Ok(FileHashResult {
        relative_path: relative_path.to_string(),
        hash,
        size: metadata.len(),
    })
}

/// Join `relative` onto `base`, refusing anything that would leave `base`
fn contained_path(base: &Path, relative: &str) -> Result<PathBuf, Error> {
    let candidate = Path::new(relative);
    let escapes = relative.is_empty()
        || candidate
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(StorageError::InvalidPath {
            path: relative.to_string(),
        }
        .into());
    }
    Ok(base.join(candidate))
}

/// Helper function to collect files for hashing
async fn collect_files_for_hashing(
    base_path: &Path,
    current_path: &Path,
    exclude: &[&str],
    out: &mut Vec<String>,
) -> Result<(), Error> {
    let mut entries = tokio::fs::read_dir(current_path)
        .await
        .map_err(|e| Error::io_with_path(&e, current_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if current_path == base_path
            && exclude
                .iter()
                .any(|name| entry.file_name() == std::ffi::OsStr::new(name))
        {
            continue;
        }

        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            Box::pin(collect_files_for_hashing(base_path, &path, exclude, out)).await?;
        } else if file_type.is_file()
            || (file_type.is_symlink() && tokio::fs::metadata(&path).await?.is_file())
        {
            out.push(relative_key(base_path, &path)?);
        }
    }

    Ok(())
}

/// Manifest key for `path`: relative to `base`, `/`-separated
fn relative_key(base: &Path, path: &Path) -> Result<String, Error> {
    let relative = path
        .strip_prefix(base)
        .map_err(|_| StorageError::IoError {
            message: format!("failed to compute relative path for {}", path.display()),
        })?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    #[tokio::test]
    async fn test_hash_single_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("test.txt"), b"Hello, world!")
            .await
            .unwrap();

        let hasher = FileHasher::new(FileHasherConfig::default());
        let result = hasher
            .hash_relative(temp_dir.path(), "test.txt")
            .await
            .unwrap();

        assert_eq!(result.relative_path, "test.txt");
        assert_eq!(result.size, 13);
        assert_eq!(result.hash, Hash::from_data(b"Hello, world!"));
    }

    #[tokio::test]
    async fn test_escaping_paths_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let hasher = FileHasher::new(FileHasherConfig::default());

        for bad in ["../etc/passwd", "/etc/passwd", "a/../../b", ""] {
            let result = hasher.hash_relative(temp_dir.path(), bad).await;
            assert!(
                matches!(result, Err(Error::Storage(StorageError::InvalidPath { .. }))),
                "{bad} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_directory_is_not_a_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("lib")).await.unwrap();

        let hasher = FileHasher::new(FileHasherConfig::default());
        assert!(hasher.hash_relative(temp_dir.path(), "lib").await.is_err());
    }

    #[tokio::test]
    async fn test_hash_each_gathers_all_outcomes() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.txt"), b"b").await.unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"a").await.unwrap();

        let hasher = FileHasher::new(FileHasherConfig {
            max_concurrency: 1,
            timeout: Some(Duration::from_secs(5)),
        });
        let results = hasher
            .hash_each(temp_dir.path(), ["b.txt", "missing.txt", "a.txt"])
            .await
            .unwrap();

        let names: Vec<_> = results.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "missing.txt"]);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_ok());
        assert!(results[2].1.is_err());
    }

    #[tokio::test]
    async fn test_elapsed_deadline_times_out() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("big.bin"), vec![7u8; 1024 * 1024])
            .await
            .unwrap();

        let hasher = FileHasher::new(FileHasherConfig {
            max_concurrency: 1,
            timeout: Some(Duration::ZERO),
        });
        let err = hasher
            .hash_relative(temp_dir.path(), "big.bin")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::TimedOut,
                ..
            }
        ));
        assert!(err.to_string().contains("hashing exceeded"));
    }

    #[tokio::test]
    async fn test_hash_directory_skips_excluded() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("subdir"))
            .await
            .unwrap();
        fs::create_dir_all(temp_dir.path().join(".esmc"))
            .await
            .unwrap();
        fs::write(temp_dir.path().join("file1.txt"), b"content1")
            .await
            .unwrap();
        fs::write(temp_dir.path().join("subdir/file2.txt"), b"content2")
            .await
            .unwrap();
        fs::write(temp_dir.path().join(".esmc/state.json"), b"{}")
            .await
            .unwrap();

        let hasher = FileHasher::new(FileHasherConfig::default());
        let results = hasher
            .hash_directory(temp_dir.path(), &[".esmc"])
            .await
            .unwrap();

        let names: Vec<_> = results.iter().map(|r| r.relative_path.as_str()).collect();
        assert_eq!(names, ["file1.txt", "subdir/file2.txt"]);
    }
}
