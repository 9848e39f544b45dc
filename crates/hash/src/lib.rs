#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! SHA-256 content hashing for esmc
//!
//! This crate provides the digest type used by integrity manifests and
//! streaming helpers to hash files without loading them whole.

mod file_hasher;

pub use file_hasher::{FileHashResult, FileHasher, FileHasherConfig};

use esmc_errors::{Error, StorageError};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// A SHA-256 hash value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash {
    bytes: [u8; 32],
}

impl Hash {
    /// Create a hash from raw bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Convert to lowercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Compute hash of a byte slice
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        Self::from_bytes(Sha256::digest(data).into())
    }

    /// Compute hash of a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, read, or if any I/O operation fails.
    pub async fn hash_file(path: &Path) -> Result<Self, Error> {
        let mut file = File::open(path)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, path))?;

        let mut hasher = Sha256::new();
        let mut buffer = vec![0; CHUNK_SIZE];

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .map_err(|e| Error::io_with_path(&e, path))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(Self::from_bytes(hasher.finalize().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_hash_basics() {
        let hash = Hash::from_data(b"hello world");

        // Known SHA-256 of "hello world"
        let expected = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        assert_eq!(hash.to_hex(), expected);
    }

    #[tokio::test]
    async fn test_hash_file() {
        use std::io::Write;
        let mut temp = NamedTempFile::new().unwrap();
        let data = b"test file content";
        temp.write_all(data).unwrap();

        let hash = Hash::hash_file(temp.path()).await.unwrap();
        assert_eq!(hash, Hash::from_data(data));
    }

    #[tokio::test]
    async fn test_hash_file_larger_than_chunk() {
        use std::io::Write;
        let mut temp = NamedTempFile::new().unwrap();
        let data = vec![0xA5u8; CHUNK_SIZE * 2 + 17];
        temp.write_all(&data).unwrap();

        let hash = Hash::hash_file(temp.path()).await.unwrap();
        assert_eq!(hash, Hash::from_data(&data));
    }

    #[tokio::test]
    async fn test_missing_file_is_path_not_found() {
        let result = Hash::hash_file(Path::new("/nonexistent/esmc/file")).await;
        assert!(matches!(
            result,
            Err(Error::Storage(StorageError::PathNotFound { .. }))
        ));
    }
}
