//! SHA-256 integrity verification for downloaded bottles.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Stream `path` through SHA-256 and compare the lowercase hex digest with
/// `expected`.
pub async fn verify_sha256(path: &Path, expected: &str) -> Result<bool> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    let digest = format!("{:x}", hasher.finalize());
    Ok(digest == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn matches_known_digest() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data");
        tokio::fs::write(&path, b"hello world").await.unwrap();

        // sha256("hello world")
        let expected = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        assert!(verify_sha256(&path, expected).await.unwrap());
    }

    #[tokio::test]
    async fn rejects_wrong_digest() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data");
        tokio::fs::write(&path, b"hello world").await.unwrap();

        assert!(!verify_sha256(&path, &"0".repeat(64)).await.unwrap());
    }

    #[tokio::test]
    async fn streams_files_larger_than_one_chunk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("big");
        let data = vec![0xabu8; 100 * 1024];
        tokio::fs::write(&path, &data).await.unwrap();

        let expected = format!("{:x}", Sha256::digest(&data));
        assert!(verify_sha256(&path, &expected).await.unwrap());
    }
}
