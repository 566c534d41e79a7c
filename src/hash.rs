//! BLAKE3 hashing utilities for bundle integrity

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;

use crate::error::{self, Result};

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Content hash and byte size of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub hash: String,
    pub size: u64,
}

/// Calculate the BLAKE3 hash and size of a file
pub fn digest_file(path: &Path) -> Result<FileDigest> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            error::file_not_found(path)
        } else {
            error::file_read_failed(path, e)
        }
    })?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];
    let mut size = 0u64;

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| error::file_read_failed(path, e))?;

        if bytes_read == 0 {
            break;
        }

        size += bytes_read as u64;
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(FileDigest {
        hash: format!("{HASH_PREFIX}{}", hasher.finalize().to_hex()),
        size,
    })
}

/// Calculate the BLAKE3 hash of a file
pub fn hash_file(path: &Path) -> Result<String> {
    digest_file(path).map(|d| d.hash)
}

/// Verify a hash matches the expected value, with or without prefix
pub fn verify_hash(expected: &str, actual: &str) -> bool {
    let strip = |h: &str| h.strip_prefix(HASH_PREFIX).unwrap_or(h).to_string();
    strip(expected) == strip(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_digest_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("ui.bundle");
        std::fs::write(&file_path, "bundle content").unwrap();

        let digest = digest_file(&file_path).unwrap();
        assert!(digest.hash.starts_with(HASH_PREFIX));
        assert_eq!(digest.size, 14);
        assert_eq!(hash_file(&file_path).unwrap(), digest.hash);
    }

    #[test]
    fn test_digest_is_content_addressed() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        std::fs::write(&a, "same").unwrap();
        std::fs::write(&b, "same").unwrap();
        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());

        std::fs::write(&b, "different").unwrap();
        assert_ne!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
    }

    #[test]
    fn test_hash_file_not_found() {
        let result = hash_file(Path::new("/nonexistent/file.bundle"));
        assert!(matches!(
            result,
            Err(crate::error::AddressableError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_verify_hash() {
        let hash1 = format!("{HASH_PREFIX}abc123");
        assert!(verify_hash(&hash1, &hash1.clone()));
        assert!(verify_hash(&hash1, "abc123"));
        assert!(!verify_hash(&hash1, &format!("{HASH_PREFIX}def456")));
    }
}
