//! SHA-256 verification
//!
//! The digest check is the only gate between the transport and the source
//! tree: a mismatch is always fatal, whatever caused it.

use super::progress::{self, ProgressGuard};
use crate::core::error::PrepError;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Chunk size for reading files during hashing (1MB)
const CHUNK_SIZE: usize = 1024 * 1024;

/// Threshold for showing progress (100MB)
const PROGRESS_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Compute the lowercase hex SHA-256 of a file.
pub fn sha256_file(file: &Path) -> std::io::Result<String> {
    let mut f = std::fs::File::open(file)?;
    let file_size = f.metadata().map(|m| m.len()).unwrap_or(0);

    let pb = (file_size > PROGRESS_THRESHOLD).then(|| progress::create_byte_progress(file_size));
    let _guard = pb.as_ref().map(ProgressGuard::new);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total_read = 0u64;

    loop {
        let n = f.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        total_read += n as u64;
        if let Some(pb) = &pb {
            pb.set_position(total_read);
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verify a file's SHA-256 against an expected hex digest (case-insensitive).
pub fn verify_sha256(artifact: &str, file: &Path, expected: &str) -> Result<(), PrepError> {
    let actual = sha256_file(file).map_err(|e| PrepError::fs(artifact, "verify", file, e))?;
    let expected = expected.trim().to_ascii_lowercase();

    if actual != expected {
        return Err(PrepError::Integrity {
            artifact: artifact.to_string(),
            expected,
            actual,
        });
    }

    Ok(())
}
