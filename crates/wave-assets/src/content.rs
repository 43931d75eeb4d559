//! Content-addressing helpers: payload hashing and cosmetic random names.

use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};

use crate::{AssetError, AssetResult};

/// Length of the suffix used for generated names
pub const RANDOM_NAME_LENGTH: usize = 6;

/// SHA-256 digest of `data`, used for change detection
pub fn compute_hash(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

/// SHA-256 digest of `len` bytes of `data` starting at `offset`
pub fn compute_hash_range(data: &[u8], offset: usize, len: usize) -> AssetResult<Vec<u8>> {
    let end = offset.checked_add(len).filter(|&end| end <= data.len()).ok_or(
        AssetError::TruncatedData {
            needed: len,
            remaining: data.len().saturating_sub(offset),
        },
    )?;
    Ok(compute_hash(&data[offset..end]))
}

/// Random lowercase alphanumeric string. Collisions are not checked.
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Name for an entity that came without one, e.g. `mesh_k3x9qa`
pub fn random_name(prefix: &str) -> String {
    format!("{prefix}_{}", random_string(RANDOM_NAME_LENGTH))
}

/// Replace characters that are not allowed in file names with `_`
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Sanitize the last component of `path`; the directory is kept as is.
pub fn sanitize_file_name(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(file_name) => path.with_file_name(sanitize_name(&file_name.to_string_lossy())),
        None => path.to_path_buf(),
    }
}
