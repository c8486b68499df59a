//! Streaming file hasher with a selectable digest algorithm.
//!
//! Files are read in fixed-size blocks and fed into the digest incrementally,
//! so peak memory stays at one block regardless of file size. The default
//! algorithm is MD5: duplicate detection only needs collision probabilities
//! acceptable for deduplication, not cryptographic strength. SHA-1, SHA-256
//! and BLAKE3 are available for callers that want stronger digests.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::Sha256;

use super::HashError;

/// Read block size for streaming hashing: 64 KiB.
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Digest algorithm used for content hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// MD5: fast, collision-probability fine for dedup. The default.
    Md5,
    /// SHA-1
    Sha1,
    /// SHA-256
    Sha256,
    /// BLAKE3: cryptographic and still fast.
    Blake3,
}

impl Default for DigestAlgorithm {
    fn default() -> Self {
        Self::Md5
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Sha1 => write!(f, "sha1"),
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Streaming content hasher.
///
/// # Example
///
/// ```no_run
/// use dupescan::scanner::{DigestAlgorithm, Hasher};
/// use std::path::Path;
///
/// let hasher = Hasher::new(DigestAlgorithm::Md5);
/// let digest = hasher.hash_file(Path::new("/some/file")).unwrap();
/// println!("{digest}");
/// ```
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithm: DigestAlgorithm,
    block_size: usize,
}

impl Hasher {
    /// Create a hasher for the given algorithm with the default block size.
    #[must_use]
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self {
            algorithm,
            block_size: BLOCK_SIZE,
        }
    }

    /// Override the read block size (clamped to at least 1 byte).
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Hash the full content of the file at `path`.
    ///
    /// Returns the lowercase hex digest, or a [`HashError`] classifying the
    /// read failure. The file is streamed block by block until EOF.
    ///
    /// # Errors
    ///
    /// `HashError::NotFound` / `HashError::PermissionDenied` / `HashError::Io`
    /// depending on the underlying failure.
    pub fn hash_file(&self, path: &Path) -> Result<String, HashError> {
        let mut file =
            File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;

        let bytes = match self.algorithm {
            DigestAlgorithm::Md5 => self.stream_digest::<Md5>(&mut file),
            DigestAlgorithm::Sha1 => self.stream_digest::<Sha1>(&mut file),
            DigestAlgorithm::Sha256 => self.stream_digest::<Sha256>(&mut file),
            DigestAlgorithm::Blake3 => self.stream_blake3(&mut file),
        }
        .map_err(|e| HashError::from_io(path.to_path_buf(), e))?;

        Ok(to_hex(&bytes))
    }

    /// Stream a file through any RustCrypto digest.
    fn stream_digest<D: Digest>(&self, file: &mut File) -> std::io::Result<Vec<u8>> {
        let mut hasher = D::new();
        let mut block = vec![0u8; self.block_size];
        loop {
            let n = file.read(&mut block)?;
            if n == 0 {
                break;
            }
            hasher.update(&block[..n]);
        }
        Ok(hasher.finalize().to_vec())
    }

    /// BLAKE3 has its own hasher type outside the Digest trait.
    fn stream_blake3(&self, file: &mut File) -> std::io::Result<Vec<u8>> {
        let mut hasher = blake3::Hasher::new();
        let mut block = vec![0u8; self.block_size];
        loop {
            let n = file.read(&mut block)?;
            if n == 0 {
                break;
            }
            hasher.update(&block[..n]);
        }
        Ok(hasher.finalize().as_bytes().to_vec())
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new(DigestAlgorithm::default())
    }
}

/// Encode digest bytes as a lowercase hex string.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        },
    )
}
