use serde::{Deserialize, Serialize};
use sha2::Digest;

/// Checksum algorithm of a session.
///
/// Blake3 is the fast default; Sha256 is available for deployments that
/// require a conventional cryptographic digest. Whichever is chosen is
/// applied consistently to every chunk and to the assembled whole.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

impl HashAlgorithm {
    pub fn hasher(&self) -> ChecksumHasher {
        match self {
            Self::Blake3 => ChecksumHasher::Blake3(Box::new(blake3::Hasher::new())),
            Self::Sha256 => ChecksumHasher::Sha256(sha2::Sha256::new()),
        }
    }

    /// One-shot digest, uppercase hex.
    pub fn digest(&self, bytes: &[u8]) -> String {
        let mut hasher = self.hasher();
        hasher.update(bytes);
        hasher.finalize()
    }
}

/// Streaming digest used during assembly, where chunks are fed in index
/// order without holding the whole artifact for a second pass.
pub enum ChecksumHasher {
    Blake3(Box<blake3::Hasher>),
    Sha256(sha2::Sha256),
}

impl ChecksumHasher {
    pub fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Blake3(h) => {
                h.update(bytes);
            }
            Self::Sha256(h) => h.update(bytes),
        }
    }

    /// Finish the digest, uppercase hex.
    pub fn finalize(self) -> String {
        match self {
            Self::Blake3(h) => h.finalize().to_hex().to_string().to_uppercase(),
            Self::Sha256(h) => {
                let digest = h.finalize();
                let mut hex = String::with_capacity(digest.len() * 2);
                for byte in digest {
                    hex.push_str(&format!("{byte:02X}"));
                }
                hex
            }
        }
    }
}
