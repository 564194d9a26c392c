use domain_ingest::model::vo::{ChecksumHasher, HashAlgorithm};

/// Pure, stateless checksum verification. Chunk checks are one-shot;
/// whole-file checks during assembly stream through [`ChecksumHasher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrityVerifier;

impl IntegrityVerifier {
    /// Uppercase-hex digest of `bytes`.
    pub fn digest(&self, algorithm: HashAlgorithm, bytes: &[u8]) -> String {
        algorithm.digest(bytes)
    }

    pub fn verify_chunk(&self, algorithm: HashAlgorithm, bytes: &[u8], declared: &str) -> bool {
        self.digest(algorithm, bytes).eq_ignore_ascii_case(declared)
    }

    pub fn hasher(&self, algorithm: HashAlgorithm) -> ChecksumHasher {
        algorithm.hasher()
    }
}
