use serde::{Deserialize, Serialize};

/// Declaration limits enforced when a session is opened. Validated at
/// service start, never mutated at runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UploadLimits {
    /// Largest accepted declared file size in bytes.
    #[serde(default = "UploadLimits::default_max_file_size")]
    pub max_file_size: u64,
    /// Largest accepted declared chunk count.
    #[serde(default = "UploadLimits::default_max_chunk_count")]
    pub max_chunk_count: u64,
    /// Largest accepted single chunk in bytes.
    #[serde(default = "UploadLimits::default_max_chunk_size")]
    pub max_chunk_size: u64,
}

impl UploadLimits {
    fn default_max_file_size() -> u64 {
        4 * 1024 * 1024 * 1024
    }

    fn default_max_chunk_count() -> u64 {
        10_000
    }

    fn default_max_chunk_size() -> u64 {
        64 * 1024 * 1024
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: Self::default_max_file_size(),
            max_chunk_count: Self::default_max_chunk_count(),
            max_chunk_size: Self::default_max_chunk_size(),
        }
    }
}
