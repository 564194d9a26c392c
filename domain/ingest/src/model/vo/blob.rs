use serde::{Deserialize, Serialize};

/// Opaque handle to content in the chunk store.
///
/// The shipped store is content-addressed, so the key is a digest of the
/// blob's bytes, but callers must treat it as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobHandle(String);

impl BlobHandle {
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl From<String> for BlobHandle {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for BlobHandle {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl std::fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
