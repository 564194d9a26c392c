use std::path::PathBuf;

use anyhow::bail;
use domain_ingest::model::vo::{HashAlgorithm, UploadLimits};
use serde::Deserialize;

/// Deployment configuration, validated once at service start and never
/// mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Sessions idle longer than this are swept to `Expired`.
    #[serde(default = "IngestConfig::default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: u64,
    /// How often the background sweep runs.
    #[serde(default = "IngestConfig::default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Checksum algorithm applied to every session.
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
    #[serde(default)]
    pub limits: UploadLimits,
    /// Base directory of the local chunk store.
    #[serde(default = "IngestConfig::default_cache_base")]
    pub cache_base: PathBuf,
}

impl IngestConfig {
    fn default_session_idle_timeout_secs() -> u64 {
        24 * 60 * 60
    }

    fn default_sweep_interval_secs() -> u64 {
        60
    }

    fn default_cache_base() -> PathBuf {
        "upload_cache".into()
    }

    /// Load from an optional YAML file, with `UPLOAD__`-prefixed environment
    /// variables taking precedence.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        let loaded = builder
            .add_source(config::Environment::with_prefix("UPLOAD").separator("__"))
            .build()?
            .try_deserialize::<Self>()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sweep_interval_secs == 0 {
            bail!("sweep interval must be positive");
        }
        if self.limits.max_file_size == 0
            || self.limits.max_chunk_count == 0
            || self.limits.max_chunk_size == 0
        {
            bail!("upload limits must be positive");
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_idle_timeout_secs as i64)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            session_idle_timeout_secs: Self::default_session_idle_timeout_secs(),
            sweep_interval_secs: Self::default_sweep_interval_secs(),
            hash_algorithm: Default::default(),
            limits: Default::default(),
            cache_base: Self::default_cache_base(),
        }
    }
}
