//! Encoder configuration and YAML loading.
//!
//! [`EncoderConfig`] extends the per-string [`MinHashConfig`] with the batch
//! concerns: missing-value policy, worker count, batching and cache size.
//! It can be built in code with the `with_*` builders or loaded from YAML.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! n_components: 30
//! ngram_range: [2, 4]
//! hashing: fast          # fast | murmur
//! minmax_hash: false
//! handle_missing: zero_impute   # error | zero_impute
//! n_jobs: all            # positive integer, -1 or "all"
//! batch: true
//! batch_per_job: 2
//! cache_capacity: 1024
//! ```

use std::fmt;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;

use minhash::{HashingBackend, MinHashConfig, NgramRange};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::EncoderError;

/// Default number of cached encodings per encoder.
pub const DEFAULT_CACHE_CAPACITY: usize = 1 << 10;

/// What to do with missing cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Fail the whole transform.
    Error,
    /// Encode missing cells as all-zero vectors.
    #[default]
    ZeroImpute,
}

impl MissingPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::ZeroImpute => "zero_impute",
        }
    }
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingPolicy {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "zero_impute" => Ok(Self::ZeroImpute),
            other => Err(EncoderError::UnknownMissingPolicy {
                value: other.to_string(),
            }),
        }
    }
}

/// Number of parallel workers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "RawJobs", into = "RawJobs")]
pub enum NJobs {
    /// One worker per available CPU.
    All,
    Fixed(NonZeroUsize),
}

impl NJobs {
    pub const fn sequential() -> Self {
        Self::Fixed(NonZeroUsize::MIN)
    }

    /// Build from a worker count; `0` is rejected.
    pub fn fixed(n: usize) -> Result<Self, EncoderError> {
        NonZeroUsize::new(n)
            .map(Self::Fixed)
            .ok_or(EncoderError::InvalidJobs {
                value: n.to_string(),
            })
    }

    /// Concrete worker count on this machine.
    pub fn resolve(self) -> usize {
        match self {
            Self::All => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            Self::Fixed(n) => n.get(),
        }
    }
}

impl Default for NJobs {
    fn default() -> Self {
        Self::sequential()
    }
}

impl fmt::Display for NJobs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Fixed(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for NJobs {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "-1" => Ok(Self::All),
            other => other
                .parse::<usize>()
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Self::Fixed)
                .ok_or_else(|| EncoderError::InvalidJobs {
                    value: other.to_string(),
                }),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawJobs {
    Count(i64),
    Keyword(String),
}

impl TryFrom<RawJobs> for NJobs {
    type Error = EncoderError;

    fn try_from(raw: RawJobs) -> Result<Self, Self::Error> {
        match raw {
            RawJobs::Count(-1) => Ok(Self::All),
            RawJobs::Count(n) => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Self::Fixed)
                .ok_or(EncoderError::InvalidJobs {
                    value: n.to_string(),
                }),
            RawJobs::Keyword(s) => s.parse(),
        }
    }
}

impl From<NJobs> for RawJobs {
    fn from(jobs: NJobs) -> Self {
        match jobs {
            NJobs::All => RawJobs::Keyword("all".to_string()),
            NJobs::Fixed(n) => RawJobs::Count(i64::try_from(n.get()).unwrap_or(i64::MAX)),
        }
    }
}

/// Full configuration of a [`crate::MinHashEncoder`].
///
/// Immutable once handed to the encoder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EncoderConfig {
    /// Per-string encoding parameters.
    #[serde(flatten)]
    pub minhash: MinHashConfig,
    pub handle_missing: MissingPolicy,
    pub n_jobs: NJobs,
    /// Group cache-miss values into `n_jobs * batch_per_job` slices per
    /// column instead of dispatching one task per value.
    pub batch: bool,
    pub batch_per_job: usize,
    /// Maximum number of encodings kept by the LRU cache.
    pub cache_capacity: usize,
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_components(mut self, n_components: usize) -> Self {
        self.minhash.n_components = n_components;
        self
    }

    pub fn with_ngram_range(mut self, low: usize, high: usize) -> Self {
        self.minhash.ngram_range = NgramRange::new(low, high);
        self
    }

    pub fn with_hashing(mut self, hashing: HashingBackend) -> Self {
        self.minhash.hashing = hashing;
        self
    }

    pub fn with_minmax_hash(mut self, minmax_hash: bool) -> Self {
        self.minhash.minmax_hash = minmax_hash;
        self
    }

    pub fn with_handle_missing(mut self, handle_missing: MissingPolicy) -> Self {
        self.handle_missing = handle_missing;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: NJobs) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_batch_per_job(mut self, batch_per_job: usize) -> Self {
        self.batch_per_job = batch_per_job;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn n_components(&self) -> usize {
        self.minhash.n_components
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), EncoderError> {
        self.minhash.validate()?;
        if self.batch_per_job < 1 {
            return Err(EncoderError::InvalidBatchPerJob {
                batch_per_job: self.batch_per_job,
            });
        }
        if self.cache_capacity < 1 {
            return Err(EncoderError::InvalidCacheCapacity {
                capacity: self.cache_capacity,
            });
        }
        Ok(())
    }

    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: EncoderConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            minhash: MinHashConfig::default(),
            handle_missing: MissingPolicy::ZeroImpute,
            n_jobs: NJobs::sequential(),
            batch: true,
            batch_per_job: 1,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl From<MinHashConfig> for EncoderConfig {
    fn from(minhash: MinHashConfig) -> Self {
        Self {
            minhash,
            ..Default::default()
        }
    }
}

/// Errors that can occur when loading YAML configuration files.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(#[from] EncoderError),
}
