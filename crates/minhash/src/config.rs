//! Configuration and error types for the MinHash core.
//!
//! The configuration here describes how a *single* string is turned into an
//! encoding vector. It carries no parallelism, caching or missing-value
//! policy; those belong to the batch encoder that drives this crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive range of n-gram lengths combined into one n-gram set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct NgramRange {
    /// Shortest n-gram length (>= 1).
    pub low: usize,
    /// Longest n-gram length (>= `low`).
    pub high: usize,
}

impl NgramRange {
    pub const fn new(low: usize, high: usize) -> Self {
        Self { low, high }
    }

    /// Iterate over every n in `low..=high`.
    pub fn lengths(&self) -> std::ops::RangeInclusive<usize> {
        self.low..=self.high
    }

    pub fn validate(&self) -> Result<(), MinHashError> {
        if self.low < 1 || self.low > self.high {
            return Err(MinHashError::InvalidNgramRange {
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }
}

impl Default for NgramRange {
    fn default() -> Self {
        Self::new(2, 4)
    }
}

impl From<(usize, usize)> for NgramRange {
    fn from((low, high): (usize, usize)) -> Self {
        Self { low, high }
    }
}

impl From<NgramRange> for (usize, usize) {
    fn from(range: NgramRange) -> Self {
        (range.low, range.high)
    }
}

/// Seeded hash family used to hash n-grams.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum HashingBackend {
    /// Custom positional mixing hash. Supports the combined min+max pass.
    #[default]
    Fast,
    /// MurmurHash3 (x86, 32-bit). Min-only.
    #[serde(alias = "general")]
    Murmur,
}

impl HashingBackend {
    /// Whether this backend can report min and max in one pass.
    pub const fn supports_minmax(self) -> bool {
        matches!(self, Self::Fast)
    }

    /// Largest value the backend can emit. Used as the normalization
    /// divisor, so a narrower backend must report its own bound here.
    pub const fn max_hash(self) -> u32 {
        match self {
            Self::Fast | Self::Murmur => u32::MAX,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Murmur => "murmur",
        }
    }
}

impl fmt::Display for HashingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashingBackend {
    type Err = MinHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(Self::Fast),
            "murmur" | "general" => Ok(Self::Murmur),
            other => Err(MinHashError::UnknownHashing {
                value: other.to_string(),
            }),
        }
    }
}

/// Per-string MinHash configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MinHashConfig {
    /// Width of the encoding vector.
    ///
    /// Must be even when `minmax_hash` is set, since every seed then
    /// contributes two components.
    pub n_components: usize,
    /// N-gram lengths combined into the n-gram set.
    pub ngram_range: NgramRange,
    /// Hash family.
    pub hashing: HashingBackend,
    /// Emit interleaved (min, max) pairs instead of plain minima.
    pub minmax_hash: bool,
}

impl MinHashConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the encoding width. Values around 300 tend to predict better at a
    /// higher compute cost.
    pub fn with_n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    pub fn with_ngram_range(mut self, low: usize, high: usize) -> Self {
        self.ngram_range = NgramRange::new(low, high);
        self
    }

    pub fn with_hashing(mut self, hashing: HashingBackend) -> Self {
        self.hashing = hashing;
        self
    }

    pub fn with_minmax_hash(mut self, minmax_hash: bool) -> Self {
        self.minmax_hash = minmax_hash;
        self
    }

    /// Number of independent seeds needed to fill `n_components`.
    pub fn seed_count(&self) -> usize {
        if self.minmax_hash {
            self.n_components / 2
        } else {
            self.n_components
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), MinHashError> {
        if self.n_components == 0 {
            return Err(MinHashError::InvalidComponents {
                n_components: self.n_components,
            });
        }
        self.ngram_range.validate()?;
        if self.minmax_hash {
            if !self.hashing.supports_minmax() {
                return Err(MinHashError::MinmaxUnsupported {
                    hashing: self.hashing,
                });
            }
            if self.n_components % 2 != 0 {
                return Err(MinHashError::OddComponentsForMinmax {
                    n_components: self.n_components,
                });
            }
        }
        Ok(())
    }
}

impl Default for MinHashConfig {
    fn default() -> Self {
        Self {
            n_components: 30,
            ngram_range: NgramRange::default(),
            hashing: HashingBackend::Fast,
            minmax_hash: false,
        }
    }
}

/// Errors returned by the MinHash core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MinHashError {
    #[error("invalid config: n_components must be >= 1 (got {n_components})")]
    InvalidComponents { n_components: usize },

    #[error("invalid config: ngram_range must satisfy 1 <= low <= high (got ({low}, {high}))")]
    InvalidNgramRange { low: usize, high: usize },

    #[error("invalid config: n_components must be even when minmax_hash=true (got {n_components})")]
    OddComponentsForMinmax { n_components: usize },

    #[error("invalid config: minmax_hash is not supported with hashing={hashing}")]
    MinmaxUnsupported { hashing: HashingBackend },

    #[error("invalid config: unknown hashing {value:?}; expected one of \"fast\", \"murmur\"")]
    UnknownHashing { value: String },
}
