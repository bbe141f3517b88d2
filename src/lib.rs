//! Workspace umbrella crate for the MinHash string encoder.
//!
//! This crate turns rectangular tables of strings into dense numeric
//! feature matrices. Each input column becomes `n_components` output
//! columns of MinHash values computed by the [`minhash`] core crate; this
//! crate adds the batch concerns on top: value deduplication, an LRU cache
//! of computed encodings, parallel dispatch on a worker pool and
//! missing-value handling.
//!
//! ```
//! use minhash_encoder::{EncoderConfig, MinHashEncoder, StringTable};
//!
//! let config = EncoderConfig::new().with_n_components(5);
//! let mut encoder = MinHashEncoder::new(config)?;
//!
//! let x = StringTable::from_column(["paris, FR", "Paris", "London, UK", "London"]);
//! let features = encoder.transform(&x)?;
//! assert_eq!(features.shape(), (4, 5));
//! # Ok::<(), minhash_encoder::EncoderError>(())
//! ```

pub mod cache;
pub mod config;
pub mod encoder;
pub mod error;
pub mod table;

pub use minhash::{
    EMPTY_SENTINEL, HashingBackend, MinHashConfig, MinHashError, MinHasher, NgramRange, NgramSet,
    SeededHash, minhash_encode,
};

pub use crate::cache::{CacheStats, LruCache};
pub use crate::config::{
    ConfigLoadError, DEFAULT_CACHE_CAPACITY, EncoderConfig, MissingPolicy, NJobs,
};
pub use crate::encoder::{Encoding, MinHashEncoder};
pub use crate::error::EncoderError;
pub use crate::table::{Cell, EncodedMatrix, StringTable};
