//! # Character n-gram MinHash
//!
//! This crate turns a single string into a fixed-length numeric vector such
//! that strings sharing many character n-grams get similar vectors. It is
//! the per-string core of the batch encoder in the `minhash-encoder` crate.
//!
//! ## Contract
//!
//! - The API is a pure function of `(string, config)` with no I/O, no
//!   caching and no reliance on global process state.
//! - The output always has exactly `n_components` values in `[0, 1]`.
//!
//! Invariant: for the same string and the same [`MinHashConfig`], the
//! output is bit identical.
//!
//! ## Pipeline
//!
//! 1.  **N-gram extraction**: the string is lowercased, whitespace runs are
//!     collapsed and the text is padded with a space on each side. Every
//!     character n-gram with a length in `ngram_range` is collected into a
//!     deduplicated set.
//!
//! 2.  **Seeded hashing**: each n-gram is hashed to a `u32` by a member of
//!     a seeded hash family, one seed per output component. The `fast`
//!     backend is a positional mixing hash; `murmur` is MurmurHash3.
//!
//! 3.  **Reduction**: for each seed the minimum hash over all n-grams (or
//!     the `(min, max)` pair with `minmax_hash`) is divided by the largest
//!     possible hash value.
//!
//! ## Example Usage
//!
//! ```
//! use minhash::{minhash_encode, MinHashConfig};
//!
//! let config = MinHashConfig::new().with_n_components(5);
//! let paris = minhash_encode("Paris", &config).unwrap();
//!
//! assert_eq!(paris.len(), 5);
//! assert!(paris.iter().all(|v| (0.0..=1.0).contains(v)));
//! ```
//!
pub mod config;
pub mod hashing;
mod minhash;
pub mod ngrams;

pub use crate::config::{HashingBackend, MinHashConfig, MinHashError, NgramRange};
pub use crate::hashing::{FastHash, FastHasher, MurmurHash, SeededHash};
pub use crate::minhash::{encode, encode_ngrams, MinHasher};
pub use crate::ngrams::{extract, NgramSet, EMPTY_SENTINEL};

/// Validate `cfg`, then encode `text`.
pub fn minhash_encode(text: &str, cfg: &MinHashConfig) -> Result<Vec<f32>, MinHashError> {
    cfg.validate()?;
    Ok(encode(text, cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minhash_encode_validates() {
        let cfg = MinHashConfig::new().with_n_components(3).with_minmax_hash(true);
        assert_eq!(
            minhash_encode("x", &cfg),
            Err(MinHashError::OddComponentsForMinmax { n_components: 3 })
        );
    }

    #[test]
    fn minhash_encode_matches_encode() {
        let cfg = MinHashConfig::default();
        assert_eq!(minhash_encode("Paris", &cfg).unwrap(), encode("Paris", &cfg));
    }
}
