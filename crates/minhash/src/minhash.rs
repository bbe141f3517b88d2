//! MinHash reduction over a string's n-gram set.
//!
//! Component `d` of the encoding is the minimum hash, under seed `d`, over
//! all n-grams of the string, divided by the backend's maximum hash value.
//! With `minmax_hash` each seed contributes a `(min, max)` pair instead, so
//! only `n_components / 2` seeds are evaluated.

use crate::config::{HashingBackend, MinHashConfig};
use crate::hashing::{FastHasher, MurmurHash, SeededHash};
use crate::ngrams::{extract, NgramSet};

/// Encoder for one configuration, with its per-seed hashers built once.
///
/// The configuration is assumed to be valid; see
/// [`MinHashConfig::validate`].
#[derive(Debug, Clone)]
pub struct MinHasher {
    cfg: MinHashConfig,
    /// One bound hasher per seed; empty for the murmur backend.
    fast: Vec<FastHasher>,
}

impl MinHasher {
    pub fn new(cfg: MinHashConfig) -> Self {
        let fast = match cfg.hashing {
            HashingBackend::Fast => (0..cfg.seed_count())
                .map(|seed| FastHasher::new(seed as u32))
                .collect(),
            HashingBackend::Murmur => Vec::new(),
        };
        Self { cfg, fast }
    }

    pub fn config(&self) -> &MinHashConfig {
        &self.cfg
    }

    /// Encode one string into an `n_components`-long vector in `[0, 1]`.
    pub fn encode(&self, text: &str) -> Vec<f32> {
        self.encode_ngrams(&extract(text, self.cfg.ngram_range))
    }

    /// Encode an already extracted n-gram set.
    pub fn encode_ngrams(&self, grams: &NgramSet) -> Vec<f32> {
        let scale = f64::from(self.cfg.hashing.max_hash());
        let normalize = |h: u32| (f64::from(h) / scale) as f32;

        let mut out = Vec::with_capacity(self.cfg.n_components);
        match (self.cfg.hashing, self.cfg.minmax_hash) {
            (HashingBackend::Fast, true) => {
                for hasher in &self.fast {
                    // Never empty after sentinel substitution.
                    let (lo, hi) = hasher.min_max(grams.iter()).unwrap_or((u32::MAX, 0));
                    out.push(normalize(lo));
                    out.push(normalize(hi));
                }
            }
            (HashingBackend::Fast, false) => {
                for hasher in &self.fast {
                    let lo = grams
                        .iter()
                        .map(|g| hasher.hash(g.as_bytes()))
                        .min()
                        .unwrap_or(u32::MAX);
                    out.push(normalize(lo));
                }
            }
            (HashingBackend::Murmur, _) => {
                // Gram-major so every n-gram's bytes are read once for all seeds.
                let mut mins = vec![u32::MAX; self.cfg.n_components];
                for g in grams.iter() {
                    for (seed, slot) in mins.iter_mut().enumerate() {
                        let h = MurmurHash.hash(g.as_bytes(), seed as u32);
                        if h < *slot {
                            *slot = h;
                        }
                    }
                }
                out.extend(mins.into_iter().map(normalize));
            }
        }
        out
    }
}

/// Encode one string with a throwaway [`MinHasher`].
pub fn encode(text: &str, cfg: &MinHashConfig) -> Vec<f32> {
    MinHasher::new(cfg.clone()).encode(text)
}

/// Encode an already extracted n-gram set with a throwaway [`MinHasher`].
pub fn encode_ngrams(grams: &NgramSet, cfg: &MinHashConfig) -> Vec<f32> {
    MinHasher::new(cfg.clone()).encode_ngrams(grams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NgramRange;

    fn cfg(n: usize) -> MinHashConfig {
        MinHashConfig::new().with_n_components(n)
    }

    // ==================== Shape and range ====================

    #[test]
    fn encode_has_n_components() {
        for n in [1, 5, 30, 64] {
            assert_eq!(encode("paris, FR", &cfg(n)).len(), n);
        }
    }

    #[test]
    fn encode_values_in_unit_interval() {
        for backend in [HashingBackend::Fast, HashingBackend::Murmur] {
            let v = encode("London, UK", &cfg(32).with_hashing(backend));
            assert!(v.iter().all(|&x| (0.0..=1.0).contains(&x)), "{v:?}");
        }
    }

    #[test]
    fn minmax_has_n_components_and_ordered_pairs() {
        let c = cfg(10).with_minmax_hash(true);
        let v = encode("London", &c);
        assert_eq!(v.len(), 10);
        for pair in v.chunks(2) {
            assert!(pair[0] <= pair[1], "{pair:?}");
        }
    }

    // ==================== Determinism ====================

    #[test]
    fn encode_deterministic() {
        for backend in [HashingBackend::Fast, HashingBackend::Murmur] {
            let c = cfg(16).with_hashing(backend);
            assert_eq!(encode("Paris", &c), encode("Paris", &c));
        }
    }

    #[test]
    fn minmax_min_components_match_plain_minhash() {
        let plain = encode("paris, FR", &cfg(4));
        let paired = encode("paris, FR", &cfg(8).with_minmax_hash(true));
        let mins: Vec<f32> = paired.chunks(2).map(|p| p[0]).collect();
        assert_eq!(plain, mins);
    }

    #[test]
    fn prefix_of_wider_encoding_is_stable() {
        let narrow = encode("Boston", &cfg(5));
        let wide = encode("Boston", &cfg(20));
        assert_eq!(narrow[..], wide[..5]);
    }

    #[test]
    fn normalized_variants_encode_identically() {
        let c = cfg(12);
        assert_eq!(encode("Paris", &c), encode("  PARIS ", &c));
    }

    #[test]
    fn murmur_min_over_grams() {
        let c = cfg(3)
            .with_hashing(HashingBackend::Murmur)
            .with_ngram_range(2, 2);
        let grams = extract("ab", NgramRange::new(2, 2));
        let v = encode("ab", &c);
        for (seed, &x) in v.iter().enumerate() {
            let expected = grams
                .iter()
                .map(|g| MurmurHash.hash(g.as_bytes(), seed as u32))
                .min()
                .unwrap();
            assert_eq!(x, (f64::from(expected) / f64::from(u32::MAX)) as f32);
        }
    }

    #[test]
    fn different_strings_differ() {
        let c = cfg(30);
        assert_ne!(encode("Paris", &c), encode("London", &c));
    }

    #[test]
    fn reused_hasher_matches_one_shot_encode() {
        for c in [
            cfg(12),
            cfg(12).with_minmax_hash(true),
            cfg(12).with_hashing(HashingBackend::Murmur),
        ] {
            let hasher = MinHasher::new(c.clone());
            for text in ["Paris", "London, UK", ""] {
                assert_eq!(hasher.encode(text), encode(text, &c));
            }
        }
    }

    #[test]
    fn hashers_built_once_per_seed() {
        assert_eq!(MinHasher::new(cfg(10)).fast.len(), 10);
        assert_eq!(MinHasher::new(cfg(10).with_minmax_hash(true)).fast.len(), 5);
        assert!(MinHasher::new(cfg(10).with_hashing(HashingBackend::Murmur))
            .fast
            .is_empty());
    }

    #[test]
    fn empty_string_matches_sentinel() {
        let c = cfg(8);
        assert_eq!(encode("", &c), encode(crate::ngrams::EMPTY_SENTINEL, &c));
    }
}
