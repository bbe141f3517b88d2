//! Seeded 32-bit hash family over n-gram bytes.
//!
//! Two backends implement [`SeededHash`]:
//!
//! - [`FastHash`]: a positional mixing hash. Every byte position `i` of an
//!   n-gram is multiplied by a seed-specific random atom and the products
//!   are summed, then the accumulator is avalanched down to 32 bits. A
//!   hasher bound to one seed ([`FastHasher`]) precomputes its atoms and
//!   can report the min and max over a whole n-gram set in one pass.
//! - [`MurmurHash`]: MurmurHash3 x86_32 with the seed as its key.
//!
//! Both are deterministic across runs and processes for a given
//! `(bytes, seed)` pair.

use mur3::murmurhash3_x86_32;

use crate::config::HashingBackend;

/// Salt folded into every fast-hash key so that seed 0 is not the zero key.
const FAST_KEY_SALT: u64 = 0x243F_6A88_85A3_08D3;

/// Atoms precomputed per seed; longer n-grams derive the rest on demand.
const PRECOMPUTED_ATOMS: usize = 32;

/// A hash function family indexed by an integer seed.
pub trait SeededHash {
    fn hash(&self, bytes: &[u8], seed: u32) -> u32;
}

/// Positional mixing hash, see the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastHash;

impl SeededHash for FastHash {
    fn hash(&self, bytes: &[u8], seed: u32) -> u32 {
        FastHasher::new(seed).hash(bytes)
    }
}

/// MurmurHash3 x86_32.
#[derive(Debug, Clone, Copy, Default)]
pub struct MurmurHash;

impl SeededHash for MurmurHash {
    #[inline]
    fn hash(&self, bytes: &[u8], seed: u32) -> u32 {
        murmurhash3_x86_32(bytes, seed)
    }
}

impl SeededHash for HashingBackend {
    fn hash(&self, bytes: &[u8], seed: u32) -> u32 {
        match self {
            Self::Fast => FastHash.hash(bytes, seed),
            Self::Murmur => MurmurHash.hash(bytes, seed),
        }
    }
}

/// Fast hash bound to a single seed, with its atoms precomputed.
#[derive(Debug, Clone)]
pub struct FastHasher {
    key: u64,
    atoms: Vec<u64>,
}

impl FastHasher {
    pub fn new(seed: u32) -> Self {
        let key = splitmix64(u64::from(seed) ^ FAST_KEY_SALT);
        let atoms = (0..PRECOMPUTED_ATOMS).map(|i| atom(key, i)).collect();
        Self { key, atoms }
    }

    #[inline]
    pub fn hash(&self, bytes: &[u8]) -> u32 {
        let mut acc = self.key;
        for (i, &b) in bytes.iter().enumerate() {
            let a = match self.atoms.get(i) {
                Some(&a) => a,
                None => atom(self.key, i),
            };
            acc = acc.wrapping_add((u64::from(b) + 1).wrapping_mul(a));
        }
        (splitmix64(acc) >> 32) as u32
    }

    /// Minimum and maximum hash over `grams`, in one pass.
    ///
    /// Returns `None` for an empty input.
    pub fn min_max<'a, I>(&self, grams: I) -> Option<(u32, u32)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut it = grams.into_iter();
        let first = self.hash(it.next()?.as_bytes());
        let (mut lo, mut hi) = (first, first);
        for g in it {
            let h = self.hash(g.as_bytes());
            if h < lo {
                lo = h;
            }
            if h > hi {
                hi = h;
            }
        }
        Some((lo, hi))
    }
}

/// Odd 64-bit multiplier for position `i` under `key`.
#[inline]
fn atom(key: u64, i: usize) -> u64 {
    splitmix64(key.wrapping_add((i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))) | 1
}

/// A 64-bit hash function that is fast and has good distribution.
#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Fast backend ====================

    #[test]
    fn fast_hash_is_deterministic() {
        let h1 = FastHash.hash(b"par", 3);
        let h2 = FastHash.hash(b"par", 3);
        assert_eq!(h1, h2);
    }

    #[test]
    fn fast_hash_depends_on_seed() {
        let hashes: Vec<u32> = (0..16).map(|s| FastHash.hash(b"ari", s)).collect();
        let mut uniq = hashes.clone();
        uniq.sort_unstable();
        uniq.dedup();
        assert_eq!(uniq.len(), hashes.len());
    }

    #[test]
    fn fast_hash_is_position_sensitive() {
        assert_ne!(FastHash.hash(b"ab", 0), FastHash.hash(b"ba", 0));
    }

    #[test]
    fn fast_hasher_handles_long_input() {
        let long = vec![b'x'; PRECOMPUTED_ATOMS * 3];
        let hasher = FastHasher::new(7);
        assert_eq!(hasher.hash(&long), FastHash.hash(&long, 7));
        assert_ne!(hasher.hash(&long), hasher.hash(&long[..PRECOMPUTED_ATOMS]));
    }

    #[test]
    fn fast_hash_spreads_over_u32() {
        let hasher = FastHasher::new(0);
        let mut high_bit = 0;
        let n = 2000;
        for i in 0..n {
            let s = format!("g{i}");
            if hasher.hash(s.as_bytes()) & 0x8000_0000 != 0 {
                high_bit += 1;
            }
        }
        // Roughly half the values should land in the upper half of the range.
        assert!(high_bit > n * 2 / 5 && high_bit < n * 3 / 5, "{high_bit}");
    }

    #[test]
    fn min_max_matches_individual_hashes() {
        let grams = [" p", "pa", "ar", "ri", "is", "s "];
        let hasher = FastHasher::new(11);
        let hashes: Vec<u32> = grams.iter().map(|g| hasher.hash(g.as_bytes())).collect();

        let (lo, hi) = hasher.min_max(grams.iter().copied()).unwrap();
        assert_eq!(lo, *hashes.iter().min().unwrap());
        assert_eq!(hi, *hashes.iter().max().unwrap());
    }

    #[test]
    fn min_max_of_nothing_is_none() {
        assert_eq!(FastHasher::new(0).min_max(std::iter::empty()), None);
    }

    // ==================== Murmur backend ====================

    #[test]
    fn murmur_matches_reference_vectors() {
        // Reference values of MurmurHash3_x86_32.
        assert_eq!(MurmurHash.hash(b"", 0), 0);
        assert_eq!(MurmurHash.hash(b"", 1), 0x514E_28B7);
        assert_eq!(MurmurHash.hash(b"hello", 0), 0x248B_FA47);
    }

    #[test]
    fn murmur_depends_on_seed() {
        assert_ne!(MurmurHash.hash(b"lon", 0), MurmurHash.hash(b"lon", 1));
    }

    #[test]
    fn backend_dispatch() {
        assert_eq!(
            HashingBackend::Fast.hash(b"abc", 4),
            FastHash.hash(b"abc", 4)
        );
        assert_eq!(
            HashingBackend::Murmur.hash(b"abc", 4),
            MurmurHash.hash(b"abc", 4)
        );
    }
}
