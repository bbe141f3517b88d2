//! Batch MinHash encoder over string tables.
//!
//! Per column, the encoder deduplicates the cells, serves repeated values
//! from its LRU cache, computes the misses (optionally on a worker pool)
//! and scatters the per-value vectors back to every row.
//!
//! Workers only ever run the pure per-string encoder. All cache reads and
//! writes happen on the calling thread, before and after the parallel
//! region, so the cache needs no locking and results do not depend on
//! worker scheduling.

use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use hashbrown::HashMap;
use minhash::MinHasher;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{Level, debug, info, warn};

use crate::cache::{CacheStats, LruCache};
use crate::config::{EncoderConfig, MissingPolicy};
use crate::error::EncoderError;
use crate::table::{Cell, EncodedMatrix, StringTable};

/// Shared, immutable encoding of one value.
pub type Encoding = Arc<[f32]>;

/// Encodes string tables into MinHash feature matrices.
///
/// Construction validates the configuration and starts with an empty
/// cache; [`MinHashEncoder::fit`] resets that cache.
pub struct MinHashEncoder {
    config: EncoderConfig,
    hasher: MinHasher,
    cache: LruCache<Cell, Encoding>,
    pool: Option<ThreadPool>,
    workers: usize,
    n_features_in: Option<usize>,
}

impl fmt::Debug for MinHashEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinHashEncoder")
            .field("config", &self.config)
            .field("workers", &self.workers)
            .field("cache", &self.cache.stats())
            .field("n_features_in", &self.n_features_in)
            .finish()
    }
}

#[derive(Debug, Default)]
struct TransformSummary {
    distinct: usize,
    cache_hits: usize,
    computed: usize,
}

impl MinHashEncoder {
    pub fn new(config: EncoderConfig) -> Result<Self, EncoderError> {
        config.validate()?;
        let capacity =
            NonZeroUsize::new(config.cache_capacity).ok_or(EncoderError::InvalidCacheCapacity {
                capacity: config.cache_capacity,
            })?;

        let workers = config.n_jobs.resolve();
        let pool = if workers > 1 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("minhash-worker-{i}"))
                .build()
                .map_err(|e| EncoderError::ThreadPool(e.to_string()))?;
            debug!(workers, "encoder_pool_started");
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            hasher: MinHasher::new(config.minhash.clone()),
            config,
            cache: LruCache::new(capacity),
            pool,
            workers,
            n_features_in: None,
        })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Number of workers hashing cache misses.
    pub fn n_workers(&self) -> usize {
        self.workers
    }

    /// Number of input columns seen by the last successful transform.
    pub fn n_features_in(&self) -> Option<usize> {
        self.n_features_in
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Reset the encoder: empty the cache and forget the input width.
    pub fn fit(&mut self) -> &mut Self {
        self.cache.clear();
        self.n_features_in = None;
        debug!(capacity = self.cache.capacity(), "encoder_fit");
        self
    }

    /// [`fit`](Self::fit) followed by [`transform`](Self::transform).
    pub fn fit_transform(&mut self, x: &StringTable) -> Result<EncodedMatrix, EncoderError> {
        self.fit();
        self.transform(x)
    }

    /// Encode every cell of `x`.
    ///
    /// The output has shape `(n_rows, n_columns * n_components)`; each input
    /// column owns a contiguous block of `n_components` output columns, in
    /// input order. On error no matrix is produced.
    pub fn transform(&mut self, x: &StringTable) -> Result<EncodedMatrix, EncoderError> {
        let start = Instant::now();
        let (rows, columns) = x.shape();
        let span = tracing::span!(Level::INFO, "encoder.transform", rows, columns);
        let _guard = span.enter();

        match self.transform_inner(x) {
            Ok((matrix, summary)) => {
                let elapsed_micros = start.elapsed().as_micros();
                info!(
                    distinct = summary.distinct,
                    cache_hits = summary.cache_hits,
                    computed = summary.computed,
                    elapsed_micros,
                    "encoder_transform"
                );
                Ok(matrix)
            }
            Err(err) => {
                let elapsed_micros = start.elapsed().as_micros();
                warn!(error = %err, elapsed_micros, "encoder_transform_failure");
                Err(err)
            }
        }
    }

    /// Encode a single value through the cache.
    pub fn encode_value(&mut self, value: impl Into<Cell>) -> Result<Encoding, EncoderError> {
        let cell = value.into();
        if cell.is_missing() && self.config.handle_missing == MissingPolicy::Error {
            return Err(EncoderError::MissingValue);
        }
        let hasher = &self.hasher;
        let encoding = self
            .cache
            .get_or_insert_with(cell.clone(), || encode_cell(&cell, hasher));
        Ok(Arc::clone(encoding))
    }

    /// Output column names: `"{column}_{k}"` for every component of every
    /// input column.
    pub fn feature_names_out<S: AsRef<str>>(
        &self,
        column_names: &[S],
    ) -> Result<Vec<String>, EncoderError> {
        if let Some(expected) = self.n_features_in
            && expected != column_names.len()
        {
            return Err(EncoderError::FeatureNames {
                expected,
                found: column_names.len(),
            });
        }
        let k = self.config.n_components();
        Ok(column_names
            .iter()
            .flat_map(|name| (0..k).map(move |i| format!("{}_{i}", name.as_ref())))
            .collect())
    }

    fn transform_inner(
        &mut self,
        x: &StringTable,
    ) -> Result<(EncodedMatrix, TransformSummary), EncoderError> {
        if self.config.handle_missing == MissingPolicy::Error
            && let Some((row, column)) = x.first_missing()
        {
            return Err(EncoderError::MissingValues { column, row });
        }

        let k = self.config.n_components();
        let (n_rows, n_columns) = x.shape();
        let mut out = EncodedMatrix::zeros(n_rows, n_columns * k);
        let mut summary = TransformSummary::default();

        for (c, column) in x.columns().enumerate() {
            let (distinct, codes) = deduplicate(column);
            let hits_before = summary.cache_hits;
            let vectors = self.encode_distinct(&distinct, &mut summary);
            let cache_hits = summary.cache_hits - hits_before;
            debug!(
                column = c,
                distinct = distinct.len(),
                cache_hits,
                computed = distinct.len() - cache_hits,
                "encoder_column"
            );

            let block = c * k..(c + 1) * k;
            for (row, &code) in codes.iter().enumerate() {
                out.row_mut(row)[block.clone()].copy_from_slice(&vectors[code]);
            }
        }

        self.n_features_in = Some(n_columns);
        Ok((out, summary))
    }

    /// Resolve the encodings of `distinct`, in order, through the cache.
    fn encode_distinct(
        &mut self,
        distinct: &[&Cell],
        summary: &mut TransformSummary,
    ) -> Vec<Encoding> {
        let mut resolved: Vec<Option<Encoding>> = Vec::with_capacity(distinct.len());
        let mut pending: Vec<&Cell> = Vec::new();
        for &cell in distinct {
            let hit = self.cache.get(cell).map(Arc::clone);
            if hit.is_none() {
                pending.push(cell);
            }
            resolved.push(hit);
        }

        let computed = self.compute(&pending);
        summary.distinct += distinct.len();
        summary.cache_hits += distinct.len() - pending.len();
        summary.computed += computed.len();

        // Orchestrator-only cache writes, in distinct order.
        let mut computed = computed.into_iter();
        for (slot, &cell) in resolved.iter_mut().zip(distinct) {
            if slot.is_none() {
                let encoding = computed.next();
                if let Some(encoding) = &encoding {
                    self.cache.put(cell.clone(), Arc::clone(encoding));
                }
                *slot = encoding;
            }
        }
        debug_assert!(resolved.iter().all(Option::is_some));
        resolved.into_iter().flatten().collect()
    }

    /// Run the pure encoder over `cells`, preserving order.
    fn compute(&self, cells: &[&Cell]) -> Vec<Encoding> {
        let hasher = &self.hasher;
        let Some(pool) = self.pool.as_ref().filter(|_| cells.len() > 1) else {
            return cells.iter().map(|cell| encode_cell(cell, hasher)).collect();
        };

        if self.config.batch {
            let n_slices = self.workers.saturating_mul(self.config.batch_per_job);
            let slices = even_slices(cells.len(), n_slices);
            pool.install(|| {
                slices
                    .into_par_iter()
                    .map(|range| {
                        cells[range]
                            .iter()
                            .map(|cell| encode_cell(cell, hasher))
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>()
            })
            .into_iter()
            .flatten()
            .collect()
        } else {
            pool.install(|| cells.par_iter().map(|cell| encode_cell(cell, hasher)).collect())
        }
    }
}

/// Encode one cell; missing cells map to the all-zero vector.
fn encode_cell(cell: &Cell, hasher: &MinHasher) -> Encoding {
    match cell {
        Cell::Missing => Arc::from(vec![0.0; hasher.config().n_components]),
        Cell::Text(text) => Arc::from(hasher.encode(text)),
    }
}

/// Distinct cells in first-seen order, plus each row's index into them.
fn deduplicate(column: &[Cell]) -> (Vec<&Cell>, Vec<usize>) {
    let mut seen: HashMap<&Cell, usize> = HashMap::new();
    let mut distinct = Vec::new();
    let mut codes = Vec::with_capacity(column.len());
    for cell in column {
        let code = *seen.entry(cell).or_insert_with(|| {
            distinct.push(cell);
            distinct.len() - 1
        });
        codes.push(code);
    }
    (distinct, codes)
}

/// Split `0..n` into at most `n_slices` contiguous, non-empty ranges whose
/// lengths differ by at most one; the longer ones come first.
fn even_slices(n: usize, n_slices: usize) -> Vec<Range<usize>> {
    let n_slices = n_slices.max(1);
    let (base, extra) = (n / n_slices, n % n_slices);
    let mut out = Vec::with_capacity(n_slices.min(n));
    let mut start = 0;
    for i in 0..n_slices {
        let len = base + usize::from(i < extra);
        if len == 0 {
            break;
        }
        out.push(start..start + len);
        start += len;
    }
    out
}
