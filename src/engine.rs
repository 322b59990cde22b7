//! The engine (§4.6): input gating, config merge, cache, kernel dispatch,
//! batch, and async fan-out. This is the one public surface most callers
//! need; everything else in the crate is a leaf it composes.

use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::cache::{Cache, Fingerprint};
use crate::config::{Algorithm, CaseSensitivity, Config, ConfigPatch};
use crate::error::{Error, Result};
use crate::kernels::{self, KernelOutcome};
use crate::pool::AsyncExecutor;
use crate::text::UnicodeText;

const BATCH_PARALLEL_THRESHOLD: usize = 64;

/// The shared engine: global config, per-algorithm overrides, a similarity
/// cache, and a worker pool for the async entry points.
pub struct Engine {
    global_config: RwLock<Config>,
    algorithm_overrides: RwLock<FxHashMap<Algorithm, ConfigPatch>>,
    cache: Cache,
    pool: AsyncExecutor,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            global_config: RwLock::new(Config::default()),
            algorithm_overrides: RwLock::new(FxHashMap::default()),
            cache: Cache::new(),
            pool: AsyncExecutor::with_default_size(),
        }
    }

    /// Compute similarity for `(s1, s2)` under `algorithm`, with an
    /// optional sparse per-call config overlay.
    pub fn similarity(&self, s1: &str, s2: &str, algorithm: Algorithm, per_call: Option<&ConfigPatch>) -> Result<f64> {
        self.evaluate(s1, s2, algorithm, per_call).map(|o| o.similarity)
    }

    /// Compute distance for `(s1, s2)` under `algorithm`. Edit-kernel
    /// distances are exact integer counts; every other kernel's distance
    /// is its real value scaled by 1000 and rounded (§6).
    pub fn distance(&self, s1: &str, s2: &str, algorithm: Algorithm, per_call: Option<&ConfigPatch>) -> Result<u64> {
        let outcome = self.evaluate(s1, s2, algorithm, per_call)?;
        Ok(quantize_distance(algorithm, outcome.distance))
    }

    /// Async counterpart of [`Engine::similarity`]. Takes `Arc<Engine>` by
    /// value (callers hold the engine behind an `Arc` and clone it for each
    /// submission) since the job outlives this call and runs on a worker
    /// thread.
    pub fn similarity_async(
        self: std::sync::Arc<Self>,
        s1: String,
        s2: String,
        algorithm: Algorithm,
        per_call: Option<ConfigPatch>,
    ) -> Result<Receiver<Result<f64>>> {
        let engine = std::sync::Arc::clone(&self);
        self.pool.submit(move || engine.similarity(&s1, &s2, algorithm, per_call.as_ref()))
    }

    /// Async counterpart of [`Engine::distance`].
    pub fn distance_async(
        self: std::sync::Arc<Self>,
        s1: String,
        s2: String,
        algorithm: Algorithm,
        per_call: Option<ConfigPatch>,
    ) -> Result<Receiver<Result<u64>>> {
        let engine = std::sync::Arc::clone(&self);
        self.pool.submit(move || engine.distance(&s1, &s2, algorithm, per_call.as_ref()))
    }

    /// Compute similarity for every pair, preserving order; a failure at
    /// one index does not abort the rest. Runs in parallel via `rayon`
    /// once the batch is large enough to be worth the fan-out.
    pub fn similarity_batch(&self, pairs: &[(String, String)], algorithm: Algorithm, per_call: Option<&ConfigPatch>) -> Vec<Result<f64>> {
        if pairs.len() >= BATCH_PARALLEL_THRESHOLD {
            pairs
                .par_iter()
                .map(|(a, b)| self.similarity(a, b, algorithm, per_call))
                .collect()
        } else {
            pairs.iter().map(|(a, b)| self.similarity(a, b, algorithm, per_call)).collect()
        }
    }

    /// Replace the global configuration. Invalidates the cache, since
    /// cached similarities were computed under the old defaults.
    pub fn set_global_config(&self, config: Config) {
        *self.global_config.write() = config;
        self.cache.clear();
    }

    pub fn get_global_config(&self) -> Config {
        self.global_config.read().clone()
    }

    /// Set a sparse per-algorithm override, layered between the global
    /// config and any per-call overlay (§4.6 step 2).
    pub fn set_algorithm_config(&self, algorithm: Algorithm, patch: ConfigPatch) {
        self.algorithm_overrides.write().insert(algorithm, patch);
        self.cache.clear();
    }

    pub fn get_algorithm_config(&self, algorithm: Algorithm) -> Option<ConfigPatch> {
        self.algorithm_overrides.read().get(&algorithm).cloned()
    }

    /// `{tag, canonical name}` for every supported algorithm.
    pub fn supported_algorithms(&self) -> Vec<(u8, &'static str)> {
        Algorithm::ALL.iter().map(|a| (a.tag(), a.canonical_name())).collect()
    }

    /// A rough byte estimate of the cache's current footprint.
    pub fn memory_usage(&self) -> usize {
        const ESTIMATED_BYTES_PER_ENTRY: usize = 128;
        self.cache.len() * ESTIMATED_BYTES_PER_ENTRY
    }

    pub fn clear_caches(&self) {
        self.cache.clear();
    }

    /// The dispatch protocol (§4.6 steps 1-6).
    fn evaluate(&self, s1: &str, s2: &str, algorithm: Algorithm, per_call: Option<&ConfigPatch>) -> Result<KernelOutcome> {
        let merged = self.resolve_config(algorithm, per_call)?;

        if s1.len() > merged.effective_max_string_length() || s2.len() > merged.effective_max_string_length() {
            return Err(Error::invalid_input("input exceeds max_string_length"));
        }

        let fingerprint = Fingerprint::new(&merged, s1.as_bytes(), s2.as_bytes());

        // Distances that aren't derivable from a cached similarity (the edit
        // family's raw counts, the Lp kernels' native magnitudes) always
        // re-run the kernel; their call path may still populate the cache
        // for a subsequent similarity() call.
        if kernels::is_similarity_derived_distance(algorithm) {
            if let Some(similarity) = self.cache.get(&fingerprint) {
                tracing::debug!(algorithm = algorithm.canonical_name(), "cache hit");
                return Ok(KernelOutcome {
                    similarity,
                    distance: 1.0 - similarity,
                });
            }
        }
        tracing::debug!(algorithm = algorithm.canonical_name(), "cache miss");

        let t1 = UnicodeText::from_str(s1);
        let t2 = UnicodeText::from_str(s2);

        let outcome = if is_identity(&t1, &t2, &merged) {
            KernelOutcome {
                similarity: 1.0,
                distance: 0.0,
            }
        } else {
            tracing::trace!(
                algorithm = algorithm.canonical_name(),
                len1 = t1.len(),
                len2 = t2.len(),
                "dispatching kernel"
            );
            kernels::run(algorithm, &t1, &t2, &merged)?
        };

        self.cache.insert(fingerprint, outcome.similarity);
        Ok(outcome)
    }

    fn resolve_config(&self, algorithm: Algorithm, per_call: Option<&ConfigPatch>) -> Result<Config> {
        let global = self.global_config.read().clone();
        let per_algorithm = self.algorithm_overrides.read().get(&algorithm).cloned();
        let mut merged = global.merged_with(per_algorithm.as_ref(), per_call);
        merged.algorithm = algorithm;
        merged.validate()?;
        tracing::debug!(
            algorithm = merged.algorithm.canonical_name(),
            preprocessing = ?merged.preprocessing,
            "config merged"
        );
        Ok(merged)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// True for the cheap identity shortcuts (§4.6 step 5) that every kernel
/// would resolve to `similarity = 1` anyway: exact code-point equality, or
/// case-insensitive equality under `Insensitive` mode. Both imply equal
/// length, so the shortcut is safe even for Hamming. Deliberately *not*
/// taken for "one side empty" — each kernel already encodes that edge case
/// correctly (Hamming in particular must still error on unequal lengths).
fn is_identity(t1: &UnicodeText, t2: &UnicodeText, config: &Config) -> bool {
    if t1 == t2 {
        return true;
    }
    config.case_sensitivity == CaseSensitivity::Insensitive && t1.eq_under(t2, CaseSensitivity::Insensitive)
}

fn quantize_distance(algorithm: Algorithm, raw_distance: f64) -> u64 {
    match algorithm {
        Algorithm::Levenshtein | Algorithm::DamerauLevenshtein | Algorithm::Hamming => raw_distance.round() as u64,
        _ => (raw_distance * 1000.0).round().max(0.0) as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn kitten_sitting_levenshtein() {
        let engine = Engine::new();
        assert_eq!(engine.distance("kitten", "sitting", Algorithm::Levenshtein, None).unwrap(), 3);
        let sim = engine.similarity("kitten", "sitting", Algorithm::Levenshtein, None).unwrap();
        assert!((sim - (1.0 - 3.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn hamming_unequal_length_errors() {
        let engine = Engine::new();
        let err = engine.distance("hello", "hi", Algorithm::Hamming, None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
        assert!(err.message().contains("equal-length"));
    }

    #[test]
    fn jaro_winkler_martha_marhta() {
        let engine = Engine::new();
        let sim = engine.similarity("martha", "marhta", Algorithm::JaroWinkler, None).unwrap();
        assert!(sim > 0.9);
    }

    #[test]
    fn cosine_word_order_independent() {
        let engine = Engine::new();
        let patch = ConfigPatch {
            preprocessing: Some(crate::config::Preprocessing::Word),
            ..Default::default()
        };
        let sim = engine.similarity("hello world", "world hello", Algorithm::Cosine, Some(&patch)).unwrap();
        assert_eq!(sim, 1.0);
    }

    #[test]
    fn identical_strings_short_circuit_to_identity() {
        let engine = Engine::new();
        assert_eq!(engine.similarity("same", "same", Algorithm::Jaro, None).unwrap(), 1.0);
        assert_eq!(engine.distance("same", "same", Algorithm::Levenshtein, None).unwrap(), 0);
    }

    #[test]
    fn max_string_length_is_enforced() {
        let engine = Engine::new();
        let patch = ConfigPatch {
            max_string_length: Some(3),
            ..Default::default()
        };
        let err = engine.similarity("hello", "hi", Algorithm::Levenshtein, Some(&patch)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[test]
    fn set_global_config_invalidates_cache() {
        let engine = Engine::new();
        engine.similarity("a", "b", Algorithm::Jaro, None).unwrap();
        assert!(engine.memory_usage() > 0);
        engine.set_global_config(Config::default());
        assert_eq!(engine.memory_usage(), 0);
    }

    #[test]
    fn batch_preserves_order_and_length() {
        let engine = Engine::new();
        let pairs = vec![
            ("a".to_string(), "a".to_string()),
            ("a".to_string(), "b".to_string()),
            ("hello".to_string(), "hallo".to_string()),
        ];
        let results = engine.similarity_batch(&pairs, Algorithm::Levenshtein, None);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), &1.0);
    }

    #[test]
    fn async_similarity_completes() {
        let engine = Arc::new(Engine::new());
        let rx = Arc::clone(&engine)
            .similarity_async("hello".to_string(), "hallo".to_string(), Algorithm::Levenshtein, None)
            .unwrap();
        let sim = rx.recv_timeout(Duration::from_secs(1)).unwrap().unwrap();
        assert!((sim - 0.8).abs() < 1e-9);
    }

    #[test]
    fn supported_algorithms_lists_all_thirteen() {
        let engine = Engine::new();
        assert_eq!(engine.supported_algorithms().len(), 13);
    }
}
