//! Similarity cache (§4.7): a bounded, TTL-expiring map keyed by a
//! fingerprint of algorithm, config, and both input texts. Only similarity
//! is cached; distances recompute, since edit-kernel distances aren't
//! derivable from a cached similarity without re-running the kernel, and
//! the engine derives the other kernels' distances from similarity cheaply.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::config::{Algorithm, CaseSensitivity, Config, Preprocessing};

const MAX_ENTRIES: usize = 10_000;
const TTL: Duration = Duration::from_secs(5 * 60);

/// Identifies one `(algorithm, config, s1, s2)` computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    algorithm: Algorithm,
    preprocessing: Preprocessing,
    case_sensitivity: CaseSensitivity,
    ngram_size: u32,
    threshold_bits: Option<u64>,
    alpha_bits: Option<u64>,
    beta_bits: Option<u64>,
    prefix_weight_bits: Option<u64>,
    prefix_length: Option<u32>,
    s1: Vec<u8>,
    s2: Vec<u8>,
}

impl Fingerprint {
    pub fn new(config: &Config, s1: &[u8], s2: &[u8]) -> Self {
        Self {
            algorithm: config.algorithm,
            preprocessing: config.preprocessing,
            case_sensitivity: config.case_sensitivity,
            ngram_size: config.ngram_size,
            threshold_bits: config.threshold.map(f64::to_bits),
            alpha_bits: config.alpha.map(f64::to_bits),
            beta_bits: config.beta.map(f64::to_bits),
            prefix_weight_bits: config.prefix_weight.map(f64::to_bits),
            prefix_length: config.prefix_length,
            s1: s1.to_vec(),
            s2: s2.to_vec(),
        }
    }
}

struct Entry {
    similarity: f64,
    inserted_at: Instant,
}

/// A bounded, TTL-expiring similarity cache guarded by a single mutex, the
/// way the teacher guards its own shared lookup state.
pub struct Cache {
    inner: Mutex<FxHashMap<Fingerprint, Entry>>,
}

impl Cache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FxHashMap::default()),
        }
    }

    /// Return the cached similarity for `key`, if present and not expired.
    pub fn get(&self, key: &Fingerprint) -> Option<f64> {
        let guard = self.inner.lock();
        let entry = guard.get(key)?;
        if entry.inserted_at.elapsed() > TTL {
            None
        } else {
            Some(entry.similarity)
        }
    }

    /// Insert `similarity` for `key`, evicting expired and then oldest
    /// entries first if at capacity.
    pub fn insert(&self, key: Fingerprint, similarity: f64) {
        let mut guard = self.inner.lock();
        if guard.len() >= MAX_ENTRIES {
            evict(&mut guard);
        }
        guard.insert(
            key,
            Entry {
                similarity,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of live (non-expired) entries, for memory-usage reporting.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

/// Sweep expired entries; if still at capacity, drop the oldest entries by
/// insertion time until at half capacity.
fn evict(map: &mut FxHashMap<Fingerprint, Entry>) {
    map.retain(|_, v| v.inserted_at.elapsed() <= TTL);
    if map.len() < MAX_ENTRIES {
        return;
    }
    let mut by_age: Vec<(Fingerprint, Instant)> = map.iter().map(|(k, v)| (k.clone(), v.inserted_at)).collect();
    by_age.sort_by_key(|(_, t)| *t);
    let target = MAX_ENTRIES / 2;
    for (key, _) in by_age.into_iter().take(map.len().saturating_sub(target)) {
        map.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(s1: &str, s2: &str) -> Fingerprint {
        Fingerprint::new(&Config::new(Algorithm::Levenshtein), s1.as_bytes(), s2.as_bytes())
    }

    #[test]
    fn round_trips_a_value() {
        let cache = Cache::new();
        let key = fp("a", "b");
        assert_eq!(cache.get(&key), None);
        cache.insert(key.clone(), 0.5);
        assert_eq!(cache.get(&key), Some(0.5));
    }

    #[test]
    fn distinct_configs_are_distinct_keys() {
        let key1 = Fingerprint::new(&Config::new(Algorithm::Levenshtein), b"a", b"b");
        let key2 = Fingerprint::new(&Config::new(Algorithm::Jaro), b"a", b"b");
        assert_ne!(key1, key2);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = Cache::new();
        cache.insert(fp("a", "b"), 0.5);
        cache.clear();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn eviction_keeps_cache_bounded() {
        let cache = Cache::new();
        for i in 0..(MAX_ENTRIES + 10) {
            let s = i.to_string();
            cache.insert(fp(&s, "b"), 0.1);
        }
        assert!(cache.len() <= MAX_ENTRIES);
    }
}
