// Pattern Cache - Bounded, TTL-swept cache of seeded generations
// Owned and injected by the caller; there is no global instance

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{CacheConfig, GeneratorConfig};

use super::assembler::generate_with;
use super::pattern::{GenerateOverrides, GeneratedPattern};

struct CacheEntry {
    pattern: Arc<GeneratedPattern>,
    inserted_at: Instant,
}

/// Cache keyed by style name and overrides
///
/// Only requests carrying an explicit seed are cached; seedless requests
/// are still deterministic but callers usually want them fresh.
pub struct PatternCache {
    entries: HashMap<String, CacheEntry>,
    capacity: usize,
    ttl: Duration,
    generator: GeneratorConfig,
}

impl PatternCache {
    pub fn new(config: &CacheConfig, generator: GeneratorConfig) -> Self {
        PatternCache {
            entries: HashMap::new(),
            capacity: config.capacity.max(1),
            ttl: Duration::from_secs(config.ttl_secs),
            generator,
        }
    }

    fn key(style: &str, overrides: &GenerateOverrides) -> Option<String> {
        overrides.random_seed?;
        Some(format!("{}|{:?}", style.trim().to_lowercase(), overrides))
    }

    /// Return a cached pattern or generate (and cache) a new one
    pub fn get_or_generate(
        &mut self,
        style: &str,
        overrides: &GenerateOverrides,
    ) -> Arc<GeneratedPattern> {
        self.get_or_generate_at(style, overrides, Instant::now())
    }

    fn get_or_generate_at(
        &mut self,
        style: &str,
        overrides: &GenerateOverrides,
        now: Instant,
    ) -> Arc<GeneratedPattern> {
        let Some(key) = Self::key(style, overrides) else {
            return Arc::new(generate_with(&self.generator, style, overrides));
        };

        if let Some(entry) = self.entries.get(&key) {
            if now.saturating_duration_since(entry.inserted_at) < self.ttl {
                log::debug!("Pattern cache hit: {}", key);
                return Arc::clone(&entry.pattern);
            }
        }

        let pattern = Arc::new(generate_with(&self.generator, style, overrides));
        self.sweep_at(now);
        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            CacheEntry {
                pattern: Arc::clone(&pattern),
                inserted_at: now,
            },
        );
        pattern
    }

    /// Drop every expired entry; returns how many were removed
    pub fn sweep(&mut self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < ttl);
        before - self.entries.len()
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    /// Empty the cache (session teardown)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize, ttl_secs: u64) -> PatternCache {
        PatternCache::new(&CacheConfig { capacity, ttl_secs }, GeneratorConfig::default())
    }

    #[test]
    fn test_seeded_requests_are_cached() {
        let mut cache = cache(4, 60);
        let first = cache.get_or_generate("House", &GenerateOverrides::with_seed(1));
        let second = cache.get_or_generate("House", &GenerateOverrides::with_seed(1));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_seedless_requests_bypass_cache() {
        let mut cache = cache(4, 60);
        cache.get_or_generate("House", &GenerateOverrides::default());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut cache = cache(2, 60);
        let start = Instant::now();
        let first = cache.get_or_generate_at("House", &GenerateOverrides::with_seed(1), start);
        cache.get_or_generate_at(
            "House",
            &GenerateOverrides::with_seed(2),
            start + Duration::from_millis(1),
        );
        cache.get_or_generate_at(
            "House",
            &GenerateOverrides::with_seed(3),
            start + Duration::from_millis(2),
        );
        assert_eq!(cache.len(), 2);

        let again = cache.get_or_generate_at(
            "House",
            &GenerateOverrides::with_seed(1),
            start + Duration::from_millis(3),
        );
        assert!(!Arc::ptr_eq(&first, &again));
        assert_eq!(*first, *again);
    }

    #[test]
    fn test_sweep_removes_expired() {
        let mut cache = cache(8, 10);
        let start = Instant::now();
        cache.get_or_generate_at("Trap", &GenerateOverrides::with_seed(1), start);
        cache.get_or_generate_at("Trap", &GenerateOverrides::with_seed(2), start);

        assert_eq!(cache.sweep_at(start + Duration::from_secs(5)), 0);
        assert_eq!(cache.sweep_at(start + Duration::from_secs(11)), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cache = cache(8, 10);
        cache.get_or_generate("Ambient", &GenerateOverrides::with_seed(1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
