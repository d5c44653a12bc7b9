//! Caching layer for claimcheck-runtime.
//!
//! Keeps support scores for `(claim, contexts)` pairs so repeated
//! validations of the same text skip the remote call.

use moka::future::Cache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use claimcheck_core::{Contexts, SupportScore};

use crate::config::CacheConfig;

/// Cache key for a single scoring call.
///
/// Thresholds apply after lookup and are not part of the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScoreKey {
    claim: String,
    context_hash: u64,
}

impl ScoreKey {
    pub fn new(claim: &str, contexts: &Contexts) -> Self {
        Self {
            claim: claim.to_string(),
            context_hash: hash_contexts(contexts),
        }
    }
}

/// Score cache using moka.
pub struct ScoreCache {
    cache: Cache<ScoreKey, SupportScore>,
}

impl ScoreCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl)
    }

    pub async fn get(&self, key: &ScoreKey) -> Option<SupportScore> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: ScoreKey, score: SupportScore) {
        self.cache.insert(key, score).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl std::fmt::Debug for ScoreCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreCache").finish_non_exhaustive()
    }
}

fn hash_contexts(contexts: &Contexts) -> u64 {
    let mut hasher = DefaultHasher::new();
    contexts.len().hash(&mut hasher);
    for item in contexts.iter() {
        item.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contexts(items: &[&str]) -> Contexts {
        Contexts::new(items.iter().copied()).unwrap()
    }

    #[tokio::test]
    async fn test_cache_operations() {
        let cache = ScoreCache::default();
        let key = ScoreKey::new("Alex likes dogs.", &contexts(&["Alex likes dogs, but not cats."]));

        assert!(cache.get(&key).await.is_none());

        cache
            .insert(key.clone(), SupportScore::Probability(0.93))
            .await;

        assert_eq!(cache.get(&key).await, Some(SupportScore::Probability(0.93)));

        cache.invalidate_all();
        assert!(cache.get(&key).await.is_none());
    }

    #[test]
    fn test_key_depends_on_claim_and_contexts() {
        let base = ScoreKey::new("claim", &contexts(&["a", "b"]));

        assert_eq!(base, ScoreKey::new("claim", &contexts(&["a", "b"])));
        assert_ne!(base, ScoreKey::new("other claim", &contexts(&["a", "b"])));
        assert_ne!(base, ScoreKey::new("claim", &contexts(&["b", "a"])));
        assert_ne!(
            ScoreKey::new("claim", &contexts(&["ab", "c"])),
            ScoreKey::new("claim", &contexts(&["a", "bc"]))
        );
    }
}
