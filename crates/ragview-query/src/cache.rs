//! Per-session memoization.
//!
//! Entries are written once per key and read afterwards. The whole cache is
//! dropped whenever explorer settings change, so a stale answer never outlives
//! the configuration that produced it.

use moka::sync::Cache;
use std::hash::Hash;
use tracing::debug;

use crate::engine::{QueryEngine, QueryRequest, QueryResponse};

const DEFAULT_CAPACITY: u64 = 256;

#[derive(Clone)]
pub struct SessionCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    name: &'static str,
    inner: Cache<K, V>,
}

impl<K, V> SessionCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self { name, inner: Cache::new(DEFAULT_CAPACITY) }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Forget one key.
    pub fn remove(&self, key: &K) {
        self.inner.invalidate(key);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        debug!(cache = self.name, "Clearing session cache");
        self.inner.invalidate_all();
    }
}

/// Query engine fronted by a session cache.
///
/// Only successful answers are memoized so a failing engine is retried on
/// the next submit.
#[derive(Clone)]
pub struct QueryExecutor {
    engine: QueryEngine,
    cache: SessionCache<QueryRequest, QueryResponse>,
}

impl QueryExecutor {
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine, cache: SessionCache::new("query") }
    }

    /// Returns the response and whether it came from the cache.
    pub async fn execute(&self, req: &QueryRequest) -> (QueryResponse, bool) {
        if let Some(hit) = self.cache.get(req) {
            debug!("Serving {} search from session cache", req.method);
            return (hit, true);
        }
        let resp = self.engine.run(req).await;
        if !resp.is_error() {
            self.cache.insert(req.clone(), resp.clone());
        }
        (resp, false)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SearchMethod;
    use std::path::PathBuf;

    fn request(text: &str, level: u8) -> QueryRequest {
        QueryRequest {
            query_text: text.to_string(),
            method: SearchMethod::Global,
            root_dir: PathBuf::from("./ragtest"),
            community_level: level,
            response_type: "List of 3-7 Points".to_string(),
        }
    }

    #[test]
    fn test_session_cache_clear() {
        let cache: SessionCache<String, u32> = SessionCache::new("test");
        cache.insert("a".into(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        cache.clear();
        assert!(cache.get(&"a".to_string()).is_none());
    }

    #[test]
    fn test_session_cache_remove_single_key() {
        let cache: SessionCache<String, u32> = SessionCache::new("test");
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.remove(&"a".to_string());
        assert!(cache.get(&"a".to_string()).is_none());
        assert_eq!(cache.get(&"b".to_string()), Some(2));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_identical_requests_served_from_cache() {
        // each engine run appends a line and prints the running count
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("calls");
        let script = format!("echo x >> '{0}'; wc -l < '{0}'", counter.display());
        let engine = QueryEngine::new("sh", vec!["-c".into(), script, "graphrag".into()]);
        let executor = QueryExecutor::new(engine);

        let (first, cached) = executor.execute(&request("q", 2)).await;
        assert!(!cached);
        let (second, cached) = executor.execute(&request("q", 2)).await;
        assert!(cached);
        assert_eq!(first, second);

        // different community level is a different key
        let (third, cached) = executor.execute(&request("q", 3)).await;
        assert!(!cached);
        assert_ne!(first, third);

        executor.clear();
        let (_, cached) = executor.execute(&request("q", 2)).await;
        assert!(!cached);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_errors_not_cached() {
        let engine = QueryEngine::new("sh", vec!["-c".into(), "exit 1".into(), "graphrag".into()]);
        let executor = QueryExecutor::new(engine);
        let (resp, _) = executor.execute(&request("q", 2)).await;
        assert!(resp.is_error());
        let (_, cached) = executor.execute(&request("q", 2)).await;
        assert!(!cached);
    }
}
