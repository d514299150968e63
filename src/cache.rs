//! Per-scheme component model cache.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::model::ComponentModel;

/// Ready models keyed by scheme, with single-flight builds.
///
/// Lookups of built models go through the sharded map without locking. A
/// miss takes a per-scheme build lock so concurrent first requests for the
/// same scheme build the model once. Failed builds are not cached. Entries
/// live as long as the cache.
#[derive(Debug, Default)]
pub struct ModelCache {
    models: DashMap<String, Arc<ComponentModel>>,
    build_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, scheme: &str) -> Option<Arc<ComponentModel>> {
        self.models.get(scheme).map(|entry| Arc::clone(entry.value()))
    }

    /// Return the cached model, or build and cache it.
    ///
    /// `build` runs at most once per scheme among concurrent callers; `Ok(None)`
    /// (no such component) and errors are passed through without caching.
    ///
    /// # Errors
    ///
    /// Returns whatever `build` returns.
    pub fn get_or_try_build<E, F>(
        &self,
        scheme: &str,
        build: F,
    ) -> Result<Option<Arc<ComponentModel>>, E>
    where
        F: FnOnce() -> Result<Option<ComponentModel>, E>,
    {
        if let Some(model) = self.get(scheme) {
            tracing::trace!(scheme, "component model cache hit");
            return Ok(Some(model));
        }

        // clone the Arc so the shard guard is released before blocking
        let lock = Arc::clone(
            self.build_locks
                .entry(scheme.to_string())
                .or_default()
                .value(),
        );
        let _guard = lock.lock();

        // another caller may have finished the build while we waited
        if let Some(model) = self.get(scheme) {
            tracing::trace!(scheme, "component model built concurrently");
            return Ok(Some(model));
        }

        tracing::debug!(scheme, "building component model");
        let Some(model) = build()? else {
            return Ok(None);
        };
        let model = Arc::new(model);
        self.models.insert(scheme.to_string(), Arc::clone(&model));
        Ok(Some(model))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::SchemaDocument;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn timer() -> ComponentModel {
        let doc = SchemaDocument::parse(r#"{"component": {"syntax": "timer:timerName"}}"#).unwrap();
        ComponentModel::from_document("timer", &doc).unwrap()
    }

    #[test]
    fn builds_once_then_hits() {
        let cache = ModelCache::new();
        let builds = AtomicUsize::new(0);
        for _ in 0..3 {
            let model = cache
                .get_or_try_build::<(), _>("timer", || {
                    builds.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(timer()))
                })
                .unwrap()
                .unwrap();
            assert_eq!(model.scheme, "timer");
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_and_misses_are_not_cached() {
        let cache = ModelCache::new();
        let err = cache.get_or_try_build("timer", || Err::<Option<ComponentModel>, _>("boom"));
        assert_eq!(err.unwrap_err(), "boom");
        let none = cache.get_or_try_build::<(), _>("timer", || Ok(None)).unwrap();
        assert!(none.is_none());
        assert!(cache.is_empty());

        let model = cache.get_or_try_build::<(), _>("timer", || Ok(Some(timer()))).unwrap();
        assert!(model.is_some());
    }

    #[test]
    fn concurrent_first_requests_build_once() {
        let cache = Arc::new(ModelCache::new());
        let builds = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let builds = Arc::clone(&builds);
                std::thread::spawn(move || {
                    cache
                        .get_or_try_build::<(), _>("timer", || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            Ok(Some(timer()))
                        })
                        .unwrap()
                        .unwrap()
                })
            })
            .collect();

        let models: Vec<Arc<ComponentModel>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(models.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
