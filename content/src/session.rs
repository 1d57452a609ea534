use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::MutexGuard;

const DEFAULT_CAPACITY: usize = 128;

/// In-memory tier that lives as long as the process. Holds bodies the
/// persistent cache could not keep.
pub struct SessionCache {
    memory: Mutex<LruCache<String, String>>,
}

impl SessionCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            memory: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.lock().get(path).cloned()
    }

    pub fn put(&self, path: &str, body: String) {
        self.lock().put(path.to_string(), body);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, String>> {
        match self.memory.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_most_recent_bodies() {
        let session = SessionCache::new(2);
        session.put("a", "A".to_string());
        session.put("b", "B".to_string());
        assert_eq!(session.get("a").as_deref(), Some("A"));
        session.put("c", "C".to_string());
        assert_eq!(session.get("b"), None);
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn zero_capacity_falls_back_to_default() {
        let session = SessionCache::new(0);
        session.put("a", "A".to_string());
        assert_eq!(session.get("a").as_deref(), Some("A"));
    }
}
