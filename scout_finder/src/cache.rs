use std::collections::HashMap;

use scout_util::handle_key;

/// Remembers whether an account posted within the recency window, so a handle is
/// looked up at most once per process. Entries are never evicted.
#[derive(Debug, Clone, Default)]
pub struct RecencyCache {
    /// lower-cased handle -> tweeted recently
    entries: HashMap<String, bool>,
}

impl RecencyCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, handle: &str) -> Option<bool> {
        self.entries.get(&handle_key(handle)).copied()
    }

    pub fn insert(&mut self, handle: &str, tweeted_recently: bool) {
        self.entries.insert(handle_key(handle), tweeted_recently);
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

    #[test]
    fn keys_ignore_case() {
        let mut cache = RecencyCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.get("Carol"), None);
        cache.insert("Carol", true);
        cache.insert("DAVE", false);
        assert_eq!(cache.get("carol"), Some(true));
        assert_eq!(cache.get("dave"), Some(false));
        assert_eq!(cache.len(), 2);
    }
}
