//! Process-lifetime key-value store. Nothing here is written to disk.

use std::collections::HashMap;

pub const PLAYER_NAME_KEY: &str = "playerName";
pub const CHARACTER_KEY: &str = "characterSlug";

pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(PLAYER_NAME_KEY), None);
        store.set(PLAYER_NAME_KEY, "Ann".into());
        store.set(PLAYER_NAME_KEY, "Bea".into());
        assert_eq!(store.get(PLAYER_NAME_KEY).as_deref(), Some("Bea"));
        assert_eq!(store.remove(PLAYER_NAME_KEY).as_deref(), Some("Bea"));
        assert_eq!(store.get(PLAYER_NAME_KEY), None);
    }
}
