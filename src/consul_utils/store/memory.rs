use super::{KvStore, StoreFactory};
use crate::config::Settings;
use crate::error::Result;
use crate::model::Record;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// In-memory storage for testing and development.
/// Does NOT persist data. Keys are kept sorted, as Consul returns them.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    entries: Rc<RefCell<BTreeMap<String, Option<String>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key with no value, like a directory marker created by the UI.
    pub fn put_empty(&mut self, key: &str) {
        self.entries.borrow_mut().insert(key.to_string(), None);
    }

    pub fn get(&self, key: &str) -> Option<Option<String>> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KvStore for InMemoryStore {
    fn fetch(&self, root: &str) -> Result<Option<Vec<Record>>> {
        let records: Vec<Record> = self
            .entries
            .borrow()
            .range(root.to_string()..)
            .take_while(|(key, _)| key.starts_with(root))
            .map(|(key, value)| Record::new(key.as_str(), value.as_deref()))
            .collect();
        Ok((!records.is_empty()).then_some(records))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), Some(value.to_string()));
        Ok(())
    }

    fn delete(&mut self, key: &str, recurse: bool) -> Result<()> {
        let mut entries = self.entries.borrow_mut();
        if recurse {
            entries.retain(|k, _| !k.starts_with(key));
        } else {
            entries.remove(key);
        }
        Ok(())
    }

    fn clear_cache(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Every side of a command sees the same map.
impl StoreFactory for InMemoryStore {
    type Store = InMemoryStore;

    fn open(&self, _settings: &Settings) -> Result<Self::Store> {
        Ok(self.clone())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        /// `value: None` creates a valueless key.
        pub fn with_entries(mut self, entries: &[(&str, Option<&str>)]) -> Self {
            for (key, value) in entries {
                match value {
                    Some(v) => self.store.write(key, v).unwrap(),
                    None => self.store.put_empty(key),
                }
            }
            self
        }

        /// `count` leaf keys `{root}/key{i}` plus the `{root}/` directory marker.
        pub fn with_tree(mut self, root: &str, count: usize) -> Self {
            self.store.put_empty(&format!("{root}/"));
            for i in 0..count {
                self.store
                    .write(&format!("{root}/key{i}"), &format!("value{i}"))
                    .unwrap();
            }
            self
        }
    }
}
