use dashmap::DashMap;
use serde_json::Value;

use crate::error::AppError;
use crate::store::{Collection, DocumentStore};

#[derive(Default)]
pub struct MemoryStore {
    docs: DashMap<(Collection, String), Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.docs
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .count()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, AppError> {
        Ok(self
            .docs
            .get(&(collection, key.to_string()))
            .map(|entry| entry.value().clone()))
    }

    fn put(&self, collection: Collection, key: &str, doc: Value) -> Result<(), AppError> {
        self.docs.insert((collection, key.to_string()), doc);
        Ok(())
    }

    fn delete(&self, collection: Collection, key: &str) -> Result<(), AppError> {
        self.docs.remove(&(collection, key.to_string()));
        Ok(())
    }

    fn list(&self, collection: Collection) -> Result<Vec<Value>, AppError> {
        Ok(self
            .docs
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::MemoryStore;
    use crate::store::{Collection, DocumentStore};

    #[test]
    fn collections_are_isolated() {
        let store = MemoryStore::new();
        store
            .put(Collection::Drivers, "k", json!({"kind": "driver"}))
            .unwrap();
        store
            .put(Collection::Orders, "k", json!({"kind": "order"}))
            .unwrap();

        assert_eq!(
            store.get(Collection::Drivers, "k").unwrap().unwrap()["kind"],
            "driver"
        );
        assert_eq!(store.list(Collection::Orders).unwrap().len(), 1);
        assert_eq!(store.len(Collection::Drivers), 1);
    }

    #[test]
    fn put_overwrites_and_delete_removes() {
        let store = MemoryStore::new();
        store.put(Collection::Orders, "a", json!(1)).unwrap();
        store.put(Collection::Orders, "a", json!(2)).unwrap();
        assert_eq!(store.get(Collection::Orders, "a").unwrap(), Some(json!(2)));

        store.delete(Collection::Orders, "a").unwrap();
        assert_eq!(store.get(Collection::Orders, "a").unwrap(), None);
        store.delete(Collection::Orders, "a").unwrap();
    }
}
