pub mod locks;
pub mod memory;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

pub use locks::KeyedLocks;
pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Drivers,
    Orders,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Drivers => "drivers",
            Collection::Orders => "orders",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-addressed document storage. Implementations own durability and must
/// give read-your-writes consistency per key.
pub trait DocumentStore: Send + Sync {
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, AppError>;
    fn put(&self, collection: Collection, key: &str, doc: Value) -> Result<(), AppError>;
    fn delete(&self, collection: Collection, key: &str) -> Result<(), AppError>;
    fn list(&self, collection: Collection) -> Result<Vec<Value>, AppError>;
}

pub struct Documents<T> {
    store: Arc<dyn DocumentStore>,
    collection: Collection,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Documents<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            collection: self.collection,
            _marker: PhantomData,
        }
    }
}

impl<T> Documents<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn DocumentStore>, collection: Collection) -> Self {
        Self {
            store,
            collection,
            _marker: PhantomData,
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<T>, AppError> {
        self.store
            .get(self.collection, key)?
            .map(|doc| self.decode(doc))
            .transpose()
    }

    pub fn put(&self, key: &str, value: &T) -> Result<(), AppError> {
        let doc = serde_json::to_value(value).map_err(|err| {
            AppError::Storage(format!("failed to encode {} {key}: {err}", self.collection))
        })?;
        self.store.put(self.collection, key, doc)
    }

    pub fn list(&self) -> Result<Vec<T>, AppError> {
        self.store
            .list(self.collection)?
            .into_iter()
            .map(|doc| self.decode(doc))
            .collect()
    }

    fn decode(&self, doc: Value) -> Result<T, AppError> {
        serde_json::from_value(doc).map_err(|err| {
            AppError::Storage(format!("corrupt document in {}: {err}", self.collection))
        })
    }
}
