use crate::domain::errors::StoreError;

/// A flat string key-value namespace, the shape of browser local storage.
///
/// Callers receive the store explicitly instead of reaching for a global so
/// tests can substitute an in-memory implementation.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}
