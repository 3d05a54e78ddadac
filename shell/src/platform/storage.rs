//! Durable key-value storage used for theme/language preferences and
//! per-user client records.
//!
//! Browser writes are best-effort: a failing `localStorage` (quota, private
//! mode) is logged and otherwise ignored, matching how preferences degrade.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Simple string key-value store.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// Process-local storage. Counts writes so tests can observe persistence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated storage, as if a previous session had written it.
    #[must_use]
    pub fn with_items<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let storage = Self::new();
        storage
            .items
            .borrow_mut()
            .extend(items.into_iter().map(|(k, v)| (k.to_owned(), v.to_owned())));
        storage
    }

    /// Number of `set_item` calls since construction.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.writes.set(self.writes.get() + 1);
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// `window.localStorage`.
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(feature = "hydrate")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        match web_sys::window()?.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                log::warn!("localStorage unavailable: {err:?}");
                None
            }
        }
    }
}

#[cfg(feature = "hydrate")]
impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        match Self::storage()?.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("localStorage read of {key:?} failed: {err:?}");
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) {
        let Some(storage) = Self::storage() else {
            return;
        };
        if let Err(err) = storage.set_item(key, value) {
            log::warn!("localStorage write of {key:?} failed: {err:?}");
        }
    }

    fn remove_item(&self, key: &str) {
        let Some(storage) = Self::storage() else {
            return;
        };
        if let Err(err) = storage.remove_item(key) {
            log::warn!("localStorage remove of {key:?} failed: {err:?}");
        }
    }
}
