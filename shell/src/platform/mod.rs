//! Host environment abstractions: durable storage, document root, location.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store and router only talk to the browser through these traits. Under
//! the `hydrate` feature the `Browser*`/`LocalStorage` types bind to
//! `web-sys`; the `Memory*` types back native builds and tests.

pub mod document;
pub mod location;
pub mod storage;

use std::rc::Rc;

pub use document::{DocumentRoot, MemoryDocument};
pub use location::{HashLocation, MemoryLocation};
pub use storage::{KeyValueStorage, MemoryStorage};

#[cfg(feature = "hydrate")]
pub use document::BrowserDocument;
#[cfg(feature = "hydrate")]
pub use location::BrowserLocation;
#[cfg(feature = "hydrate")]
pub use storage::LocalStorage;

/// The three host capabilities the shell consumes.
#[derive(Clone)]
pub struct Platform {
    pub storage: Rc<dyn KeyValueStorage>,
    pub document: Rc<dyn DocumentRoot>,
    pub location: Rc<dyn HashLocation>,
}

impl Platform {
    /// Bind to `window.localStorage`, the `<html>` element, and `window.location`.
    #[cfg(feature = "hydrate")]
    #[must_use]
    pub fn browser() -> Self {
        Self {
            storage: Rc::new(LocalStorage),
            document: Rc::new(BrowserDocument),
            location: Rc::new(BrowserLocation),
        }
    }
}

/// In-memory platform that keeps concrete handles for inspection.
#[derive(Clone, Default)]
pub struct MemoryPlatform {
    pub storage: Rc<MemoryStorage>,
    pub document: Rc<MemoryDocument>,
    pub location: Rc<MemoryLocation>,
}

impl MemoryPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Type-erased view over the same handles.
    #[must_use]
    pub fn platform(&self) -> Platform {
        Platform {
            storage: self.storage.clone(),
            document: self.document.clone(),
            location: self.location.clone(),
        }
    }
}
