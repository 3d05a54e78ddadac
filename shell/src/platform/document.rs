//! Attributes on the document root (`<html>`), e.g. `data-theme` and `lang`.

use std::cell::RefCell;
use std::collections::HashMap;

/// Presentation attributes on the root element.
pub trait DocumentRoot {
    fn set_attribute(&self, name: &str, value: &str);
}

/// Records attributes instead of touching a DOM.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    attributes: RefCell<HashMap<String, String>>,
}

impl MemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }
}

impl DocumentRoot for MemoryDocument {
    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes.borrow_mut().insert(name.to_owned(), value.to_owned());
    }
}

/// The live `<html>` element.
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDocument;

#[cfg(feature = "hydrate")]
impl DocumentRoot for BrowserDocument {
    fn set_attribute(&self, name: &str, value: &str) {
        let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|doc| doc.document_element())
        else {
            return;
        };
        if let Err(err) = el.set_attribute(name, value) {
            log::warn!("setting <html {name}> failed: {err:?}");
        }
    }
}
