//! The browser's fragment identifier (`location.hash`) and its change stream.
//!
//! Writing the fragment does not notify synchronously: the browser queues a
//! `hashchange` event and delivers it from the event loop, and only when the
//! value actually changed. [`MemoryLocation`] reproduces that by queueing
//! notifications until [`MemoryLocation::flush`] runs them.

#[cfg(test)]
#[path = "location_test.rs"]
mod location_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::listeners::{Registry, Subscription};

/// Upper bound on notifications delivered by one [`MemoryLocation::flush`].
const MAX_FLUSH: usize = 256;

/// A mutable fragment identifier with change notification.
pub trait HashLocation {
    /// Current fragment including the leading `#`, or empty.
    fn hash(&self) -> String;
    /// Replace the fragment. Change listeners run later, and only if it changed.
    fn set_hash(&self, hash: &str);
    /// Observe fragment changes.
    fn on_change(&self, callback: Rc<dyn Fn()>) -> Subscription;
}

fn normalize(hash: &str) -> String {
    match hash {
        "" | "#" => String::new(),
        h if h.starts_with('#') => h.to_owned(),
        h => format!("#{h}"),
    }
}

/// In-memory location with an explicit event loop.
pub struct MemoryLocation {
    hash: RefCell<String>,
    pending: Cell<usize>,
    listeners: Registry<(), dyn Fn()>,
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self { hash: RefCell::new(String::new()), pending: Cell::new(0), listeners: Registry::new() }
    }
}

impl MemoryLocation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Location that starts at `hash` without a pending notification,
    /// like a page loaded with that URL.
    #[must_use]
    pub fn starting_at(hash: &str) -> Self {
        let location = Self::new();
        *location.hash.borrow_mut() = normalize(hash);
        location
    }

    /// Notifications queued but not yet delivered.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Deliver queued notifications, including any queued while delivering.
    /// Returns how many were delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        while self.pending.get() > 0 {
            if delivered == MAX_FLUSH {
                log::error!("location flush stopped after {MAX_FLUSH} notifications");
                self.pending.set(0);
                break;
            }
            self.pending.set(self.pending.get() - 1);
            delivered += 1;
            self.listeners.dispatch(
                &(),
                |listener| {
                    listener();
                    Ok(())
                },
                |err| log::error!("hash change listener failed: {err}"),
            );
        }
        delivered
    }
}

impl HashLocation for MemoryLocation {
    fn hash(&self) -> String {
        self.hash.borrow().clone()
    }

    fn set_hash(&self, hash: &str) {
        let next = normalize(hash);
        if *self.hash.borrow() == next {
            return;
        }
        *self.hash.borrow_mut() = next;
        self.pending.set(self.pending.get() + 1);
    }

    fn on_change(&self, callback: Rc<dyn Fn()>) -> Subscription {
        self.listeners.insert((), callback, false)
    }
}

/// `window.location`.
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserLocation;

#[cfg(feature = "hydrate")]
impl HashLocation for BrowserLocation {
    fn hash(&self) -> String {
        let Some(window) = web_sys::window() else {
            return String::new();
        };
        match window.location().hash() {
            Ok(hash) => hash,
            Err(err) => {
                log::warn!("reading location.hash failed: {err:?}");
                String::new()
            }
        }
    }

    fn set_hash(&self, hash: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.location().set_hash(hash) {
            log::warn!("writing location.hash failed: {err:?}");
        }
    }

    fn on_change(&self, callback: Rc<dyn Fn()>) -> Subscription {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::closure::Closure;

        let Some(window) = web_sys::window() else {
            return Subscription::inert();
        };
        let closure = Closure::<dyn Fn()>::new(move || callback());
        if let Err(err) = window.add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref()) {
            log::warn!("hashchange listener not installed: {err:?}");
            return Subscription::inert();
        }
        Subscription::new(move || {
            if let Err(err) =
                window.remove_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref())
            {
                log::warn!("hashchange listener not removed: {err:?}");
            }
        })
    }
}
