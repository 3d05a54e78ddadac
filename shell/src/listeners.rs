//! Listener registry shared by the state store and the event bus.
//!
//! DESIGN
//! ======
//! Listeners are kept per key in insertion order, each under its own
//! [`ListenerId`], so registering the same closure twice yields two entries
//! and removal always targets exactly one of them.
//!
//! Dispatch works on a snapshot of the key's entries and releases the registry
//! borrow before invoking anything. Callbacks may therefore subscribe,
//! unsubscribe, or dispatch again. An entry removed mid-dispatch is skipped
//! for the rest of that dispatch; a one-shot entry is removed before it runs.

#[cfg(test)]
#[path = "listeners_test.rs"]
mod listeners_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// Identifies one registration in a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Result type a listener may return.
///
/// Closures returning `()` always succeed. Closures returning
/// `Result<(), E>` report `Err` as a listener failure, which the dispatcher
/// logs and swallows.
pub trait ListenerOutcome {
    /// Convert into the dispatcher's failure representation.
    ///
    /// # Errors
    ///
    /// Returns the rendered error when the listener failed.
    fn into_outcome(self) -> Result<(), String>;
}

impl ListenerOutcome for () {
    fn into_outcome(self) -> Result<(), String> {
        Ok(())
    }
}

impl<E: fmt::Display> ListenerOutcome for Result<(), E> {
    fn into_outcome(self) -> Result<(), String> {
        self.map_err(|e| e.to_string())
    }
}

/// Handle returned by every subscribe-style call.
///
/// `unsubscribe` is safe to call any number of times; only the first call has
/// an effect. Dropping the handle does not unsubscribe.
pub struct Subscription {
    id: Option<ListenerId>,
    cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    /// Wrap an arbitrary cancellation closure.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self { id: None, cancel: RefCell::new(Some(Box::new(cancel))) }
    }

    /// A handle with nothing to cancel.
    #[must_use]
    pub fn inert() -> Self {
        Self { id: None, cancel: RefCell::new(None) }
    }

    fn for_listener(id: ListenerId, cancel: impl FnOnce() + 'static) -> Self {
        Self { id: Some(id), cancel: RefCell::new(Some(Box::new(cancel))) }
    }

    /// The registry id behind this handle, when it came from a registry.
    #[must_use]
    pub fn listener_id(&self) -> Option<ListenerId> {
        self.id
    }

    /// Whether `unsubscribe` has not run yet.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.borrow().is_some()
    }

    /// Remove the registration. Subsequent calls do nothing.
    pub fn unsubscribe(&self) {
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

struct Entry<F: ?Sized> {
    id: ListenerId,
    once: bool,
    callback: Rc<F>,
}

struct Slots<K, F: ?Sized> {
    next_id: u64,
    by_key: HashMap<K, Vec<Entry<F>>>,
}

/// Insertion-ordered listener lists keyed by `K`.
pub(crate) struct Registry<K, F: ?Sized> {
    slots: Rc<RefCell<Slots<K, F>>>,
}

impl<K, F> Registry<K, F>
where
    K: Eq + Hash + Clone + 'static,
    F: ?Sized + 'static,
{
    pub(crate) fn new() -> Self {
        Self { slots: Rc::new(RefCell::new(Slots { next_id: 0, by_key: HashMap::new() })) }
    }

    /// Register `callback` under `key`.
    pub(crate) fn insert(&self, key: K, callback: Rc<F>, once: bool) -> Subscription {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = ListenerId(slots.next_id);
            slots.next_id += 1;
            slots.by_key.entry(key.clone()).or_default().push(Entry { id, once, callback });
            id
        };

        let weak = Rc::downgrade(&self.slots);
        Subscription::for_listener(id, move || {
            if let Some(slots) = weak.upgrade() {
                remove_entry(&slots, &key, id);
            }
        })
    }

    /// Remove one registration. Returns whether it was still present.
    pub(crate) fn remove<Q>(&self, key: &Q, id: ListenerId) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        remove_entry(&self.slots, key, id)
    }

    pub(crate) fn contains<Q>(&self, key: &Q, id: ListenerId) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.slots
            .borrow()
            .by_key
            .get(key)
            .is_some_and(|entries| entries.iter().any(|e| e.id == id))
    }

    pub(crate) fn len<Q>(&self, key: &Q) -> usize
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.slots.borrow().by_key.get(key).map_or(0, Vec::len)
    }

    pub(crate) fn clear<Q>(&self, key: &Q)
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.slots.borrow_mut().by_key.remove(key);
    }

    pub(crate) fn clear_all(&self) {
        self.slots.borrow_mut().by_key.clear();
    }

    /// Invoke every listener registered under `key`, in subscription order.
    ///
    /// `call` adapts the stored callback to the dispatch arguments. Failures
    /// are handed to `on_failure` and never stop the remaining listeners.
    pub(crate) fn dispatch<Q>(
        &self,
        key: &Q,
        mut call: impl FnMut(&F) -> Result<(), String>,
        mut on_failure: impl FnMut(String),
    ) where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let snapshot: Vec<(ListenerId, bool, Rc<F>)> = match self.slots.borrow().by_key.get(key) {
            Some(entries) => entries.iter().map(|e| (e.id, e.once, Rc::clone(&e.callback))).collect(),
            None => return,
        };

        for (id, once, callback) in snapshot {
            let live = if once { self.remove(key, id) } else { self.contains(key, id) };
            if !live {
                continue;
            }
            if let Err(err) = call(&callback) {
                on_failure(err);
            }
        }
    }
}

fn remove_entry<K, Q, F>(slots: &RefCell<Slots<K, F>>, key: &Q, id: ListenerId) -> bool
where
    K: Eq + Hash + std::borrow::Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    F: ?Sized,
{
    let mut slots = slots.borrow_mut();
    let Some(entries) = slots.by_key.get_mut(key) else {
        return false;
    };
    let Some(pos) = entries.iter().position(|e| e.id == id) else {
        return false;
    };
    entries.remove(pos);
    if entries.is_empty() {
        slots.by_key.remove(key);
    }
    true
}
