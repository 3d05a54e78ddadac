//! Named-event publish/subscribe hub.
//!
//! DESIGN
//! ======
//! Listeners are registered per event name and run synchronously, in
//! subscription order, on the emitting call stack. A listener returning `Err`
//! is logged and does not stop the others. `once` listeners are removed
//! before they run, so an emit from inside one cannot fire it again.
//!
//! The bus is generic over the payload type `P`; the application bus carries
//! `serde_json::Value`, mirroring the loosely-typed payloads of its events.

#[cfg(test)]
#[path = "event_bus_test.rs"]
mod event_bus_test;

use std::rc::Rc;

use crate::listeners::{ListenerId, ListenerOutcome, Registry, Subscription};

type EventListener<P> = dyn Fn(&P) -> Result<(), String>;

/// Shared handle to one bus. Clones refer to the same listener table.
pub struct EventBus<P> {
    listeners: Rc<Registry<String, EventListener<P>>>,
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        Self { listeners: Rc::clone(&self.listeners) }
    }
}

impl<P: 'static> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static> EventBus<P> {
    #[must_use]
    pub fn new() -> Self {
        Self { listeners: Rc::new(Registry::new()) }
    }

    /// Subscribe to `event`. Subscribing the same closure twice registers it
    /// twice.
    pub fn on<F, R>(&self, event: &str, callback: F) -> Subscription
    where
        F: Fn(&P) -> R + 'static,
        R: ListenerOutcome,
    {
        self.listeners.insert(event.to_owned(), wrap(callback), false)
    }

    /// Subscribe for the next emission of `event` only.
    pub fn once<F, R>(&self, event: &str, callback: F) -> Subscription
    where
        F: Fn(&P) -> R + 'static,
        R: ListenerOutcome,
    {
        self.listeners.insert(event.to_owned(), wrap(callback), true)
    }

    /// Remove one registration. Returns whether it was still registered.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        self.listeners.remove(event, id)
    }

    /// Deliver `payload` to every listener of `event`. Emitting an event
    /// nobody listens to is a no-op.
    pub fn emit(&self, event: &str, payload: &P) {
        self.listeners.dispatch(
            event,
            |listener| listener(payload),
            |err| log::error!("listener for {event} failed: {err}"),
        );
    }

    /// Drop the listeners of one event, or of every event when `None`.
    pub fn clear(&self, event: Option<&str>) {
        match event {
            Some(event) => self.listeners.clear(event),
            None => self.listeners.clear_all(),
        }
    }

    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.len(event)
    }
}

fn wrap<P, F, R>(callback: F) -> Rc<EventListener<P>>
where
    P: 'static,
    F: Fn(&P) -> R + 'static,
    R: ListenerOutcome,
{
    Rc::new(move |payload: &P| callback(payload).into_outcome())
}
