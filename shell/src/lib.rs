//! Reactive application shell for the loyalty-card client.
//!
//! This crate owns the three pieces of client state machinery every screen
//! leans on: a keyed state store with change notification, a named-event bus,
//! and a hash-fragment router with authentication guards. Everything runs on a
//! single thread; handles are cheap `Rc` clones that share one instance.
//!
//! Browser bindings live behind the `hydrate` feature. Without it the
//! in-memory platform is used, which is what the tests run against.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Application state with per-key and wildcard listeners |
//! | [`event_bus`] | Named-event publish/subscribe hub |
//! | [`events`] | Catalog of well-known event names |
//! | [`router`] | Hash router, route guards, redirect handling |
//! | [`listeners`] | Listener registry and [`Subscription`] handles |
//! | [`platform`] | Storage, document root, and location abstractions |
//! | [`error`] | Router configuration errors |

pub mod error;
pub mod event_bus;
pub mod events;
pub mod listeners;
pub mod platform;
pub mod router;
pub mod store;

pub use error::RouteError;
pub use event_bus::EventBus;
pub use listeners::{ListenerId, ListenerOutcome, Subscription};
pub use router::{Navigator, RouteConfig, Router, SessionView};
pub use store::{AppState, StateKey, StateStore, StateValue, StoreOptions, Theme};
