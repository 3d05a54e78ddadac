//! # loyalty-card
//!
//! Client for the cafe loyalty-card app: sign in, show the member QR code and
//! reward progress, manage the account. Built on the `shell` crate's state
//! store, event bus, and hash router.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`app`] | Route table, auth wiring, bus/store bridges |
//! | [`actions`] | Account operations invoked by screens |
//! | [`screen`] | Screen identifiers and the render/teardown contract |
//! | [`services`] | Auth provider and document store boundary, in-memory backends |
//! | [`rewards`] | Points cards, reward detection, shown-reward ledger |
//! | [`error`] | Provider error codes to user-facing messages |
//! | [`i18n`] | Message catalogs and lookup |
//! | [`validation`] | Input sanitizing, email/password checks, rate limiting |
//! | [`config`] | Backend and preference configuration |
//! | [`clock`] | Wall-clock milliseconds |

pub mod actions;
pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod i18n;
pub mod rewards;
pub mod screen;
pub mod services;
pub mod validation;

pub use actions::{AccountActions, ActionError};
pub use app::{App, Notifier};
pub use config::{AppConfig, ConfigError};
pub use screen::{Screen, ScreenContext, ScreenHost, ScreenRenderer, Teardown};

/// Route `log` output to the browser console and surface panics there.
/// Call once at startup.
#[cfg(feature = "hydrate")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        log::warn!("console logger not installed: {err}");
    }
}
