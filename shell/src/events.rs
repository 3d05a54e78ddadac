//! Well-known event names, grouped by the part of the app that emits them.
//!
//! Names are `domain:action` strings. They are plain `&str` constants so
//! feature code can still emit ad-hoc events on the same bus.

/// Session lifecycle.
pub mod auth {
    pub const LOGIN: &str = "auth:login";
    pub const LOGOUT: &str = "auth:logout";
    pub const ERROR: &str = "auth:error";
}

/// Toasts, the error banner, and the loading overlay.
pub mod ui {
    pub const TOAST_SHOW: &str = "ui:toast";
    pub const ERROR_SHOW: &str = "ui:error";
    pub const ERROR_HIDE: &str = "ui:error:hide";
    pub const LOADING_START: &str = "ui:loading:start";
    pub const LOADING_END: &str = "ui:loading:end";
}

pub mod nav {
    pub const NAVIGATE: &str = "nav:navigate";
    pub const ROUTE_CHANGED: &str = "nav:changed";
}

/// Profile and preference changes.
pub mod user {
    pub const UPDATED: &str = "user:updated";
    pub const LANGUAGE_CHANGED: &str = "user:language";
    pub const THEME_CHANGED: &str = "user:theme";
}
