//! Router configuration errors.
//!
//! Guard rejections and unknown paths are not errors: the router handles them
//! by redirecting. Only misconfiguration surfaces here.

/// Error returned by [`crate::Router::define`] or reported by a resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A route was registered with an empty path.
    #[error("route path must not be empty")]
    EmptyPath,
    /// A route was marked both auth-only and guest-only.
    #[error("route {path:?} cannot require authentication and be guest-only")]
    ConflictingGuards { path: String },
    /// Guard redirects came back to a path already visited in the same chain.
    #[error("redirect loop: {}", chain.join(" -> "))]
    RedirectLoop { chain: Vec<String> },
}
