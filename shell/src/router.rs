//! Hash-fragment router with authentication guards.
//!
//! SYSTEM CONTEXT
//! ==============
//! The current route is the URL fragment (`#/<path>`). Navigation writes the
//! fragment and resolution runs when the location reports the change, so
//! programmatic navigation and browser back/forward take the same path.
//!
//! RESOLUTION
//! ==========
//! 1. Unknown path: redirect to `login`.
//! 2. `requires_auth` without a session: redirect to `login`.
//!    `guest_only` with a session: redirect to `main`.
//! 3. `before_enter(target, previous)` returning `false` aborts silently.
//! 4. The `before_route` hook observes the transition.
//! 5. The route becomes current and is recorded in the session.
//! 6. The render function runs against the container, if both exist.
//!
//! A redirect chain spans the redirect and the fragment change it causes.
//! Redirecting to a path already in the chain stops resolution and records a
//! [`RouteError::RedirectLoop`].

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::error::RouteError;
use crate::listeners::Subscription;
use crate::platform::{HashLocation, Platform};

pub const LOGIN_ROUTE: &str = "login";
pub const HOME_ROUTE: &str = "main";

/// What the router needs to know about the session.
pub trait SessionView {
    fn is_authenticated(&self) -> bool;
    /// Called after a route becomes current.
    fn record_route(&self, path: &str);
}

/// Anything that can move the app to another route.
pub trait Navigator {
    fn navigate(&self, path: &str);
}

type RenderFn<C> = dyn Fn(&C);
type EnterGuard = dyn Fn(&str, Option<&str>) -> bool;
type RouteHook = dyn Fn(&str, Option<&str>);

/// Declaration of one route.
pub struct RouteConfig<C> {
    render: Option<Rc<RenderFn<C>>>,
    requires_auth: bool,
    guest_only: bool,
    before_enter: Option<Rc<EnterGuard>>,
}

impl<C> Default for RouteConfig<C> {
    fn default() -> Self {
        Self { render: None, requires_auth: false, guest_only: false, before_enter: None }
    }
}

impl<C: 'static> RouteConfig<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn render(mut self, render: impl Fn(&C) + 'static) -> Self {
        self.render = Some(Rc::new(render));
        self
    }

    /// Only reachable with a session; others are sent to `login`.
    #[must_use]
    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Only reachable without a session; others are sent to `main`.
    #[must_use]
    pub fn guest_only(mut self) -> Self {
        self.guest_only = true;
        self
    }

    /// Per-route veto, called with `(target, previous)`.
    #[must_use]
    pub fn before_enter(mut self, guard: impl Fn(&str, Option<&str>) -> bool + 'static) -> Self {
        self.before_enter = Some(Rc::new(guard));
        self
    }
}

struct RouterInner<C> {
    routes: RefCell<HashMap<String, Rc<RouteConfig<C>>>>,
    current: RefCell<Option<String>>,
    container: RefCell<Option<C>>,
    before_route: RefCell<Option<Rc<RouteHook>>>,
    redirects: RefCell<Vec<String>>,
    last_error: RefCell<Option<RouteError>>,
    session: Rc<dyn SessionView>,
    location: Rc<dyn HashLocation>,
    hash_listener: Subscription,
}

impl<C> Drop for RouterInner<C> {
    fn drop(&mut self) {
        self.hash_listener.unsubscribe();
    }
}

/// Shared router handle. `C` is the render container (a DOM element in the
/// browser, anything clonable in tests).
pub struct Router<C> {
    inner: Rc<RouterInner<C>>,
}

impl<C> Clone for Router<C> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<C: Clone + 'static> Router<C> {
    /// Create a router and start listening for fragment changes.
    pub fn new(session: Rc<dyn SessionView>, location: Rc<dyn HashLocation>) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<RouterInner<C>>| {
            let weak = weak.clone();
            let hash_listener = location.on_change(Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Router { inner }.handle_hash_change();
                }
            }));
            RouterInner {
                routes: RefCell::new(HashMap::new()),
                current: RefCell::new(None),
                container: RefCell::new(None),
                before_route: RefCell::new(None),
                redirects: RefCell::new(Vec::new()),
                last_error: RefCell::new(None),
                session,
                location,
                hash_listener,
            }
        });
        Self { inner }
    }

    pub fn from_platform(session: Rc<dyn SessionView>, platform: &Platform) -> Self {
        Self::new(session, Rc::clone(&platform.location))
    }

    /// Register `config` under `path`, replacing any previous registration.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::EmptyPath`] for an empty path and
    /// [`RouteError::ConflictingGuards`] when the route is both auth-only and
    /// guest-only.
    pub fn define(&self, path: &str, config: RouteConfig<C>) -> Result<&Self, RouteError> {
        if path.is_empty() {
            return Err(RouteError::EmptyPath);
        }
        if config.requires_auth && config.guest_only {
            return Err(RouteError::ConflictingGuards { path: path.to_owned() });
        }
        self.inner.routes.borrow_mut().insert(path.to_owned(), Rc::new(config));
        Ok(self)
    }

    #[must_use]
    pub fn has_route(&self, path: &str) -> bool {
        self.inner.routes.borrow().contains_key(path)
    }

    /// Install the global hook run before every successful transition.
    /// A later call replaces the earlier hook.
    pub fn on_before_route(&self, hook: impl Fn(&str, Option<&str>) + 'static) {
        *self.inner.before_route.borrow_mut() = Some(Rc::new(hook));
    }

    /// Record the render container and resolve the current fragment.
    pub fn init(&self, container: C) {
        *self.inner.container.borrow_mut() = Some(container);
        let path = self.current_path();
        self.resolve_fresh(&path);
    }

    /// Point the fragment at `path`. Resolution follows the change notification.
    pub fn navigate(&self, path: &str) {
        self.inner.location.set_hash(&format!("#/{path}"));
    }

    /// Path named by the fragment with its `#/` prefix removed, `login` when
    /// there is none. A fragment without the prefix is taken as written.
    #[must_use]
    pub fn current_path(&self) -> String {
        let hash = self.inner.location.hash();
        let path = hash.strip_prefix("#/").unwrap_or(&hash);
        if path.is_empty() || path == "#" { LOGIN_ROUTE.to_owned() } else { path.to_owned() }
    }

    /// Path of the last successfully entered route.
    #[must_use]
    pub fn current_route(&self) -> Option<String> {
        self.inner.current.borrow().clone()
    }

    /// Re-run resolution for the current route, e.g. after sign-in so guards
    /// can move the user along.
    pub fn refresh(&self) {
        let current = self.current_route();
        match current {
            Some(path) => self.resolve_fresh(&path),
            None => {
                self.inner.redirects.borrow_mut().clear();
                self.redirect(LOGIN_ROUTE);
            }
        }
    }

    /// The most recent resolution failure, cleared on read.
    pub fn take_error(&self) -> Option<RouteError> {
        self.inner.last_error.borrow_mut().take()
    }

    fn handle_hash_change(&self) {
        let path = self.current_path();
        {
            let mut chain = self.inner.redirects.borrow_mut();
            if chain.last() != Some(&path) {
                *chain = vec![path.clone()];
            }
        }
        self.resolve(&path);
    }

    fn resolve_fresh(&self, path: &str) {
        *self.inner.redirects.borrow_mut() = vec![path.to_owned()];
        self.resolve(path);
    }

    fn resolve(&self, path: &str) {
        let route = self.inner.routes.borrow().get(path).cloned();
        let Some(route) = route else {
            log::warn!("route {path:?} not found, redirecting to {LOGIN_ROUTE}");
            self.redirect(LOGIN_ROUTE);
            return;
        };

        let authenticated = self.inner.session.is_authenticated();
        if route.requires_auth && !authenticated {
            log::debug!("route {path:?} requires a session");
            self.redirect(LOGIN_ROUTE);
            return;
        }
        if route.guest_only && authenticated {
            log::debug!("route {path:?} is guest-only");
            self.redirect(HOME_ROUTE);
            return;
        }

        let previous = self.current_route();
        if let Some(guard) = &route.before_enter {
            if !guard(path, previous.as_deref()) {
                log::debug!("route {path:?} vetoed by before_enter");
                self.inner.redirects.borrow_mut().clear();
                return;
            }
        }

        let hook = self.inner.before_route.borrow().clone();
        if let Some(hook) = hook {
            hook(path, previous.as_deref());
        }

        *self.inner.current.borrow_mut() = Some(path.to_owned());
        self.inner.redirects.borrow_mut().clear();
        self.inner.session.record_route(path);

        let container = self.inner.container.borrow().clone();
        if let (Some(container), Some(render)) = (container, &route.render) {
            render(&container);
        }
    }

    fn redirect(&self, target: &str) {
        {
            let mut chain = self.inner.redirects.borrow_mut();
            let looped = chain.iter().any(|p| p == target);
            chain.push(target.to_owned());
            if looped {
                let chain = std::mem::take(&mut *chain);
                let err = RouteError::RedirectLoop { chain };
                log::error!("{err}");
                *self.inner.last_error.borrow_mut() = Some(err);
                return;
            }
        }

        if self.current_path() == target {
            self.resolve(target);
        } else {
            self.navigate(target);
        }
    }
}

impl<C: Clone + 'static> Navigator for Router<C> {
    fn navigate(&self, path: &str) {
        Router::navigate(self, path);
    }
}
