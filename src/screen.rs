//! Screens and their render/teardown lifecycle.
//!
//! Markup is out of scope for this crate: a [`ScreenRenderer`] supplied by the
//! presentation layer draws each [`Screen`] into the router's container. A
//! render may leave things running (a live points query, timers) and hands
//! back a [`Teardown`] for them. [`ScreenHost`] runs the previous teardown
//! before every new render, so a screen never outlives its route.

#[cfg(test)]
#[path = "screen_test.rs"]
mod screen_test;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use shell::platform::KeyValueStorage;
use shell::{Subscription, Theme};

use crate::actions::AccountActions;
use crate::services::{DocumentStore, Identity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Register,
    Reset,
    Main,
    Settings,
    NewPassword,
}

impl Screen {
    pub const ALL: [Self; 6] = [Self::Login, Self::Register, Self::Reset, Self::Main, Self::Settings, Self::NewPassword];

    /// Route path for the screen.
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Reset => "reset",
            Self::Main => "main",
            Self::Settings => "settings",
            Self::NewPassword => "newpassword",
        }
    }

    #[must_use]
    pub fn from_route(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|screen| screen.route() == path)
    }

    /// Signed-in screens; the rest are guest-only.
    #[must_use]
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Main | Self::Settings | Self::NewPassword)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}

/// Cleanup for whatever a render left running.
pub struct Teardown(Box<dyn FnOnce()>);

impl Teardown {
    pub fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self(Box::new(cleanup))
    }

    pub fn run(self) {
        (self.0)();
    }
}

impl From<Subscription> for Teardown {
    fn from(sub: Subscription) -> Self {
        Self::new(move || sub.unsubscribe())
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Teardown")
    }
}

/// What a screen gets to work with.
#[derive(Clone)]
pub struct ScreenContext {
    pub actions: Rc<AccountActions>,
    pub user: Option<Rc<Identity>>,
    pub language: String,
    pub theme: Theme,
    pub documents: Rc<dyn DocumentStore>,
    /// Durable storage, e.g. for the rewards ledger.
    pub storage: Rc<dyn KeyValueStorage>,
}

/// Draws screens into a container of type `C`.
pub trait ScreenRenderer<C> {
    fn render(&self, screen: Screen, container: &C, ctx: ScreenContext) -> Option<Teardown>;
}

/// Owns the active screen's teardown.
pub struct ScreenHost<C> {
    renderer: Rc<dyn ScreenRenderer<C>>,
    active: RefCell<Option<(Screen, Option<Teardown>)>>,
}

impl<C> ScreenHost<C> {
    pub fn new(renderer: Rc<dyn ScreenRenderer<C>>) -> Self {
        Self { renderer, active: RefCell::new(None) }
    }

    /// Tear down the current screen, then render `screen`.
    pub fn show(&self, screen: Screen, container: &C, ctx: ScreenContext) {
        self.teardown();
        let cleanup = self.renderer.render(screen, container, ctx);
        *self.active.borrow_mut() = Some((screen, cleanup));
    }

    #[must_use]
    pub fn active(&self) -> Option<Screen> {
        self.active.borrow().as_ref().map(|(screen, _)| *screen)
    }

    /// Run the current screen's teardown, if any, and forget it.
    pub fn teardown(&self) {
        let previous = self.active.borrow_mut().take();
        if let Some((screen, Some(cleanup))) = previous {
            log::debug!("tearing down {screen}");
            cleanup.run();
        }
    }
}
