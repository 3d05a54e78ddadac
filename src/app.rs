//! Application composition: builds the shell, registers the route table, and
//! connects the auth provider, the bus, and the state store.
//!
//! SYSTEM CONTEXT
//! ==============
//! ```text
//! auth provider ──state change──▶ App::on_auth_changed ──▶ store.user / router.init
//! store ──currentRoute/theme/language──▶ bus (nav:changed, user:theme, user:language)
//! bus ──ui:toast / ui:error / ui:error:hide──▶ Notifier
//! router ──render──▶ ScreenHost ──▶ ScreenRenderer
//! ```
//!
//! Everything is constructed once in [`App::new`] and passed by handle; there
//! are no globals. Route render closures hold a `Weak<App>` so the router does
//! not keep the app alive.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;
use shell::events::{auth, nav, ui, user};
use shell::platform::Platform;
use shell::{EventBus, RouteConfig, RouteError, Router, StateKey, StateStore, StateValue, Subscription};

use crate::actions::AccountActions;
use crate::config::{AppConfig, BackendConfig};
use crate::screen::{Screen, ScreenContext, ScreenHost, ScreenRenderer};
use crate::services::{AuthProvider, DocumentStore, Identity, MemoryAuth, MemoryDocuments};

/// Document root attribute carrying the UI language.
pub const LANG_ATTRIBUTE: &str = "lang";

/// Toasts and the error banner, supplied by the presentation layer.
pub trait Notifier {
    fn show_toast(&self, message: &str);
    fn show_error(&self, message: &str);
    fn hide_error(&self);
}

/// The backend the app talks to.
#[derive(Clone)]
pub struct Services {
    pub auth: Rc<dyn AuthProvider>,
    pub documents: Rc<dyn DocumentStore>,
}

impl Services {
    /// In-memory services seeded with the demo account and its data.
    #[must_use]
    pub fn demo() -> Self {
        Self { auth: Rc::new(MemoryAuth::with_demo_account()), documents: Rc::new(MemoryDocuments::with_demo_data()) }
    }

    /// Demo services in mock mode, otherwise whatever `hosted` builds from the
    /// backend settings.
    pub fn for_config(config: &AppConfig, hosted: impl FnOnce(&BackendConfig) -> Self) -> Self {
        if config.use_mock {
            log::info!("running with in-memory services");
            Self::demo()
        } else {
            hosted(&config.backend)
        }
    }
}

pub struct App<C> {
    store: StateStore<Identity>,
    bus: EventBus<Value>,
    router: Router<C>,
    services: Services,
    platform: Platform,
    actions: Rc<AccountActions>,
    screens: ScreenHost<C>,
    notifier: Rc<dyn Notifier>,
    container: RefCell<Option<C>>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl<C: Clone + 'static> App<C> {
    /// Build the shell and register the route table. Nothing observable
    /// happens until [`App::start`].
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] if the route table is misconfigured.
    pub fn new(
        config: &AppConfig,
        platform: Platform,
        services: Services,
        renderer: Rc<dyn ScreenRenderer<C>>,
        notifier: Rc<dyn Notifier>,
    ) -> Result<Rc<Self>, RouteError> {
        let store = StateStore::from_platform(&platform, &config.store_options());
        let bus = EventBus::new();
        let router = Router::from_platform(Rc::new(store.clone()), &platform);
        let actions = Rc::new(AccountActions::new(
            store.clone(),
            bus.clone(),
            Rc::new(router.clone()),
            Rc::clone(&services.auth),
            Rc::clone(&services.documents),
        ));

        let app = Rc::new(Self {
            store,
            bus,
            router,
            services,
            platform,
            actions,
            screens: ScreenHost::new(renderer),
            notifier,
            container: RefCell::new(None),
            subscriptions: RefCell::new(Vec::new()),
        });
        app.define_routes()?;
        Ok(app)
    }

    fn define_routes(self: &Rc<Self>) -> Result<(), RouteError> {
        for screen in Screen::ALL {
            let weak = Rc::downgrade(self);
            let config = RouteConfig::new().render(move |container: &C| {
                if let Some(app) = weak.upgrade() {
                    app.show(screen, container);
                }
            });
            let config = if screen.requires_auth() { config.requires_auth() } else { config.guest_only() };
            self.router.define(screen.route(), config)?;
        }
        Ok(())
    }

    /// Wire notifications and bridges, then follow the auth state. The first
    /// auth report (delivered immediately) resolves the initial route into
    /// `container`.
    pub fn start(self: &Rc<Self>, container: C) {
        *self.container.borrow_mut() = Some(container);
        self.platform.document.set_attribute(LANG_ATTRIBUTE, &self.store.language());

        let mut subs = vec![
            self.bridge_notifier(ui::TOAST_SHOW, |notifier, text| notifier.show_toast(text)),
            self.bridge_notifier(ui::ERROR_SHOW, |notifier, text| notifier.show_error(text)),
            self.bridge_notifier(ui::ERROR_HIDE, |notifier, _| notifier.hide_error()),
            self.bridge_navigation(),
            self.bridge_state(),
        ];

        let weak: Weak<Self> = Rc::downgrade(self);
        subs.push(self.services.auth.on_auth_state_changed(Rc::new(move |identity: Option<Rc<Identity>>| {
            if let Some(app) = weak.upgrade() {
                app.on_auth_changed(identity);
            }
        })));

        self.subscriptions.borrow_mut().extend(subs);
    }

    /// Drop every subscription made by `start` and tear down the screen.
    pub fn stop(&self) {
        let subs = std::mem::take(&mut *self.subscriptions.borrow_mut());
        for sub in subs {
            sub.unsubscribe();
        }
        self.screens.teardown();
    }

    fn on_auth_changed(&self, identity: Option<Rc<Identity>>) {
        log::info!("auth state: {}", identity.as_ref().map_or("signed out", |i| i.uid.as_str()));
        self.store.set_user(identity.clone());
        self.store.set(StateValue::IsLoading(false));

        if let Some(identity) = &identity {
            match serde_json::to_value(&**identity) {
                Ok(payload) => self.bus.emit(auth::LOGIN, &payload),
                Err(err) => log::error!("auth:login payload not encoded: {err}"),
            }
        }

        let container = self.container.borrow().clone();
        match container {
            Some(container) => self.router.init(container),
            None => log::warn!("auth state changed before start"),
        }
    }

    fn show(&self, screen: Screen, container: &C) {
        let ctx = ScreenContext {
            actions: Rc::clone(&self.actions),
            user: self.store.user(),
            language: self.store.language(),
            theme: self.store.theme(),
            documents: Rc::clone(&self.services.documents),
            storage: Rc::clone(&self.platform.storage),
        };
        self.screens.show(screen, container, ctx);
    }

    fn bridge_notifier(&self, event: &str, deliver: impl Fn(&dyn Notifier, &str) + 'static) -> Subscription {
        let notifier = Rc::clone(&self.notifier);
        self.bus.on(event, move |payload: &Value| deliver(notifier.as_ref(), &payload_text(payload)))
    }

    fn bridge_navigation(&self) -> Subscription {
        let router = self.router.clone();
        self.bus.on(nav::NAVIGATE, move |payload: &Value| match payload.as_str() {
            Some(path) => {
                router.navigate(path);
                Ok(())
            }
            None => Err(format!("{} expects a path string, got {payload}", nav::NAVIGATE)),
        })
    }

    fn bridge_state(&self) -> Subscription {
        let bus = self.bus.clone();
        let document = Rc::clone(&self.platform.document);
        self.store.subscribe_all(move |new, _old, key| match (key, new) {
            (StateKey::CurrentRoute, StateValue::CurrentRoute(route)) => {
                bus.emit(nav::ROUTE_CHANGED, &Value::String(route.clone()));
            }
            (StateKey::Theme, StateValue::Theme(theme)) => {
                bus.emit(user::THEME_CHANGED, &Value::String(theme.as_str().to_owned()));
            }
            (StateKey::Language, StateValue::Language(lang)) => {
                document.set_attribute(LANG_ATTRIBUTE, lang);
                bus.emit(user::LANGUAGE_CHANGED, &Value::String(lang.clone()));
            }
            _ => {}
        })
    }

    #[must_use]
    pub fn store(&self) -> &StateStore<Identity> {
        &self.store
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus<Value> {
        &self.bus
    }

    #[must_use]
    pub fn router(&self) -> &Router<C> {
        &self.router
    }

    #[must_use]
    pub fn actions(&self) -> &Rc<AccountActions> {
        &self.actions
    }

    #[must_use]
    pub fn active_screen(&self) -> Option<Screen> {
        self.screens.active()
    }
}

/// Bus payloads for toasts and errors are strings; anything else is shown
/// as JSON.
fn payload_text(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
