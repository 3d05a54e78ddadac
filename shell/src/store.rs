//! Process-wide UI/session state with per-key change notification.
//!
//! DESIGN
//! ======
//! The state is a fixed record (`user`, `theme`, `language`, `isLoading`,
//! `currentRoute`). Writes go through [`StateStore::set`], which skips values
//! identical to the current one, persists the two preference keys, and then
//! notifies key listeners followed by wildcard listeners.
//!
//! Identity comparison is strict: `user` values compare by `Rc` pointer, so a
//! structurally equal but distinct identity still counts as a change.
//! Everything else compares by value.
//!
//! ERROR HANDLING
//! ==============
//! A listener returning `Err` is logged and skipped; `set` never fails.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::listeners::{ListenerOutcome, Registry, Subscription};
use crate::platform::{DocumentRoot, KeyValueStorage, Platform};
use crate::router::SessionView;

pub const THEME_STORAGE_KEY: &str = "theme";
pub const LANGUAGE_STORAGE_KEY: &str = "language";
pub const THEME_ATTRIBUTE: &str = "data-theme";
pub const DEFAULT_LANGUAGE: &str = "ru";

/// Color scheme applied through the root `data-theme` attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the state fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateKey {
    User,
    Theme,
    Language,
    IsLoading,
    CurrentRoute,
}

impl StateKey {
    pub const ALL: [Self; 5] = [Self::User, Self::Theme, Self::Language, Self::IsLoading, Self::CurrentRoute];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Theme => "theme",
            Self::Language => "language",
            Self::IsLoading => "isLoading",
            Self::CurrentRoute => "currentRoute",
        }
    }

    /// Look up a key by its field name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value for one state field; the variant names the field.
#[derive(Debug)]
pub enum StateValue<U> {
    User(Option<Rc<U>>),
    Theme(Theme),
    Language(String),
    IsLoading(bool),
    CurrentRoute(String),
}

impl<U> StateValue<U> {
    #[must_use]
    pub fn key(&self) -> StateKey {
        match self {
            Self::User(_) => StateKey::User,
            Self::Theme(_) => StateKey::Theme,
            Self::Language(_) => StateKey::Language,
            Self::IsLoading(_) => StateKey::IsLoading,
            Self::CurrentRoute(_) => StateKey::CurrentRoute,
        }
    }

    /// Strict equality: pointer identity for `user`, value equality otherwise.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::User(a), Self::User(b)) => match (a, b) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            },
            (Self::Theme(a), Self::Theme(b)) => a == b,
            (Self::Language(a), Self::Language(b)) | (Self::CurrentRoute(a), Self::CurrentRoute(b)) => a == b,
            (Self::IsLoading(a), Self::IsLoading(b)) => a == b,
            _ => false,
        }
    }
}

impl<U> Clone for StateValue<U> {
    fn clone(&self) -> Self {
        match self {
            Self::User(user) => Self::User(user.clone()),
            Self::Theme(theme) => Self::Theme(*theme),
            Self::Language(lang) => Self::Language(lang.clone()),
            Self::IsLoading(loading) => Self::IsLoading(*loading),
            Self::CurrentRoute(route) => Self::CurrentRoute(route.clone()),
        }
    }
}

impl<U> PartialEq for StateValue<U> {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

/// Snapshot of the whole state. Cloning shares the `user` handle only.
#[derive(Debug)]
pub struct AppState<U> {
    pub user: Option<Rc<U>>,
    pub theme: Theme,
    pub language: String,
    pub is_loading: bool,
    pub current_route: String,
}

impl<U> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            user: self.user.clone(),
            theme: self.theme,
            language: self.language.clone(),
            is_loading: self.is_loading,
            current_route: self.current_route.clone(),
        }
    }
}

impl<U> AppState<U> {
    #[must_use]
    pub fn get(&self, key: StateKey) -> StateValue<U> {
        match key {
            StateKey::User => StateValue::User(self.user.clone()),
            StateKey::Theme => StateValue::Theme(self.theme),
            StateKey::Language => StateValue::Language(self.language.clone()),
            StateKey::IsLoading => StateValue::IsLoading(self.is_loading),
            StateKey::CurrentRoute => StateValue::CurrentRoute(self.current_route.clone()),
        }
    }

    /// Store `value` in its field and return the previous value.
    fn replace(&mut self, value: StateValue<U>) -> StateValue<U> {
        match value {
            StateValue::User(user) => StateValue::User(std::mem::replace(&mut self.user, user)),
            StateValue::Theme(theme) => StateValue::Theme(std::mem::replace(&mut self.theme, theme)),
            StateValue::Language(lang) => StateValue::Language(std::mem::replace(&mut self.language, lang)),
            StateValue::IsLoading(loading) => {
                StateValue::IsLoading(std::mem::replace(&mut self.is_loading, loading))
            }
            StateValue::CurrentRoute(route) => {
                StateValue::CurrentRoute(std::mem::replace(&mut self.current_route, route))
            }
        }
    }
}

/// Fallbacks used when durable storage holds no preference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    pub default_theme: Theme,
    pub default_language: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { default_theme: Theme::Light, default_language: DEFAULT_LANGUAGE.to_owned() }
    }
}

type StateListener<U> = dyn Fn(&StateValue<U>, &StateValue<U>, StateKey) -> Result<(), String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Topic {
    Key(StateKey),
    All,
}

struct StoreInner<U> {
    state: RefCell<AppState<U>>,
    listeners: Registry<Topic, StateListener<U>>,
    storage: Rc<dyn KeyValueStorage>,
    document: Rc<dyn DocumentRoot>,
}

/// Shared handle to the application state. Clones refer to the same store.
pub struct StateStore<U> {
    inner: Rc<StoreInner<U>>,
}

impl<U> Clone for StateStore<U> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<U: 'static> StateStore<U> {
    /// Build the store, seeding preferences from `storage` and applying the
    /// theme to the document root right away.
    pub fn new(storage: Rc<dyn KeyValueStorage>, document: Rc<dyn DocumentRoot>, options: &StoreOptions) -> Self {
        let theme = storage
            .get_item(THEME_STORAGE_KEY)
            .and_then(|raw| Theme::parse(&raw))
            .unwrap_or(options.default_theme);
        let language = storage
            .get_item(LANGUAGE_STORAGE_KEY)
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| options.default_language.clone());

        document.set_attribute(THEME_ATTRIBUTE, theme.as_str());

        let state = AppState { user: None, theme, language, is_loading: true, current_route: String::new() };
        Self {
            inner: Rc::new(StoreInner { state: RefCell::new(state), listeners: Registry::new(), storage, document }),
        }
    }

    pub fn from_platform(platform: &Platform, options: &StoreOptions) -> Self {
        Self::new(Rc::clone(&platform.storage), Rc::clone(&platform.document), options)
    }

    #[must_use]
    pub fn get(&self, key: StateKey) -> StateValue<U> {
        self.inner.state.borrow().get(key)
    }

    /// Look up a field by name; unknown names yield `None`.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<StateValue<U>> {
        StateKey::parse(name).map(|key| self.get(key))
    }

    /// Shallow copy of the whole state.
    #[must_use]
    pub fn state(&self) -> AppState<U> {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<Rc<U>> {
        self.inner.state.borrow().user.clone()
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.inner.state.borrow().theme
    }

    #[must_use]
    pub fn language(&self) -> String {
        self.inner.state.borrow().language.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    #[must_use]
    pub fn current_route(&self) -> String {
        self.inner.state.borrow().current_route.clone()
    }

    /// Write one field. Identical values are ignored entirely.
    pub fn set(&self, value: StateValue<U>) {
        let key = value.key();
        let old = {
            let mut state = self.inner.state.borrow_mut();
            if state.get(key).is_same(&value) {
                return;
            }
            state.replace(value.clone())
        };

        self.persist(&value);
        self.notify(&value, &old, key);
    }

    /// Apply several writes in order. Listeners see each one as it lands.
    pub fn update(&self, values: impl IntoIterator<Item = StateValue<U>>) {
        for value in values {
            self.set(value);
        }
    }

    /// Listen for changes to one field. The callback receives
    /// `(new, old, key)`.
    pub fn subscribe<F, R>(&self, key: StateKey, callback: F) -> Subscription
    where
        F: Fn(&StateValue<U>, &StateValue<U>, StateKey) -> R + 'static,
        R: ListenerOutcome,
    {
        self.inner.listeners.insert(Topic::Key(key), wrap(callback), false)
    }

    /// Listen for changes to every field. Runs after the key listeners.
    pub fn subscribe_all<F, R>(&self, callback: F) -> Subscription
    where
        F: Fn(&StateValue<U>, &StateValue<U>, StateKey) -> R + 'static,
        R: ListenerOutcome,
    {
        self.inner.listeners.insert(Topic::All, wrap(callback), false)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().user.is_some()
    }

    pub fn set_user(&self, user: Option<Rc<U>>) {
        self.set(StateValue::User(user));
    }

    pub fn toggle_theme(&self) {
        let next = self.theme().toggled();
        self.set(StateValue::Theme(next));
    }

    fn persist(&self, value: &StateValue<U>) {
        match value {
            StateValue::Theme(theme) => {
                self.inner.storage.set_item(THEME_STORAGE_KEY, theme.as_str());
                self.inner.document.set_attribute(THEME_ATTRIBUTE, theme.as_str());
            }
            StateValue::Language(lang) => self.inner.storage.set_item(LANGUAGE_STORAGE_KEY, lang),
            StateValue::User(_) | StateValue::IsLoading(_) | StateValue::CurrentRoute(_) => {}
        }
    }

    fn notify(&self, new: &StateValue<U>, old: &StateValue<U>, key: StateKey) {
        self.inner.listeners.dispatch(
            &Topic::Key(key),
            |listener| listener(new, old, key),
            |err| log::error!("state listener for {key:?} failed: {err}"),
        );
        self.inner.listeners.dispatch(
            &Topic::All,
            |listener| listener(new, old, key),
            |err| log::error!("state wildcard listener failed on {key:?}: {err}"),
        );
    }
}

fn wrap<U, F, R>(callback: F) -> Rc<StateListener<U>>
where
    U: 'static,
    F: Fn(&StateValue<U>, &StateValue<U>, StateKey) -> R + 'static,
    R: ListenerOutcome,
{
    Rc::new(move |new: &StateValue<U>, old: &StateValue<U>, key: StateKey| callback(new, old, key).into_outcome())
}

impl<U: 'static> SessionView for StateStore<U> {
    fn is_authenticated(&self) -> bool {
        StateStore::is_authenticated(self)
    }

    fn record_route(&self, path: &str) {
        self.set(StateValue::CurrentRoute(path.to_owned()));
    }
}
