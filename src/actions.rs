//! Account operations the screens invoke: sign-in, registration, password
//! management, sign-out, account deletion, and preferences.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is published on the bus as `ui:error` with the translated
//! message, and returned as an [`ActionError`] so callers can react too.
//! Validation runs before any service call, so a rejected form never touches
//! the backend. Routing after sign-in/sign-out follows the auth state stream
//! and the router guards; actions only navigate where a screen flow requires
//! it.

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use serde_json::{Value, json};
use shell::events::{auth, ui};
use shell::router::LOGIN_ROUTE;
use shell::{EventBus, Navigator, StateStore, StateValue};

use crate::error::user_message;
use crate::i18n;
use crate::services::{AuthProvider, DocPath, DocumentStore, Identity, ServiceError};
use crate::validation::{self, RateLimiter};

pub const LOGIN_ATTEMPTS_PER_WINDOW: usize = 5;
pub const LOGIN_WINDOW_MS: i64 = 60_000;
pub const USERS_COLLECTION: &str = "users";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Form input rejected before contacting any service.
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("{message}")]
    Service {
        message: String,
        #[source]
        source: ServiceError,
    },
}

impl ActionError {
    /// The translated message shown to the user.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Invalid(message) | Self::RateLimited(message) | Self::Service { message, .. } => message,
        }
    }
}

pub struct AccountActions {
    store: StateStore<Identity>,
    bus: EventBus<Value>,
    navigator: Rc<dyn Navigator>,
    auth: Rc<dyn AuthProvider>,
    documents: Rc<dyn DocumentStore>,
    login_limiter: RefCell<RateLimiter>,
    clock: fn() -> i64,
}

impl AccountActions {
    pub fn new(
        store: StateStore<Identity>,
        bus: EventBus<Value>,
        navigator: Rc<dyn Navigator>,
        auth: Rc<dyn AuthProvider>,
        documents: Rc<dyn DocumentStore>,
    ) -> Self {
        Self {
            store,
            bus,
            navigator,
            auth,
            documents,
            login_limiter: RefCell::new(RateLimiter::new(LOGIN_ATTEMPTS_PER_WINDOW, LOGIN_WINDOW_MS)),
            clock: crate::clock::now_ms,
        }
    }

    /// Replace the time source used for rate limiting and timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// # Errors
    ///
    /// Empty fields, too many attempts, or a rejected sign-in.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ActionError> {
        let email = validation::sanitize_input(email);
        if email.is_empty() || password.is_empty() {
            return Err(self.invalid("errors.fillAllFields"));
        }
        if !self.login_limiter.borrow_mut().check((self.clock)()) {
            let message = self.translate("errors.tooManyRequests");
            return Err(self.report(ActionError::RateLimited(message)));
        }

        self.call(self.auth.sign_in(&email, password)).await?;
        self.hide_error();
        Ok(())
    }

    /// Create an account plus its `users/{uid}` profile, then return to the
    /// sign-in screen.
    ///
    /// # Errors
    ///
    /// Empty fields, a short password, mismatched passwords, or a service
    /// failure.
    pub async fn register(&self, name: &str, email: &str, password: &str, confirm: &str) -> Result<(), ActionError> {
        let name = validation::sanitize_input(name);
        let email = validation::sanitize_input(email);
        if name.is_empty() || email.is_empty() || password.is_empty() || confirm.is_empty() {
            return Err(self.invalid("errors.fillAllFields"));
        }
        if let Some(issue) = validation::validate_password(password).first() {
            return Err(self.invalid(issue.message_key()));
        }
        if password != confirm {
            return Err(self.invalid("errors.passwordMismatch"));
        }

        let identity = self.call(self.auth.sign_up(&email, password)).await?;
        let profile = json!({
            "userId": identity.uid,
            "email": email,
            "role": "USER",
            "registrationDate": (self.clock)(),
            "totalPoints": 0,
            "visitCount": 0,
        });
        self.call(self.documents.set(&DocPath::new(USERS_COLLECTION, identity.uid.as_str()), profile)).await?;

        self.hide_error();
        self.navigator.navigate(LOGIN_ROUTE);
        Ok(())
    }

    /// # Errors
    ///
    /// An empty address or a service failure.
    pub async fn reset_password(&self, email: &str) -> Result<(), ActionError> {
        let email = validation::sanitize_input(email);
        if email.is_empty() {
            return Err(self.invalid("errors.fillAllFields"));
        }

        self.call(self.auth.send_password_reset(&email)).await?;
        self.toast("resetPassword.success");
        self.hide_error();
        self.navigator.navigate(LOGIN_ROUTE);
        Ok(())
    }

    /// Set a new password for the signed-in account. Both inputs are trimmed.
    ///
    /// # Errors
    ///
    /// A short password, mismatched inputs, or a provider failure, reported
    /// with the password-change prefix.
    pub async fn change_password(&self, new_password: &str, confirm: &str) -> Result<(), ActionError> {
        let new_password = new_password.trim();
        let confirm = confirm.trim();
        if new_password.chars().count() < validation::MIN_PASSWORD_LEN {
            return Err(self.invalid("errors.passwordLength"));
        }
        if new_password != confirm {
            return Err(self.invalid("errors.passwordMismatch"));
        }

        self.bus.emit(ui::LOADING_START, &Value::Null);
        let result = self.auth.update_password(new_password).await;
        self.bus.emit(ui::LOADING_END, &Value::Null);
        if let Err(source) = result {
            log::error!("password change failed: {source}");
            let message = format!("{}: {}", self.translate("errors.passwordChangeError"), source.message);
            return Err(self.report(ActionError::Service { message, source }));
        }

        self.toast("newPassword.success");
        self.navigator.navigate(LOGIN_ROUTE);
        Ok(())
    }

    /// # Errors
    ///
    /// The provider refused to end the session.
    pub async fn logout(&self) -> Result<(), ActionError> {
        self.call(self.auth.sign_out()).await?;
        self.bus.emit(auth::LOGOUT, &Value::Null);
        self.navigator.navigate(LOGIN_ROUTE);
        Ok(())
    }

    /// # Errors
    ///
    /// The provider refused the deletion or the follow-up sign-out.
    pub async fn delete_account(&self) -> Result<(), ActionError> {
        self.call(self.auth.delete_current_user()).await?;
        self.toast("settings.accountDeleted");
        self.logout().await
    }

    /// Switch the UI language. Unsupported codes are ignored with a warning;
    /// returns whether the language is now `lang`.
    pub fn set_language(&self, lang: &str) -> bool {
        if !i18n::is_supported(lang) {
            let available: Vec<_> = i18n::LANGUAGES.iter().map(|(code, _)| *code).collect();
            log::warn!("language {lang:?} not supported; available: {}", available.join(", "));
            return false;
        }
        self.store.set(StateValue::Language(lang.to_owned()));
        true
    }

    pub fn toggle_theme(&self) {
        self.store.toggle_theme();
    }

    pub fn navigate(&self, path: &str) {
        self.navigator.navigate(path);
    }

    fn translate(&self, key: &str) -> String {
        i18n::translate(&self.store.language(), key)
    }

    /// Run a service call with the loading indicator up, mapping failures.
    async fn call<T>(&self, op: impl Future<Output = Result<T, ServiceError>>) -> Result<T, ActionError> {
        self.bus.emit(ui::LOADING_START, &Value::Null);
        let result = op.await;
        self.bus.emit(ui::LOADING_END, &Value::Null);
        result.map_err(|source| {
            let message = user_message(&source, &self.store.language());
            self.report(ActionError::Service { message, source })
        })
    }

    fn invalid(&self, key: &str) -> ActionError {
        let message = self.translate(key);
        self.report(ActionError::Invalid(message))
    }

    fn report(&self, err: ActionError) -> ActionError {
        self.bus.emit(ui::ERROR_SHOW, &Value::String(err.message().to_owned()));
        err
    }

    fn toast(&self, key: &str) {
        self.bus.emit(ui::TOAST_SHOW, &Value::String(self.translate(key)));
    }

    fn hide_error(&self) {
        self.bus.emit(ui::ERROR_HIDE, &Value::Null);
    }
}
