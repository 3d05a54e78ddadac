//! Identity provider operations used by the client.

use std::rc::Rc;

use async_trait::async_trait;
use shell::Subscription;

use super::{Identity, ServiceError};

/// Callback receiving the signed-in identity, or `None` after sign-out.
pub type AuthStateCallback = Rc<dyn Fn(Option<Rc<Identity>>)>;

#[async_trait(?Send)]
pub trait AuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Rc<Identity>, ServiceError>;

    /// Create an account and sign in as it.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Rc<Identity>, ServiceError>;

    async fn sign_out(&self) -> Result<(), ServiceError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), ServiceError>;

    /// Change the password of the signed-in account.
    async fn update_password(&self, new_password: &str) -> Result<(), ServiceError>;

    /// Delete the signed-in account. The session ends with it.
    async fn delete_current_user(&self) -> Result<(), ServiceError>;

    fn current_user(&self) -> Option<Rc<Identity>>;

    /// Observe sign-in state. The callback runs immediately with the current
    /// value and again on every transition. One session keeps one `Rc`, so
    /// repeated reports of the same session compare equal by pointer.
    fn on_auth_state_changed(&self, callback: AuthStateCallback) -> Subscription;
}
