//! Boundary to the hosted identity and document services.
//!
//! SYSTEM CONTEXT
//! ==============
//! The client only needs a handful of operations from each service, so both
//! are traits: [`AuthProvider`] for sign-in state and [`DocumentStore`] for
//! the `users`, `userPoints`, `cafes`, and `products` collections. The
//! in-memory implementations in [`memory`] back mock mode and the tests.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is a [`ServiceError`] carrying the provider's error code when
//! it had one, so [`crate::error::user_message`] can pick a message.

pub mod auth;
pub mod documents;
pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use auth::AuthProvider;
pub use documents::{DocPath, DocumentStore, Query, Record, Snapshot};
pub use memory::{MemoryAuth, MemoryDocuments};

/// The signed-in account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

/// Provider error codes the client distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidLoginCredentials,
    InvalidCredential,
    InvalidEmail,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    EmailAlreadyInUse,
    WeakPassword,
    OperationNotAllowed,
    TooManyRequests,
    RequiresRecentLogin,
    PermissionDenied,
    NotFound,
    AlreadyExists,
    NetworkRequestFailed,
    Other(String),
}

impl ErrorCode {
    #[must_use]
    pub fn parse(code: &str) -> Self {
        match code {
            "auth/invalid-login-credentials" => Self::InvalidLoginCredentials,
            "auth/invalid-credential" => Self::InvalidCredential,
            "auth/invalid-email" => Self::InvalidEmail,
            "auth/user-disabled" => Self::UserDisabled,
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/weak-password" => Self::WeakPassword,
            "auth/operation-not-allowed" => Self::OperationNotAllowed,
            "auth/too-many-requests" => Self::TooManyRequests,
            "auth/requires-recent-login" => Self::RequiresRecentLogin,
            "permission-denied" => Self::PermissionDenied,
            "not-found" => Self::NotFound,
            "already-exists" => Self::AlreadyExists,
            "network-request-failed" | "auth/network-request-failed" => Self::NetworkRequestFailed,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidLoginCredentials => "auth/invalid-login-credentials",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::InvalidEmail => "auth/invalid-email",
            Self::UserDisabled => "auth/user-disabled",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::OperationNotAllowed => "auth/operation-not-allowed",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::RequiresRecentLogin => "auth/requires-recent-login",
            Self::PermissionDenied => "permission-denied",
            Self::NotFound => "not-found",
            Self::AlreadyExists => "already-exists",
            Self::NetworkRequestFailed => "network-request-failed",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a service call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}{message}", code.as_ref().map(|c| format!("[{c}] ")).unwrap_or_default())]
pub struct ServiceError {
    pub code: Option<ErrorCode>,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code: Some(code), message: message.into() }
    }

    /// A failure with no provider code, e.g. a transport or decode error.
    pub fn uncoded(message: impl Into<String>) -> Self {
        Self { code: None, message: message.into() }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::uncoded(format!("malformed document: {err}"))
    }
}
