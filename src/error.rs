//! User-facing messages for service failures.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::i18n;
use crate::services::{ErrorCode, ServiceError};

/// Catalog key for a provider error code, `None` for codes the client does
/// not recognize.
#[must_use]
pub fn message_key(code: &ErrorCode) -> Option<&'static str> {
    let key = match code {
        ErrorCode::InvalidLoginCredentials | ErrorCode::InvalidCredential => "errors.invalidCredentials",
        ErrorCode::InvalidEmail => "errors.invalidEmail",
        ErrorCode::UserDisabled => "errors.userDisabled",
        ErrorCode::UserNotFound => "errors.userNotFound",
        ErrorCode::WrongPassword => "errors.wrongPassword",
        ErrorCode::EmailAlreadyInUse => "errors.emailInUse",
        ErrorCode::WeakPassword => "errors.weakPassword",
        ErrorCode::OperationNotAllowed => "errors.operationNotAllowed",
        ErrorCode::TooManyRequests => "errors.tooManyRequests",
        ErrorCode::RequiresRecentLogin => "errors.requiresRecentLogin",
        ErrorCode::PermissionDenied => "errors.permissionDenied",
        ErrorCode::NotFound => "errors.notFound",
        ErrorCode::AlreadyExists => "errors.alreadyExists",
        ErrorCode::NetworkRequestFailed => "errors.networkError",
        ErrorCode::Other(_) => return None,
    };
    Some(key)
}

/// Translate a service failure into the message shown in the error banner.
#[must_use]
pub fn user_message(err: &ServiceError, lang: &str) -> String {
    log::error!("service call failed: {err}");
    let key = match &err.code {
        Some(code) => message_key(code).unwrap_or_else(|| {
            log::warn!("unhandled service error code: {code}");
            "errors.unknownError"
        }),
        None => "errors.unexpected",
    };
    i18n::translate(lang, key)
}
