use super::*;

#[test]
fn known_codes_map_to_translated_messages() {
    let err = ServiceError::new(ErrorCode::WrongPassword, "auth/wrong-password");
    assert_eq!(user_message(&err, "en"), "Wrong password");
    assert_eq!(user_message(&err, "ru"), "Неверный пароль");
}

#[test]
fn credential_variants_share_a_message() {
    assert_eq!(message_key(&ErrorCode::InvalidCredential), message_key(&ErrorCode::InvalidLoginCredentials));
}

#[test]
fn unknown_code_yields_generic_message() {
    let err = ServiceError::new(ErrorCode::parse("auth/quota-exceeded"), "quota");
    assert_eq!(user_message(&err, "en"), "An error occurred. Please try again.");
}

#[test]
fn uncoded_error_yields_unexpected_message() {
    let err = ServiceError::uncoded("socket closed");
    assert_eq!(user_message(&err, "en"), "An unexpected error occurred. Please try later.");
}

#[test]
fn every_known_code_has_a_catalog_entry() {
    let codes = [
        "auth/invalid-login-credentials",
        "auth/invalid-credential",
        "auth/invalid-email",
        "auth/user-disabled",
        "auth/user-not-found",
        "auth/wrong-password",
        "auth/email-already-in-use",
        "auth/weak-password",
        "auth/operation-not-allowed",
        "auth/too-many-requests",
        "auth/requires-recent-login",
        "permission-denied",
        "not-found",
        "already-exists",
        "network-request-failed",
    ];
    for raw in codes {
        let code = ErrorCode::parse(raw);
        assert_eq!(code.as_str(), raw);
        let key = message_key(&code).expect("known code has a key");
        assert_ne!(i18n::translate("en", key), key, "{raw} has no English text");
    }
}
