//! Message catalogs and lookup.
//!
//! Keys are dot paths (`errors.fillAllFields`). Lookup tries the requested
//! language, then English, then returns the key itself so a missing entry is
//! visible rather than blank. Only the messages the client logic emits live
//! here; screen copy belongs to the presentation layer.

#[cfg(test)]
#[path = "i18n_test.rs"]
mod i18n_test;

pub const DEFAULT_LANGUAGE: &str = "ru";
pub const FALLBACK_LANGUAGE: &str = "en";

/// Supported languages as `(code, display name)`.
pub const LANGUAGES: &[(&str, &str)] = &[("ru", "Русский"), ("en", "English")];

const RU: &[(&str, &str)] = &[
    ("resetPassword.success", "Письмо отправлено!"),
    ("newPassword.success", "Пароль изменён"),
    ("main.rewards", "Получено наград"),
    ("main.of", "из"),
    ("main.rewardReceived", "Вы получили награду в {cafe}!"),
    ("settings.accountDeleted", "Аккаунт удалён"),
    ("errors.fillAllFields", "Пожалуйста, заполните все поля."),
    ("errors.passwordLength", "Пароль должен быть не менее 8 символов."),
    ("errors.passwordMismatch", "Пароли не совпадают!"),
    ("errors.passwordChangeError", "Ошибка при смене пароля"),
    ("errors.invalidEmail", "Неверный email"),
    ("errors.invalidCredentials", "Неверный email или пароль"),
    ("errors.userDisabled", "Этот аккаунт был отключен"),
    ("errors.userNotFound", "Пользователь не найден"),
    ("errors.wrongPassword", "Неверный пароль"),
    ("errors.emailInUse", "Email уже используется"),
    ("errors.weakPassword", "Слишком простой пароль"),
    ("errors.operationNotAllowed", "Операция не разрешена"),
    ("errors.tooManyRequests", "Слишком много попыток. Попробуйте позже"),
    ("errors.requiresRecentLogin", "Для этой операции требуется повторный вход в систему"),
    ("errors.permissionDenied", "У вас нет прав для выполнения этой операции"),
    ("errors.notFound", "Запрашиваемые данные не найдены"),
    ("errors.alreadyExists", "Документ уже существует"),
    ("errors.networkError", "Ошибка сети. Проверьте подключение."),
    ("errors.unknownError", "Произошла ошибка. Попробуйте ещё раз."),
    ("errors.unexpected", "Произошла неожиданная ошибка. Попробуйте позже."),
];

const EN: &[(&str, &str)] = &[
    ("resetPassword.success", "Email sent!"),
    ("newPassword.success", "Password Changed"),
    ("main.rewards", "Rewards received"),
    ("main.of", "of"),
    ("main.rewardReceived", "You received a reward at {cafe}!"),
    ("settings.accountDeleted", "Account deleted"),
    ("errors.fillAllFields", "Please fill in all fields."),
    ("errors.passwordLength", "Password must be at least 8 characters long."),
    ("errors.passwordMismatch", "Passwords don't match!"),
    ("errors.passwordChangeError", "Password change error"),
    ("errors.invalidEmail", "Invalid email"),
    ("errors.invalidCredentials", "Wrong email or password"),
    ("errors.userDisabled", "This account has been disabled"),
    ("errors.userNotFound", "User not found"),
    ("errors.wrongPassword", "Wrong password"),
    ("errors.emailInUse", "Email already in use"),
    ("errors.weakPassword", "Password is too weak"),
    ("errors.operationNotAllowed", "Operation not allowed"),
    ("errors.tooManyRequests", "Too many attempts. Try again later"),
    ("errors.requiresRecentLogin", "Please sign in again to continue"),
    ("errors.permissionDenied", "You don't have permission to do that"),
    ("errors.notFound", "The requested data was not found"),
    ("errors.alreadyExists", "The document already exists"),
    ("errors.networkError", "Network error. Check your connection."),
    ("errors.unknownError", "An error occurred. Please try again."),
    ("errors.unexpected", "An unexpected error occurred. Please try later."),
];

fn catalog(lang: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match lang {
        "ru" => Some(RU),
        "en" => Some(EN),
        _ => None,
    }
}

fn lookup(lang: &str, key: &str) -> Option<&'static str> {
    catalog(lang)?.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

#[must_use]
pub fn is_supported(lang: &str) -> bool {
    catalog(lang).is_some()
}

/// Message for `key` in `lang`, falling back to English, then to the key.
#[must_use]
pub fn translate(lang: &str, key: &str) -> String {
    if let Some(text) = lookup(lang, key).or_else(|| lookup(FALLBACK_LANGUAGE, key)) {
        text.to_owned()
    } else {
        log::warn!("translation not found for key: {key}");
        key.to_owned()
    }
}

/// Like [`translate`], replacing `{name}` placeholders from `params`.
/// Placeholders without a matching parameter are left as written.
#[must_use]
pub fn translate_with(lang: &str, key: &str, params: &[(&str, &str)]) -> String {
    interpolate(&translate(lang, key), params)
}

fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        let is_word = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        match params.iter().find(|(k, _)| *k == name) {
            Some((_, value)) if is_word => out.push_str(value),
            _ => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}
