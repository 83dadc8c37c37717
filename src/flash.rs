use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const FLASH_COOKIE: &str = "flash";

/// One-shot notices shown on the next rendered page.
///
/// The cookie only ever carries [`Flash::code`], never message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    UserExists,
    AccountCreated,
    UserNotFound,
    MissingPassword,
    IncorrectPassword,
    MissingFields,
    EmptyTitle,
    TaskNotFound,
    UsernameTaken,
    SettingsUpdated,
    UnknownAction,
}

impl Flash {
    const ALL: [Flash; 11] = [
        Flash::UserExists,
        Flash::AccountCreated,
        Flash::UserNotFound,
        Flash::MissingPassword,
        Flash::IncorrectPassword,
        Flash::MissingFields,
        Flash::EmptyTitle,
        Flash::TaskNotFound,
        Flash::UsernameTaken,
        Flash::SettingsUpdated,
        Flash::UnknownAction,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Flash::UserExists => "user-exists",
            Flash::AccountCreated => "account-created",
            Flash::UserNotFound => "user-not-found",
            Flash::MissingPassword => "missing-password",
            Flash::IncorrectPassword => "incorrect-password",
            Flash::MissingFields => "missing-fields",
            Flash::EmptyTitle => "empty-title",
            Flash::TaskNotFound => "task-not-found",
            Flash::UsernameTaken => "username-taken",
            Flash::SettingsUpdated => "settings-updated",
            Flash::UnknownAction => "unknown-action",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::UserExists => "User already exists!",
            Flash::AccountCreated => "Account created successfully!",
            Flash::UserNotFound => "User not found!",
            Flash::MissingPassword => "Error: No password found for this user.",
            Flash::IncorrectPassword => "Incorrect password!",
            Flash::MissingFields => "Username and password are required!",
            Flash::EmptyTitle => "Task title cannot be empty!",
            Flash::TaskNotFound => "Task not found!",
            Flash::UsernameTaken => "That username is already taken!",
            Flash::SettingsUpdated => "Settings updated successfully!",
            Flash::UnknownAction => "That action is not available for tasks.",
        }
    }
}

pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, flash.code()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    jar.add(cookie)
}

/// Reads the pending notice, if any, and clears it from the jar.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar.get(FLASH_COOKIE).and_then(|c| Flash::from_code(c.value()));

    if jar.get(FLASH_COOKIE).is_some() {
        (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
    } else {
        (jar, flash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique_and_resolve() {
        for flash in Flash::ALL {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(Flash::from_code("<script>"), None);
    }

    #[test]
    fn test_take_consumes_notice() {
        let jar = set(CookieJar::new(), Flash::UserExists);

        let (jar, flash) = take(jar);
        assert_eq!(flash, Some(Flash::UserExists));

        let (_, again) = take(jar);
        assert_eq!(again, None);
    }

    #[test]
    fn test_take_on_empty_jar() {
        let (_, flash) = take(CookieJar::new());
        assert_eq!(flash, None);
    }
}
