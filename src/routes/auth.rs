use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::credentials::AuthError;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::state::AppState;
use crate::views;

/// Username/password form shared by sign-up, login and settings.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsForm {
    /// Trimmed username and raw password, or `None` if either is blank.
    pub fn fields(&self) -> Option<(&str, &str)> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return None;
        }
        Some((username, self.password.as_str()))
    }
}

fn back_to(jar: CookieJar, path: &'static str, notice: Flash) -> Response {
    (flash::set(jar, notice), Redirect::to(path)).into_response()
}

pub async fn signup_form(jar: CookieJar) -> impl IntoResponse {
    let (jar, notice) = flash::take(jar);
    (jar, views::signup(notice))
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let Some((username, password)) = form.fields() else {
        return Ok(back_to(jar, "/signup", Flash::MissingFields));
    };

    match state.users.create(username, password).await {
        Ok(_) => Ok(back_to(jar, "/login", Flash::AccountCreated)),
        Err(AuthError::DuplicateUser) => Ok(back_to(jar, "/signup", Flash::UserExists)),
        Err(e) => Err(e.into()),
    }
}

pub async fn login_form(jar: CookieJar) -> impl IntoResponse {
    let (jar, notice) = flash::take(jar);
    (jar, views::login(notice))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let Some((username, password)) = form.fields() else {
        return Ok(back_to(jar, "/login", Flash::MissingFields));
    };

    let notice = match state.users.authenticate(username, password).await {
        Ok(user) => {
            let jar = state.sessions.start(jar, user.user_id, &user.username)?;
            info!(user_id = %user.user_id, "user logged in");
            return Ok((jar, Redirect::to("/tasks")).into_response());
        }
        Err(AuthError::UserNotFound) => Flash::UserNotFound,
        Err(AuthError::MissingCredential) => {
            warn!(username, "account has no stored password hash");
            Flash::MissingPassword
        }
        Err(AuthError::InvalidPassword) => Flash::IncorrectPassword,
        Err(e) => return Err(e.into()),
    };

    Ok(back_to(jar, "/login", notice))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session) = state.sessions.current(&jar) {
        info!(user_id = %session.user_id, "user logged out");
    }
    (state.sessions.end(jar), Redirect::to("/login"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password: &str) -> CredentialsForm {
        CredentialsForm {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_fields_trim_username() {
        let f = form("  alice ", "pw1");
        assert_eq!(f.fields(), Some(("alice", "pw1")));
    }

    #[test]
    fn test_fields_reject_blank_values() {
        assert_eq!(form("", "pw1").fields(), None);
        assert_eq!(form("   ", "pw1").fields(), None);
        assert_eq!(form("alice", "").fields(), None);
    }

    #[test]
    fn test_password_is_not_trimmed() {
        let f = form("alice", " pw1 ");
        assert_eq!(f.fields(), Some(("alice", " pw1 ")));
    }
}
