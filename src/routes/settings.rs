use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::credentials::AuthError;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::routes::auth::CredentialsForm;
use crate::routes::middleware_auth::CurrentUser;
use crate::session::Session;
use crate::state::AppState;
use crate::views;

/// Signed cookie for an account that no longer exists
fn orphaned_session(state: &AppState, session: &Session, jar: CookieJar) -> Response {
    warn!(user_id = %session.user_id, "session refers to unknown account");
    (state.sessions.end(jar), Redirect::to("/login")).into_response()
}

fn back_to_settings(jar: CookieJar, notice: Flash) -> Response {
    (flash::set(jar, notice), Redirect::to("/settings")).into_response()
}

pub async fn form(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(user) = state.users.find(session.user_id).await? else {
        return Ok(orphaned_session(&state, &session, jar));
    };

    let (jar, notice) = flash::take(jar);
    Ok((jar, views::settings(&user, notice)).into_response())
}

/// Replaces username and password, then reissues the session so the new
/// name shows up immediately.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let Some((username, password)) = form.fields() else {
        return Ok(back_to_settings(jar, Flash::MissingFields));
    };

    if state
        .users
        .username_taken_by_other(session.user_id, username)
        .await?
    {
        return Ok(back_to_settings(jar, Flash::UsernameTaken));
    }

    match state.users.update(session.user_id, username, password).await {
        Ok(()) => {}
        Err(AuthError::DuplicateUser) => return Ok(back_to_settings(jar, Flash::UsernameTaken)),
        Err(AuthError::UserNotFound) => return Ok(orphaned_session(&state, &session, jar)),
        Err(e) => return Err(e.into()),
    }

    let jar = state.sessions.start(jar, session.user_id, username)?;
    let jar = flash::set(jar, Flash::SettingsUpdated);

    Ok((jar, Redirect::to("/tasks")).into_response())
}
