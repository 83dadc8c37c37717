use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::session::Session;
use crate::state::AppState;

/// The session resolved by [`require_session`].
pub struct CurrentUser(pub Session);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

/// Gate for every page that needs a logged-in user. Without a valid session
/// cookie the request never reaches the handler.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match state.sessions.current(&jar) {
        Some(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        None => {
            debug!(path = %req.uri().path(), "no session, redirecting to login");
            Redirect::to("/login").into_response()
        }
    }
}
