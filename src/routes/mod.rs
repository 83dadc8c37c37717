use axum::{
    extract::State,
    middleware,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use tower_http::trace::TraceLayer;

mod auth;
mod health;
mod middleware_auth;
mod settings;
mod tasks;

pub use health::health;

use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/tasks", get(tasks::routes::list))
        .route("/tasks/add", post(tasks::routes::add))
        .route(
            "/tasks/{task_id}",
            get(tasks::routes::detail)
                .post(tasks::routes::act)
                .delete(tasks::routes::remove),
        )
        .route("/tasks/complete/{task_id}", post(tasks::routes::complete))
        .route("/tasks/completed/{task_id}", get(tasks::routes::completed))
        .route("/settings", get(settings::form).post(settings::update))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_auth::require_session,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    match state.sessions.current(&jar) {
        Some(_) => Redirect::to("/tasks"),
        None => Redirect::to("/login"),
    }
}
