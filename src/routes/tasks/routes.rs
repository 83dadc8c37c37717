use axum::{
    extract::{rejection::FormRejection, Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;
use uuid::Uuid;

use super::dto::{CreateTask, TaskAction, TaskActionForm};
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::routes::middleware_auth::CurrentUser;
use crate::session::Session;
use crate::state::AppState;
use crate::store::Task;
use crate::views;

/// Looks up a task the session user owns. Malformed ids never reach the
/// store, and other users' tasks are reported the same as missing ones.
async fn find_owned(
    state: &AppState,
    session: &Session,
    task_id: &str,
) -> Result<Option<Task>, AppError> {
    let Ok(id) = Uuid::parse_str(task_id) else {
        return Ok(None);
    };

    let task = state.tasks.get(id).await?;
    Ok(task.filter(|t| t.owner_id == session.user_id))
}

fn task_not_found(jar: CookieJar) -> Response {
    (flash::set(jar, Flash::TaskNotFound), Redirect::to("/tasks")).into_response()
}

/// Task dashboard for the logged-in user
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let tasks = state.tasks.list_for_owner(session.user_id).await?;
    let (jar, notice) = flash::take(jar);

    Ok((jar, views::dashboard(&session.username, &tasks, notice)).into_response())
}

pub async fn add(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    jar: CookieJar,
    Form(body): Form<CreateTask>,
) -> Result<Response, AppError> {
    let title = body.title.trim();
    if title.is_empty() {
        return Ok((flash::set(jar, Flash::EmptyTitle), Redirect::to("/tasks")).into_response());
    }

    let task = state.tasks.create(session.user_id, title).await?;
    info!(task_id = %task.id, user_id = %session.user_id, "task created");

    Ok(Redirect::to("/tasks").into_response())
}

/// GET on a task's page
pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    jar: CookieJar,
    Path(task_id): Path<String>,
) -> Result<Response, AppError> {
    match find_owned(&state, &session, &task_id).await? {
        Some(task) => {
            let (jar, notice) = flash::take(jar);
            Ok((jar, views::task_detail(&session.username, &task, notice)).into_response())
        }
        None => Ok(task_not_found(jar)),
    }
}

/// POST on a task's page. Completes the task unless the form asks for
/// `action=remove`. A body-less POST also completes, any other action
/// value goes back to the task with a notice.
pub async fn act(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    jar: CookieJar,
    Path(task_id): Path<String>,
    form: Result<Form<TaskActionForm>, FormRejection>,
) -> Result<Response, AppError> {
    let action = match form {
        Ok(Form(form)) => Some(form.action),
        Err(FormRejection::InvalidFormContentType(_)) => Some(TaskAction::Complete),
        Err(FormRejection::FailedToDeserializeForm(_))
        | Err(FormRejection::FailedToDeserializeFormBody(_)) => None,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let Some(task) = find_owned(&state, &session, &task_id).await? else {
        return Ok(task_not_found(jar));
    };

    let Some(action) = action else {
        let back = format!("/tasks/{}", task.id);
        return Ok((flash::set(jar, Flash::UnknownAction), Redirect::to(&back)).into_response());
    };

    match action {
        TaskAction::Complete => {
            state.tasks.mark_completed(task.id).await?;
            info!(task_id = %task.id, "task completed");
            Ok(Redirect::to(&format!("/tasks/completed/{}", task.id)).into_response())
        }
        TaskAction::Remove => {
            state.tasks.delete(task.id).await?;
            info!(task_id = %task.id, "task deleted");
            Ok(Redirect::to("/tasks").into_response())
        }
    }
}

/// DELETE on a task's page
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    jar: CookieJar,
    Path(task_id): Path<String>,
) -> Result<Response, AppError> {
    let Some(task) = find_owned(&state, &session, &task_id).await? else {
        return Ok(task_not_found(jar));
    };

    state.tasks.delete(task.id).await?;
    info!(task_id = %task.id, "task deleted");

    Ok(Redirect::to("/tasks").into_response())
}

/// Completion from the dashboard, lands back on the list
pub async fn complete(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    jar: CookieJar,
    Path(task_id): Path<String>,
) -> Result<Response, AppError> {
    let Some(task) = find_owned(&state, &session, &task_id).await? else {
        return Ok(task_not_found(jar));
    };

    state.tasks.mark_completed(task.id).await?;
    info!(task_id = %task.id, "task completed");

    Ok(Redirect::to("/tasks").into_response())
}

pub async fn completed(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    jar: CookieJar,
    Path(task_id): Path<String>,
) -> Result<Response, AppError> {
    match find_owned(&state, &session, &task_id).await? {
        Some(task) => Ok(views::congrats(&session.username, &task).into_response()),
        None => Ok(task_not_found(jar)),
    }
}
