use axum::response::Html;
use uuid::Uuid;

use crate::flash::Flash;
use crate::store::{Task, User};

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, username: Option<&str>, flash: Option<Flash>, body: &str) -> Html<String> {
    let nav = match username {
        Some(name) => format!(
            r#"<nav><span>Signed in as <strong>{}</strong></span> | <a href="/tasks">Tasks</a> | <a href="/settings">Settings</a> | <a href="/logout">Log out</a></nav>"#,
            escape(name)
        ),
        None => r#"<nav><a href="/login">Log in</a> | <a href="/signup">Sign up</a></nav>"#.to_string(),
    };

    let notice = flash
        .map(|f| format!(r#"<p class="flash">{}</p>"#, escape(f.message())))
        .unwrap_or_default();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
{nav}
{notice}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

fn credentials_form(action: &str, submit: &str, username: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
<label>Username <input type="text" name="username" value="{username}" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">{submit}</button>
</form>"#,
        username = escape(username),
    )
}

pub fn signup(flash: Option<Flash>) -> Html<String> {
    let body = format!(
        r#"{}
<p>Already registered? <a href="/login">Log in</a></p>"#,
        credentials_form("/signup", "Sign up", "")
    );
    layout("Sign up", None, flash, &body)
}

pub fn login(flash: Option<Flash>) -> Html<String> {
    let body = format!(
        r#"{}
<p>No account yet? <a href="/signup">Sign up</a></p>"#,
        credentials_form("/login", "Log in", "")
    );
    layout("Log in", None, flash, &body)
}

fn status(task: &Task) -> &'static str {
    if task.completed {
        "done"
    } else {
        "open"
    }
}

pub fn dashboard(username: &str, tasks: &[Task], flash: Option<Flash>) -> Html<String> {
    let mut body = String::from(
        r#"<form method="post" action="/tasks/add">
<input type="text" name="title" placeholder="What needs doing?" required>
<button type="submit">Add task</button>
</form>
"#,
    );

    if tasks.is_empty() {
        body.push_str("<p>No tasks yet.</p>");
    } else {
        body.push_str("<ul>\n");
        for task in tasks {
            let complete = if task.completed {
                String::new()
            } else {
                format!(
                    r#"<form method="post" action="/tasks/complete/{id}"><button type="submit">Complete</button></form>"#,
                    id = task.id
                )
            };
            body.push_str(&format!(
                r#"<li class="{status}"><a href="/tasks/{id}">{title}</a> [{status}] {complete}{remove}</li>
"#,
                status = status(task),
                id = task.id,
                title = escape(&task.title),
                remove = remove_form(task.id),
            ));
        }
        body.push_str("</ul>");
    }

    layout(&format!("{}'s tasks", username), Some(username), flash, &body)
}

fn remove_form(id: Uuid) -> String {
    format!(
        r#"<form method="post" action="/tasks/{id}"><input type="hidden" name="action" value="remove"><button type="submit">Remove</button></form>"#
    )
}

pub fn task_detail(username: &str, task: &Task, flash: Option<Flash>) -> Html<String> {
    let complete = if task.completed {
        String::new()
    } else {
        format!(
            r#"<form method="post" action="/tasks/{id}"><input type="hidden" name="action" value="complete"><button type="submit">Mark complete</button></form>"#,
            id = task.id
        )
    };

    let body = format!(
        r#"<p>Status: {status}</p>
{complete}
{remove}
<p><a href="/tasks">Back to tasks</a></p>"#,
        status = status(task),
        remove = remove_form(task.id),
    );

    layout(&task.title, Some(username), flash, &body)
}

pub fn congrats(username: &str, task: &Task) -> Html<String> {
    let body = format!(
        r#"<p>Well done, you finished <strong>{}</strong>.</p>
<p><a href="/tasks">Back to tasks</a></p>"#,
        escape(&task.title)
    );
    layout("Congratulations!", Some(username), None, &body)
}

pub fn settings(user: &User, flash: Option<Flash>) -> Html<String> {
    let body = credentials_form("/settings", "Save", &user.username);
    layout("Account settings", Some(&user.username), flash, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(title: &str, completed: bool) -> Task {
        Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: title.to_string(),
            completed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_dashboard_escapes_titles() {
        let Html(page) = dashboard("alice", &[task("<script>alert(1)</script>", false)], None);

        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_dashboard_lists_tasks_with_status() {
        let open = task("Buy milk", false);
        let done = task("Walk dog", true);
        let Html(page) = dashboard("alice", &[open.clone(), done.clone()], None);

        assert!(page.contains("Buy milk"));
        assert!(page.contains(&format!("/tasks/complete/{}", open.id)));
        assert!(!page.contains(&format!("/tasks/complete/{}", done.id)));
        assert!(page.contains("[done]"));
    }

    #[test]
    fn test_flash_is_rendered() {
        let Html(page) = login(Some(Flash::IncorrectPassword));
        assert!(page.contains("Incorrect password!"));
    }

    #[test]
    fn test_empty_dashboard() {
        let Html(page) = dashboard("alice", &[], None);
        assert!(page.contains("No tasks yet."));
    }
}
