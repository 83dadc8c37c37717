use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateTask {
    #[serde(default)]
    pub title: String,
}

/// What a POST to a task's own page should do.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    #[default]
    Complete,
    Remove,
}

#[derive(Deserialize)]
pub struct TaskActionForm {
    #[serde(default)]
    pub action: TaskAction,
}
