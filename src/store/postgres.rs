use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};
use tracing::info;
use uuid::Uuid;

use super::{StoreError, StoreResult, Task, TaskStore, User, UserStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and brings the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(e.into()))?;

        info!("database migrations applied");

        Ok(Self { pool })
    }
}

fn malformed(kind: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| StoreError::Malformed {
        kind,
        reason: e.to_string(),
    }
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let decode = malformed("user");

    Ok(User {
        id: row.try_get("id").map_err(&decode)?,
        username: row.try_get("username").map_err(&decode)?,
        password_hash: row.try_get("password_hash").map_err(&decode)?,
        created_at: row.try_get("created_at").map_err(&decode)?,
    })
}

fn task_from_row(row: &PgRow) -> StoreResult<Task> {
    let decode = malformed("task");

    Ok(Task {
        id: row.try_get("id").map_err(&decode)?,
        owner_id: row.try_get("user_id").map_err(&decode)?,
        title: row.try_get("title").map_err(&decode)?,
        completed: row.try_get("completed").map_err(&decode)?,
        created_at: row.try_get("created_at").map_err(&decode)?,
    })
}

fn map_unique(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation,
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)?;

        user_from_row(&row)
    }

    async fn update(&self, id: Uuid, username: &str, password_hash: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, password_hash = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_unique)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, completed, created_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(task_from_row).collect()
    }

    async fn create(&self, owner_id: Uuid, title: &str) -> StoreResult<Task> {
        let row = sqlx::query(
            r#"
            INSERT INTO tasks (id, user_id, title)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, completed, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        task_from_row(&row)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, completed, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(task_from_row).transpose()
    }

    async fn mark_completed(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET completed = TRUE
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
