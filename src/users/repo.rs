use anyhow::Context;
use async_trait::async_trait;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User, UserChanges};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Duplicate email: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Keyed user storage. Implementations must enforce email uniqueness
/// themselves; `insert` reports a clash as [`StoreError::Duplicate`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    async fn update_by_email(
        &self,
        email: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError>;
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, date_of_birth, role, image_url, premium, created_at, updated_at";

/// Schema migrations; the `users` table carries the email UNIQUE constraint
/// the rest of the service relies on.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        MIGRATOR.run(&db).await.context("run migrations")?;
        info!("database migrations applied");

        Ok(Self { db })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let inserted = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, date_of_birth, role, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.date_of_birth)
        .bind(&user.role)
        .bind(&user.image_url)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Duplicate(user.email.clone())
            }
            other => StoreError::Database(other),
        })?;
        debug!(user_id = %inserted.id, "user row inserted");
        Ok(inserted)
    }

    async fn update_by_email(
        &self,
        email: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let updated = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                date_of_birth = COALESCE($3, date_of_birth),
                role = COALESCE($4, role),
                image_url = COALESCE($5, image_url),
                password_hash = COALESCE($6, password_hash),
                updated_at = now()
            WHERE email = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(changes.name)
        .bind(changes.date_of_birth)
        .bind(changes.role)
        .bind(changes.image_url)
        .bind(changes.password_hash)
        .fetch_optional(&self.db)
        .await?;
        Ok(updated)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
