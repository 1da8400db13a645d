//! Persisted credential store backed by the PostgreSQL `users` table.

use async_trait::async_trait;
use deadpool_postgres::{Pool, PoolError};
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use super::{StoreError, UserRepository};
use crate::database::{FromRow, NewUser, User, UserChanges};

const PUBLIC_COLUMNS: &str = "id, name, email, role, created_at";
const ALL_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

fn columns(include_hash: bool) -> &'static str {
    if include_hash { ALL_COLUMNS } else { PUBLIC_COLUMNS }
}

/// `UserRepository` over a deadpool-postgres pool
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: Pool,
}

impl PostgresUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn client(&self) -> Result<deadpool_postgres::Object, StoreError> {
        self.pool.get().await.map_err(StoreError::from)
    }
}

impl From<PoolError> for StoreError {
    fn from(err: PoolError) -> Self {
        // Every pool failure means no usable connection
        StoreError::Unavailable(err.to_string())
    }
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_error) = err.as_db_error() {
            let code = db_error.code();
            if *code == SqlState::UNIQUE_VIOLATION {
                return StoreError::DuplicateEmail;
            }
            if *code == SqlState::CHECK_VIOLATION
                || *code == SqlState::NOT_NULL_VIOLATION
                || *code == SqlState::STRING_DATA_RIGHT_TRUNCATION
            {
                tracing::warn!("users table rejected a write: {}", db_error.message());
                return StoreError::Validation(vec!["Invalid user data".to_string()]);
            }
            return StoreError::Backend(db_error.message().to_string());
        }

        let io_failure = std::error::Error::source(&err)
            .is_some_and(|source| source.is::<std::io::Error>());
        if err.is_closed() || io_failure {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

/// Non-UUID identifiers (demo users among them) can never match a stored row
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

fn user_from_row(row: &tokio_postgres::Row) -> Result<User, StoreError> {
    User::from_row(row).map_err(StoreError::from)
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(
        &self,
        email: &str,
        include_hash: bool,
    ) -> Result<Option<User>, StoreError> {
        let client = self.client().await?;
        let query = format!("SELECT {} FROM users WHERE email = $1", columns(include_hash));
        let row = client.query_opt(query.as_str(), &[&email]).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: &str, include_hash: bool) -> Result<Option<User>, StoreError> {
        let Some(uuid) = parse_id(id) else {
            return Ok(None);
        };
        let client = self.client().await?;
        let query = format!("SELECT {} FROM users WHERE id = $1", columns(include_hash));
        let row = client.query_opt(query.as_str(), &[&uuid]).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let violations = user.schema_violations();
        if !violations.is_empty() {
            return Err(StoreError::Validation(violations));
        }

        let client = self.client().await?;
        let id = Uuid::new_v4();
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PUBLIC_COLUMNS}"
        );
        let row = client
            .query_one(
                query.as_str(),
                &[&id, &user.name, &user.email, &user.password_hash, &user.role.as_str()],
            )
            .await?;

        tracing::debug!("Created user {}", id);
        user_from_row(&row)
    }

    async fn update_by_id(
        &self,
        id: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let violations = changes.schema_violations();
        if !violations.is_empty() {
            return Err(StoreError::Validation(violations));
        }
        let Some(uuid) = parse_id(id) else {
            return Ok(None);
        };

        let client = self.client().await?;
        let query = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                password_hash = COALESCE($4, password_hash), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {PUBLIC_COLUMNS}"
        );
        let row = client
            .query_opt(
                query.as_str(),
                &[&uuid, &changes.name, &changes.email, &changes.password_hash],
            )
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.client().await?;
        client.query("SELECT id FROM users LIMIT 1", &[]).await?;
        Ok(())
    }
}
