//! PostgreSQL identity store.
//!
//! Uniqueness is enforced by the table's UNIQUE constraints; a violation is
//! translated back into [`StoreError::Duplicate`] by constraint name.
//! Uses runtime queries to avoid sqlx compile-time database connection.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;

use super::memory::dedup_roles;
use super::models::{Identity, NewIdentity, Role};
use super::store::{IdentityStore, StoreError, UniqueField};
use crate::db::Database;

const USERNAME_CONSTRAINT: &str = "identities_username_key";
const EMAIL_CONSTRAINT: &str = "identities_email_key";

const CREATE_IDENTITIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS identities (
    id            BIGSERIAL PRIMARY KEY,
    username      TEXT NOT NULL CHECK (username <> ''),
    email         TEXT NOT NULL CHECK (email <> ''),
    password_hash TEXT NOT NULL,
    roles         TEXT[] NOT NULL CHECK (cardinality(roles) > 0),
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT identities_username_key UNIQUE (username),
    CONSTRAINT identities_email_key UNIQUE (email)
)
"#;

const SELECT_COLUMNS: &str = "id, username, email, password_hash, roles, created_at";

pub struct PgIdentityStore {
    db: Arc<Database>,
}

impl PgIdentityStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create the `identities` table if it does not exist.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_IDENTITIES_TABLE)
            .execute(self.db.pool())
            .await?;
        tracing::info!("identities table ready");
        Ok(())
    }

    async fn find_by(&self, column: &str, value: &str) -> Result<Option<Identity>, StoreError> {
        let sql = format!(
            "SELECT {} FROM identities WHERE {} = $1",
            SELECT_COLUMNS, column
        );
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(self.db.pool())
            .await?;
        row.map(|r| row_to_identity(&r)).transpose()
    }
}

fn row_to_identity(row: &PgRow) -> Result<Identity, StoreError> {
    let raw_roles: Vec<String> = row.try_get("roles")?;
    let roles = raw_roles
        .iter()
        .map(|r| r.parse::<Role>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::Corrupt)?;

    Ok(Identity {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        roles,
        created_at: row.try_get("created_at")?,
    })
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    let field = match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => Some(UniqueField::Username),
                Some(EMAIL_CONSTRAINT) => Some(UniqueField::Email),
                _ => None,
            }
        }
        _ => None,
    };
    match field {
        Some(field) => StoreError::Duplicate(field),
        None => StoreError::Database(err),
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        self.find_by("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        self.find_by("email", email).await
    }

    async fn insert(&self, new: NewIdentity) -> Result<Identity, StoreError> {
        if new.roles.is_empty() {
            return Err(StoreError::NoRoles);
        }
        let roles: Vec<String> = dedup_roles(new.roles)
            .into_iter()
            .map(|r| r.as_str().to_string())
            .collect();

        let sql = format!(
            "INSERT INTO identities (username, email, password_hash, roles) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            SELECT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(&roles)
            .fetch_one(self.db.pool())
            .await
            .map_err(map_unique_violation)?;

        row_to_identity(&row)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM identities")
            .fetch_one(self.db.pool())
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as u64)
    }
}
