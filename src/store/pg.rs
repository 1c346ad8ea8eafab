use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::account::{NewUserRecord, User};
use crate::store::{RecordStore, StoreError};

/// PostgreSQL-backed record store.
///
/// Email uniqueness is enforced by the unique constraint on
/// `users.email`; SQLSTATE 23505 from the insert is reported as
/// [`StoreError::DuplicateEmail`].
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert_unique(&self, record: NewUserRecord) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, password_hash, is_staff, is_superuser, date_joined)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, name, password_hash, avatar,
                      is_active, is_staff, is_superuser, date_joined, last_login
            "#,
        )
        .bind(record.id)
        .bind(&record.email)
        .bind(&record.name)
        .bind(&record.password_hash)
        .bind(record.is_staff)
        .bind(record.is_superuser)
        .bind(record.date_joined)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                StoreError::DuplicateEmail
            }
            _ => StoreError::Database(e),
        })?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, avatar,
                   is_active, is_staff, is_superuser, date_joined, last_login
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn touch_last_login(&self, id: Uuid, when: OffsetDateTime) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(when)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
