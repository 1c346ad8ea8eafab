use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::account::error::AccountError;
use crate::account::model::{NewUserRecord, User};
use crate::account::password;
use crate::store::{RecordStore, StoreError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Account operations over a [`RecordStore`].
///
/// The service holds the store handle it is constructed with. Identity
/// normalization, validation, password hashing and default authorization
/// flags live here; the store owns the atomicity of the unique insert.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn RecordStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create an ordinary user. `name` may be empty.
    #[instrument(skip(self, password))]
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AccountError> {
        self.create(email, password, name, false, false).await
    }

    /// Create a superuser: `is_staff` and `is_superuser` forced on.
    #[instrument(skip(self, password))]
    pub async fn create_superuser(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AccountError> {
        self.create(email, password, name, true, true).await
    }

    async fn create(
        &self,
        email: &str,
        password: &str,
        name: &str,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<User, AccountError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            warn!("user creation without email");
            return Err(AccountError::MissingField { field: "email" });
        }
        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(AccountError::InvalidEmail { email });
        }

        // Ensure email is not taken
        if self.store.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AccountError::DuplicateIdentity { email });
        }

        let password_hash = password::hash_password(password)?;
        let record = NewUserRecord {
            id: Uuid::new_v4(),
            email: email.clone(),
            name: name.to_string(),
            password_hash,
            is_staff,
            is_superuser,
            date_joined: OffsetDateTime::now_utc(),
        };

        // The store's unique constraint still decides races that the
        // pre-check above cannot see.
        let user = match self.store.insert_unique(record).await {
            Ok(u) => u,
            Err(StoreError::DuplicateEmail) => {
                warn!(email = %email, "email already registered");
                return Err(AccountError::DuplicateIdentity { email });
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            user_id = %user.id,
            email = %user.email,
            superuser = user.is_superuser,
            "user created"
        );
        Ok(user)
    }

    /// Look up a user by email, normalized the same way as at creation.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        let email = email.trim().to_lowercase();
        Ok(self.store.find_by_email(&email).await?)
    }

    /// Check a plaintext password against the stored hash. No side effects.
    pub fn verify_password(&self, user: &User, plaintext: &str) -> Result<bool, AccountError> {
        password::verify_password(plaintext, &user.password_hash)
    }

    /// Verify credentials and stamp `last_login` on success.
    ///
    /// Unknown email, inactive account and wrong password all come back
    /// as `Ok(None)`.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AccountError> {
        let mut user = match self.find_by_email(email).await? {
            Some(u) => u,
            None => {
                warn!(email = %email, "authentication for unknown email");
                return Ok(None);
            }
        };

        if !user.is_active {
            warn!(user_id = %user.id, "authentication for inactive user");
            return Ok(None);
        }

        if !password::verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "authentication with invalid password");
            return Ok(None);
        }

        let now = OffsetDateTime::now_utc();
        self.store.touch_last_login(user.id, now).await?;
        user.last_login = Some(now);

        info!(user_id = %user.id, "user authenticated");
        Ok(Some(user))
    }
}
