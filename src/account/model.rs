use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                           // unique user ID
    pub email: String,                      // login identity, unique
    pub name: String,                       // display name, may be empty
    #[serde(skip_serializing)]
    pub password_hash: String,              // Argon2 hash, not exposed in JSON
    pub avatar: Option<String>,             // object key of the avatar image, if any
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: OffsetDateTime,        // creation timestamp
    pub last_login: Option<OffsetDateTime>, // set on successful authentication
}

/// Users display as their email, the identity they log in with.
impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Payload for inserting a new user row.
///
/// `is_active`, `avatar` and `last_login` are not part of the payload:
/// every new row starts active, without an avatar and never logged in.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            name: "Jose Maria".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            avatar: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: OffsetDateTime::now_utc(),
            last_login: None,
        }
    }

    #[test]
    fn display_is_the_email() {
        let user = sample_user();
        assert_eq!(user.to_string(), "test@example.com");
    }

    #[test]
    fn serialization_never_exposes_the_password_hash() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$argon2id$fake"));
    }
}
