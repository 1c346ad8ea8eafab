use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::account::{NewUserRecord, User};
use crate::store::{RecordStore, StoreError};

/// In-memory record store, used by the test suites.
///
/// A single mutex around the map keeps the check-plus-insert atomic.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, User>>, // keyed by normalized email
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_unique(&self, record: NewUserRecord) -> Result<User, StoreError> {
        let mut users = self.users.lock().expect("user store mutex poisoned");
        if users.contains_key(&record.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: record.id,
            email: record.email.clone(),
            name: record.name,
            password_hash: record.password_hash,
            avatar: None,
            is_active: true,
            is_staff: record.is_staff,
            is_superuser: record.is_superuser,
            date_joined: record.date_joined,
            last_login: None,
        };
        users.insert(record.email, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().expect("user store mutex poisoned");
        Ok(users.get(email).cloned())
    }

    async fn touch_last_login(&self, id: Uuid, when: OffsetDateTime) -> Result<(), StoreError> {
        let mut users = self.users.lock().expect("user store mutex poisoned");
        if let Some(user) = users.values_mut().find(|u| u.id == id) {
            user.last_login = Some(when);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn record(email: &str) -> NewUserRecord {
        NewUserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: String::new(),
            password_hash: "$argon2id$fake".to_string(),
            is_staff: false,
            is_superuser: false,
            date_joined: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = MemoryStore::new();
        let created = store.insert_unique(record("test@example.com")).await.unwrap();
        assert!(created.is_active);
        assert!(created.last_login.is_none());

        let found = store.find_by_email("test@example.com").await.unwrap();
        assert_eq!(found.unwrap().id, created.id);

        let missing = store.find_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn second_insert_with_same_email_is_rejected() {
        let store = MemoryStore::new();
        store.insert_unique(record("test@example.com")).await.unwrap();
        let err = store
            .insert_unique(record("test@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.insert_unique(record("race@example.com")).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.insert_unique(record("race@example.com")).await })
        };
        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    }

    #[tokio::test]
    async fn touch_last_login_updates_the_record() {
        let store = MemoryStore::new();
        let created = store.insert_unique(record("test@example.com")).await.unwrap();

        let when = OffsetDateTime::now_utc();
        store.touch_last_login(created.id, when).await.unwrap();

        let found = store
            .find_by_email("test@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.last_login, Some(when));
    }
}
