//! In-memory `UserRepository` with failure injection, for tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, UserRepository};
use crate::database::{NewUser, User, UserChanges};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Unavailable,
    Backend,
}

impl Failure {
    fn error(self) -> StoreError {
        match self {
            Failure::Unavailable => StoreError::Unavailable("connection refused".to_string()),
            Failure::Backend => StoreError::Backend("write conflict".to_string()),
        }
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
    op_failure: RwLock<Option<Failure>>,
    ping_failure: RwLock<Option<Failure>>,
    ping_delay: RwLock<Option<Duration>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call, the probe included
    pub async fn fail_with(&self, failure: Option<Failure>) {
        *self.op_failure.write().await = failure;
        *self.ping_failure.write().await = failure;
    }

    /// Let the probe succeed but fail the data operations after it
    pub async fn fail_ops_with(&self, failure: Option<Failure>) {
        *self.op_failure.write().await = failure;
    }

    pub async fn set_ping_delay(&self, delay: Duration) {
        *self.ping_delay.write().await = Some(delay);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Raw record, hash included, bypassing failure injection
    pub async fn get(&self, id: &str) -> Option<User> {
        self.users.read().await.get(id).cloned()
    }

    async fn check(&self) -> Result<(), StoreError> {
        match *self.op_failure.read().await {
            Some(failure) => Err(failure.error()),
            None => Ok(()),
        }
    }
}

fn project(user: &User, include_hash: bool) -> User {
    let mut user = user.clone();
    if !include_hash {
        user.password_hash = None;
    }
    user
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(
        &self,
        email: &str,
        include_hash: bool,
    ) -> Result<Option<User>, StoreError> {
        self.check().await?;
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.email == email)
            .map(|user| project(user, include_hash)))
    }

    async fn find_by_id(&self, id: &str, include_hash: bool) -> Result<Option<User>, StoreError> {
        self.check().await?;
        let users = self.users.read().await;
        Ok(users.get(id).map(|user| project(user, include_hash)))
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        self.check().await?;
        let violations = user.schema_violations();
        if !violations.is_empty() {
            return Err(StoreError::Validation(violations));
        }

        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let record = User {
            id: Uuid::new_v4().to_string(),
            name: user.name,
            email: user.email,
            password_hash: Some(user.password_hash),
            role: user.role,
            created_at: Utc::now(),
        };
        users.insert(record.id.clone(), record.clone());
        Ok(project(&record, false))
    }

    async fn update_by_id(
        &self,
        id: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        self.check().await?;
        let violations = changes.schema_violations();
        if !violations.is_empty() {
            return Err(StoreError::Validation(violations));
        }

        let mut users = self.users.write().await;
        if let Some(email) = &changes.email {
            if users.values().any(|other| other.id != id && &other.email == email) {
                return Err(StoreError::DuplicateEmail);
            }
        }
        let Some(user) = users.get_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = Some(hash);
        }
        Ok(Some(project(user, false)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if let Some(delay) = *self.ping_delay.read().await {
            tokio::time::sleep(delay).await;
        }
        match *self.ping_failure.read().await {
            Some(failure) => Err(failure.error()),
            None => Ok(()),
        }
    }
}
