//! In-memory demo store.
//!
//! Used when the credential store cannot be reached. Identities are synthesized
//! on demand, kept in a bounded cache with an idle timeout, and never written
//! anywhere else. Every identifier carries [`DEMO_ID_PREFIX`] so it cannot
//! collide with a persisted one.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::{StoreError, UserRepository};
use crate::database::{NewUser, Role, User, UserChanges};

/// Marks identifiers that were never persisted
pub const DEMO_ID_PREFIX: &str = "demo_";

/// Email reported for demo identities we know nothing about
pub const DEMO_EMAIL: &str = "demo@example.com";

#[derive(Debug, Clone)]
struct DemoEntry {
    user: User,
    last_access: Instant,
}

/// `UserRepository` that never misses and never persists
pub struct EphemeralRepository {
    entries: DashMap<String, DemoEntry>,
    capacity: usize,
    idle_ttl: Duration,
}

pub fn is_demo_id(id: &str) -> bool {
    id.starts_with(DEMO_ID_PREFIX)
}

fn demo_id() -> String {
    format!("{DEMO_ID_PREFIX}{}", Uuid::new_v4().simple())
}

impl EphemeralRepository {
    pub fn new(capacity: usize, idle_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
            idle_ttl,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Synthesize a demo identity without a password hash
    pub fn synthesize(name: &str, email: &str) -> User {
        User {
            id: demo_id(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: None,
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    /// Drop idle entries, then the least recently used ones (never `keep`)
    /// until the cache is back within capacity
    fn evict(&self, keep: &str) {
        let now = Instant::now();
        self.entries
            .retain(|_, entry| now.duration_since(entry.last_access) < self.idle_ttl);

        while self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.last_access)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Insert first and trim afterwards, so the bound holds once every
    /// concurrent caller has returned
    fn remember(&self, user: User) -> User {
        self.entries.insert(
            user.id.clone(),
            DemoEntry {
                user: user.clone(),
                last_access: Instant::now(),
            },
        );
        self.evict(&user.id);
        user
    }

    /// Fetch a live entry and refresh its last-access time
    fn touch(&self, id: &str) -> Option<User> {
        let mut entry = self.entries.get_mut(id)?;
        if entry.last_access.elapsed() >= self.idle_ttl {
            drop(entry);
            self.entries.remove(id);
            return None;
        }
        entry.last_access = Instant::now();
        Some(entry.user.clone())
    }

    fn find_id_by_email(&self, email: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| entry.user.email == email)
            .map(|entry| entry.key().clone())
    }
}

#[async_trait]
impl UserRepository for EphemeralRepository {
    /// Known demo identities are returned as-is; otherwise one is synthesized
    /// with the email's local part as display name.
    async fn find_by_email(
        &self,
        email: &str,
        _include_hash: bool,
    ) -> Result<Option<User>, StoreError> {
        if let Some(user) = self.find_id_by_email(email).and_then(|id| self.touch(&id)) {
            return Ok(Some(user));
        }
        let name = email.split('@').next().unwrap_or(email);
        Ok(Some(self.remember(Self::synthesize(name, email))))
    }

    /// Unknown identifiers get a minimal profile keyed by the identifier itself
    async fn find_by_id(&self, id: &str, _include_hash: bool) -> Result<Option<User>, StoreError> {
        if let Some(user) = self.touch(id) {
            return Ok(Some(user));
        }
        let name = if is_demo_id(id) { "Demo User" } else { "User" };
        Ok(Some(User {
            id: id.to_string(),
            ..Self::synthesize(name, DEMO_EMAIL)
        }))
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        Ok(self.remember(Self::synthesize(&user.name, &user.email)))
    }

    async fn update_by_id(
        &self,
        id: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let Some(mut entry) = self.entries.get_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            entry.user.name = name;
        }
        if let Some(email) = changes.email {
            entry.user.email = email;
        }
        entry.last_access = Instant::now();
        Ok(Some(entry.user.clone()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
