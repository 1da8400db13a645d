//! Auth Service
//!
//! Registration, login, profile and password operations. Each call decides
//! between the persisted credential store and the ephemeral demo store:
//! registration consults the availability probe up front, while login and
//! profile reads switch over when the store reports `StoreError::Unavailable`.
//! Demo identities are never written to the persisted store.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::models::{
    ChangePasswordRequest, DemoReason, LoginRequest, Profile, PublicUser, RegisterRequest,
    Session, UpdateProfileRequest,
};
use crate::auth::validation::{self, Registration};
use crate::auth::{JwtService, PasswordService};
use crate::config::AuthConfig;
use crate::database::{NewUser, Role, User, UserChanges};
use crate::error::AuthError;
use crate::repository::{
    Availability, EphemeralRepository, StoreError, UserRepository, probe,
};

const REGISTER_FAILED: &str = "Server error during registration";
const LOGIN_FAILED: &str = "Server error during login";
const PROFILE_FAILED: &str = "Server error";
const UPDATE_FAILED: &str = "Server error during profile update";
const PASSWORD_FAILED: &str = "Server error during password change";

/// Knobs that shape the demo fallback
#[derive(Debug, Clone, Copy)]
pub struct AuthPolicy {
    pub probe_timeout: Duration,
    /// Serve a demo registration when the store fails with a non-connectivity error
    pub demo_on_store_error: bool,
}

impl From<&AuthConfig> for AuthPolicy {
    fn from(config: &AuthConfig) -> Self {
        Self {
            probe_timeout: config.probe_timeout,
            demo_on_store_error: config.demo_on_store_error,
        }
    }
}

pub struct AuthService {
    store: Arc<dyn UserRepository>,
    demo: Arc<EphemeralRepository>,
    jwt: Arc<JwtService>,
    passwords: PasswordService,
    policy: AuthPolicy,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserRepository>,
        demo: Arc<EphemeralRepository>,
        jwt: Arc<JwtService>,
        passwords: PasswordService,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            store,
            demo,
            jwt,
            passwords,
            policy,
        }
    }

    /// Probe the credential store with the configured timeout
    pub async fn store_availability(&self) -> Availability {
        probe(self.store.as_ref(), self.policy.probe_timeout).await
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<Session, AuthError> {
        let input = validation::registration(req)?;

        if self.store_availability().await == Availability::Unreachable {
            tracing::warn!("⚠️  Database not available, creating demo user...");
            return self.register_demo(&input, DemoReason::StoreUnreachable).await;
        }

        let password_hash = self.hash_password(&input.password, REGISTER_FAILED)?;
        match self.register_persisted(&input, password_hash).await {
            Ok(user) => {
                tracing::info!("Registered user {}", user.id);
                self.session(user, None, REGISTER_FAILED)
            }
            Err(StoreError::DuplicateEmail) => Err(AuthError::DuplicateEmail),
            Err(StoreError::Validation(messages)) => {
                Err(AuthError::Validation(messages.join(", ")))
            }
            Err(e) if e.is_unavailable() || self.policy.demo_on_store_error => {
                tracing::error!("Database error during registration: {}", e);
                self.register_demo(&input, DemoReason::StoreError).await
            }
            Err(e) => Err(self.fault(e, REGISTER_FAILED)),
        }
    }

    async fn register_persisted(
        &self,
        input: &Registration,
        password_hash: String,
    ) -> Result<User, StoreError> {
        if self.store.find_by_email(&input.email, false).await?.is_some() {
            return Err(StoreError::DuplicateEmail);
        }

        // The unique index still settles races between the check and the insert
        self.store
            .create(NewUser {
                name: input.name.clone(),
                email: input.email.clone(),
                password_hash,
                role: Role::User,
            })
            .await
    }

    async fn register_demo(
        &self,
        input: &Registration,
        reason: DemoReason,
    ) -> Result<Session, AuthError> {
        let user = self
            .demo
            .create(NewUser {
                name: input.name.clone(),
                email: input.email.clone(),
                password_hash: String::new(),
                role: Role::User,
            })
            .await
            .map_err(|e| self.fault(e, REGISTER_FAILED))?;
        tracing::info!("Registered demo user {} ({:?})", user.id, reason);
        self.session(user, Some(reason), REGISTER_FAILED)
    }

    /// Unknown email and wrong password fail identically, with the same hashing effort
    pub async fn login(&self, req: LoginRequest) -> Result<Session, AuthError> {
        let credentials = validation::credentials(req)?;

        match self.store.find_by_email(&credentials.email, true).await {
            Ok(Some(user)) => {
                let matches = match user.password_hash.as_deref() {
                    Some(hash) => self.passwords.verify(&credentials.password, hash),
                    None => self.passwords.verify_missing(&credentials.password),
                };
                if !matches {
                    return Err(AuthError::InvalidCredentials);
                }
                tracing::info!("User {} logged in", user.id);
                self.session(user, None, LOGIN_FAILED)
            }
            Ok(None) => {
                self.passwords.verify_missing(&credentials.password);
                Err(AuthError::InvalidCredentials)
            }
            Err(e) if e.is_unavailable() => {
                tracing::warn!("⚠️  Database not available, allowing demo login: {}", e);
                let user = self.demo_lookup(
                    self.demo.find_by_email(&credentials.email, false).await,
                    LOGIN_FAILED,
                )?;
                self.session(user, Some(DemoReason::StoreUnreachable), LOGIN_FAILED)
            }
            Err(e) => Err(self.fault(e, LOGIN_FAILED)),
        }
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, AuthError> {
        match self.store.find_by_id(user_id, false).await {
            Ok(Some(user)) => Ok(Profile {
                user: user.into(),
                demo: None,
            }),
            Ok(None) => Err(AuthError::NotFound),
            Err(e) if e.is_unavailable() => {
                tracing::warn!("⚠️  Database not available, returning demo user: {}", e);
                let user =
                    self.demo_lookup(self.demo.find_by_id(user_id, false).await, PROFILE_FAILED)?;
                Ok(Profile {
                    user: user.into(),
                    demo: Some(DemoReason::StoreUnreachable),
                })
            }
            Err(e) => Err(self.fault(e, PROFILE_FAILED)),
        }
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        req: UpdateProfileRequest,
    ) -> Result<PublicUser, AuthError> {
        let update = validation::profile_update(req)?;

        if let Some(email) = &update.email {
            match self.store.find_by_email(email, false).await {
                Ok(Some(owner)) if owner.id != user_id => return Err(AuthError::EmailTaken),
                Ok(_) => {}
                Err(e) => return Err(self.fault(e, UPDATE_FAILED)),
            }
        }

        let changes = UserChanges {
            name: update.name,
            email: update.email,
            password_hash: None,
        };
        match self.store.update_by_id(user_id, changes).await {
            Ok(Some(user)) => {
                tracing::info!("Updated profile of user {}", user.id);
                Ok(user.into())
            }
            Ok(None) => Err(AuthError::NotFound),
            Err(StoreError::DuplicateEmail) => Err(AuthError::EmailTaken),
            Err(StoreError::Validation(messages)) => {
                Err(AuthError::Validation(messages.join(", ")))
            }
            Err(e) => Err(self.fault(e, UPDATE_FAILED)),
        }
    }

    pub async fn change_password(
        &self,
        user_id: &str,
        req: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        let change = validation::password_change(req)?;

        let user = match self.store.find_by_id(user_id, true).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AuthError::NotFound),
            Err(e) => return Err(self.fault(e, PASSWORD_FAILED)),
        };

        let matches = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| self.passwords.verify(&change.current_password, hash));
        if !matches {
            return Err(AuthError::WrongPassword);
        }

        let changes = UserChanges {
            password_hash: Some(self.hash_password(&change.new_password, PASSWORD_FAILED)?),
            ..Default::default()
        };
        match self.store.update_by_id(user_id, changes).await {
            Ok(Some(_)) => {
                tracing::info!("Changed password of user {}", user_id);
                Ok(())
            }
            Ok(None) => Err(AuthError::NotFound),
            Err(e) => Err(self.fault(e, PASSWORD_FAILED)),
        }
    }

    fn session(
        &self,
        user: User,
        demo: Option<DemoReason>,
        context: &'static str,
    ) -> Result<Session, AuthError> {
        let issued = self.jwt.create_token(&user.id).map_err(|e| {
            tracing::error!("Failed to issue token: {:#}", e);
            AuthError::Unexpected(context)
        })?;
        Ok(Session {
            user: user.into(),
            token: issued.token,
            expires_at: issued.expires_at,
            demo,
        })
    }

    fn hash_password(&self, plain: &str, context: &'static str) -> Result<String, AuthError> {
        self.passwords.hash(plain).map_err(|e| {
            tracing::error!("Password hashing failed: {:#}", e);
            AuthError::Unexpected(context)
        })
    }

    fn demo_lookup(
        &self,
        found: Result<Option<User>, StoreError>,
        context: &'static str,
    ) -> Result<User, AuthError> {
        match found {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AuthError::Unexpected(context)),
            Err(e) => Err(self.fault(e, context)),
        }
    }

    /// Log the store error and hand the caller a generic one
    fn fault(&self, err: StoreError, context: &'static str) -> AuthError {
        if err.is_unavailable() {
            tracing::warn!("{}: {}", context, err);
            AuthError::StoreUnavailable
        } else {
            tracing::error!("{}: {}", context, err);
            AuthError::Unexpected(context)
        }
    }
}
