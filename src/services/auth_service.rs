//! Authentication service - Handles identity and session tokens.
//!
//! Tokens are HS256 JWTs carrying the user id and role. They live for
//! `jwt_expiration_days` and are re-issued by [`AuthService::refresh_if_expiring`]
//! once less than `jwt_refresh_threshold_hours` remain.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, ROLE_ADMIN, SECONDS_PER_DAY};
use crate::domain::{user::normalize_email, NewUser, Password, User, UserResponse, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Session returned by signup and login
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthSession {
    /// JWT, also set as the `token` cookie
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: UserResponse,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a regular account and open a session for it
    async fn signup(&self, name: String, email: String, password: String)
        -> AppResult<AuthSession>;

    async fn login(&self, email: String, password: String) -> AppResult<AuthSession>;

    /// The account behind a verified token
    async fn me(&self, user_id: Uuid) -> AppResult<User>;

    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()>;

    fn issue_token(&self, user_id: Uuid, role: UserRole) -> AppResult<String>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// A fresh token when `claims` is close to expiry, `None` otherwise
    fn refresh_if_expiring(&self, claims: &Claims) -> AppResult<Option<String>>;

    /// Token lifetime in seconds, used for the cookie `Max-Age`
    fn token_max_age(&self) -> i64;
}

fn generate_token(user_id: Uuid, role: &str, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::days(config.jwt_expiration_days);

    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    fn session_for(&self, user: User) -> AppResult<AuthSession> {
        let token = generate_token(user.id, user.role.as_str(), &self.config)?;
        Ok(AuthSession {
            token,
            user: UserResponse::from(user),
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn signup(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> AppResult<AuthSession> {
        let settings = self.uow.settings().get_or_create().await?;
        if !settings.allow_registration {
            return Err(AppError::forbidden("Registration is currently disabled"));
        }

        let email = normalize_email(&email);
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .uow
            .users()
            .create(NewUser {
                name: name.trim().to_string(),
                email,
                password_hash,
                role: UserRole::User,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.session_for(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthSession> {
        let user = self
            .uow
            .users()
            .find_by_email(&normalize_email(&email))
            .await?;

        // Verify against a dummy hash for unknown emails so both paths cost the same
        let stored = match &user {
            Some(user) => Password::from_hash(user.password_hash.clone()),
            None => Password::unmatchable(),
        };
        let password_valid = stored.verify(&password);

        match user {
            Some(user) if password_valid => self.session_for(user),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn me(&self, user_id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let user = self.me(user_id).await?;
        if !Password::from_hash(user.password_hash).verify(&current_password) {
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = Password::new(&new_password)?.into_string();
        self.uow
            .users()
            .update_password(user_id, password_hash)
            .await
    }

    fn issue_token(&self, user_id: Uuid, role: UserRole) -> AppResult<String> {
        generate_token(user_id, role.as_str(), &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    fn refresh_if_expiring(&self, claims: &Claims) -> AppResult<Option<String>> {
        let remaining = claims.exp - Utc::now().timestamp();
        if remaining >= Duration::hours(self.config.jwt_refresh_threshold_hours).num_seconds() {
            return Ok(None);
        }

        tracing::debug!(user_id = %claims.sub, "Rotating expiring token");
        generate_token(claims.sub, &claims.role, &self.config).map(Some)
    }

    fn token_max_age(&self) -> i64 {
        self.config.jwt_expiration_days * SECONDS_PER_DAY
    }
}
