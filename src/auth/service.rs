use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{generate_jwt, hash_password, validate_jwt, verify_password, AuthError, Claims};
use crate::config::{SecurityConfig, SeedConfig};
use crate::database::models::{Role, User, UserSummary};
use crate::database::{StoreError, UserRepository};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_in: u64,
    pub user: UserSummary,
}

/// Body of `POST /api/register`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAccount {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Password checks, token issuance and sign-up against `users.json`.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<UserRepository>,
    security: SecurityConfig,
    // Compared against when the email is unknown so both failure paths cost one bcrypt verify
    dummy_hash: Arc<str>,
}

impl AuthService {
    pub fn new(users: Arc<UserRepository>, security: SecurityConfig) -> Result<Self, AuthError> {
        let dummy_hash = bcrypt::hash("portal-login-timing-equalizer", security.bcrypt_cost)
            .map_err(|e| AuthError::Hash(e.to_string()))?;

        Ok(Self {
            users,
            security,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Verify credentials and issue a token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller
    /// and in the logs.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Email and password are required.".to_string()));
        }

        let user = self.users.find_by_email(email).await;
        let hash = match &user {
            Some(u) => u.password.clone(),
            None => self.dummy_hash.to_string(),
        };
        let valid = verify_password(password.to_string(), hash).await?;

        let user = match user {
            Some(user) if valid => user,
            _ => {
                warn!("Rejected login for {}", email);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let claims = Claims::for_user(&user, self.security.jwt_expiry_hours)?;
        let token = generate_jwt(&claims, &self.security.jwt_secret)?;
        info!("{} logged in as {}", user.email, user.role);

        Ok(LoginOutcome {
            token,
            expires_in: self.security.jwt_expiry_hours.saturating_mul(3600),
            user: user.summary(),
        })
    }

    /// Create a standard account. The role is always `user`.
    pub async fn register(&self, account: NewAccount) -> Result<UserSummary, AuthError> {
        if !self.security.enable_registration {
            return Err(AuthError::RegistrationDisabled);
        }

        let email = account.email.trim().to_string();
        if email.is_empty() || account.password.is_empty() {
            return Err(AuthError::Validation("Email and password are required.".to_string()));
        }
        if !looks_like_email(&email) {
            return Err(AuthError::Validation("A valid email address is required.".to_string()));
        }

        // Cheap pre-check before paying for a hash; the repository re-checks under its lock
        if self.users.find_by_email(&email).await.is_some() {
            warn!("Rejected duplicate registration for {}", email);
            return Err(AuthError::Store(StoreError::Conflict("User already exists.".to_string())));
        }

        let name = account
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.clone());
        let password = hash_password(account.password, self.security.bcrypt_cost).await?;

        let summary = self
            .users
            .register(User {
                name,
                email,
                password,
                role: Role::User,
            })
            .await?;
        Ok(summary)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        validate_jwt(token, &self.security.jwt_secret)
    }

    /// Create the configured admin account if `users.json` has no admin.
    pub async fn seed_admin(&self, seed: &SeedConfig) -> Result<(), AuthError> {
        let (Some(email), Some(password)) = (&seed.admin_email, &seed.admin_password) else {
            if !self.users.has_admin().await {
                warn!("No admin account exists; set PORTAL_SEED_ADMIN_EMAIL and PORTAL_SEED_ADMIN_PASSWORD to create one");
            }
            return Ok(());
        };

        if self.users.has_admin().await {
            return Ok(());
        }

        let hash = hash_password(password.clone(), self.security.bcrypt_cost).await?;
        let admin = User {
            name: seed.admin_name.clone().unwrap_or_else(|| "Administrator".to_string()),
            email: email.trim().to_string(),
            password: hash,
            role: Role::Admin,
        };

        if self.users.ensure_admin(admin).await? {
            info!("Seeded admin account {}", email);
        }
        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
