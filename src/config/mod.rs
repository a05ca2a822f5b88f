use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::auth::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};

const DEV_JWT_SECRET: &str = "portal-dev-secret-change-me";

/// Longest accepted token lifetime (one year)
pub const MAX_JWT_EXPIRY_HOURS: u64 = 8760;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub enable_registration: bool,
}

/// Optional admin account created at startup when `users.json` has none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    pub admin_email: Option<String>,
    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
    pub admin_name: Option<String>,
}

impl StorageConfig {
    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    pub fn questions_file(&self) -> PathBuf {
        self.data_dir.join("questions.json")
    }

    pub fn projects_file(&self) -> PathBuf {
        self.data_dir.join("projects.json")
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORTAL_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("PORTAL_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Storage overrides
        if let Ok(v) = env::var("PORTAL_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_REGISTRATION") {
            self.security.enable_registration = v.parse().unwrap_or(self.security.enable_registration);
        }

        // Seed account
        self.seed.admin_email = env::var("PORTAL_SEED_ADMIN_EMAIL").ok().or(self.seed.admin_email);
        self.seed.admin_password = env::var("PORTAL_SEED_ADMIN_PASSWORD").ok().or(self.seed.admin_password);
        self.seed.admin_name = env::var("PORTAL_SEED_ADMIN_NAME").ok().or(self.seed.admin_name);

        self
    }

    /// Reject configurations the server must not start with.
    ///
    /// Development falls back to a fixed secret so `cargo run` works out of
    /// the box; any other environment needs an explicit `JWT_SECRET`.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.security.jwt_secret.is_empty() {
            anyhow::bail!("JWT_SECRET must be set in {:?} mode", self.environment);
        }
        if self.environment != Environment::Development && self.security.jwt_secret == DEV_JWT_SECRET {
            anyhow::bail!("the development JWT secret cannot be used in {:?} mode", self.environment);
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.security.bcrypt_cost) {
            anyhow::bail!(
                "SECURITY_BCRYPT_COST must be between {} and {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            );
        }
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&self.security.jwt_expiry_hours) {
            anyhow::bail!(
                "SECURITY_JWT_EXPIRY_HOURS must be between 1 and {}",
                MAX_JWT_EXPIRY_HOURS
            );
        }
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.security.jwt_secret == DEV_JWT_SECRET
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn default_cors_origins() -> Vec<String> {
        vec![
            "http://localhost:8080".to_string(),
            "https://kiranregmi.com".to_string(),
        ]
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("./data"),
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 2,
                bcrypt_cost: 10,
                cors_origins: Self::default_cors_origins(),
                enable_registration: true,
            },
            seed: SeedConfig::default(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            security: SecurityConfig {
                jwt_secret: String::new(),
                ..Self::development().security
            },
            ..Self::development()
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            security: SecurityConfig {
                jwt_secret: String::new(),
                bcrypt_cost: 12,
                cors_origins: vec!["https://kiranregmi.com".to_string()],
                ..Self::development().security
            },
            ..Self::development()
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.security.jwt_expiry_hours, 2);
        assert!(config.security.enable_registration);
        assert!(config.uses_dev_secret());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_secret() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert!(config.validate().is_err());

        let mut config = AppConfig::production();
        config.security.jwt_secret = "a-real-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dev_secret_rejected_outside_development() {
        let mut config = AppConfig::staging();
        config.security.jwt_secret = DEV_JWT_SECRET.to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let mut config = AppConfig::development();
        config.security.bcrypt_cost = MIN_BCRYPT_COST;
        assert!(config.validate().is_ok());
        config.security.bcrypt_cost = MAX_BCRYPT_COST;
        assert!(config.validate().is_ok());
        config.security.bcrypt_cost = MIN_BCRYPT_COST - 1;
        assert!(config.validate().is_err());
        config.security.bcrypt_cost = MAX_BCRYPT_COST + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_lifetime_bounds() {
        let mut config = AppConfig::development();
        config.security.jwt_expiry_hours = 0;
        assert!(config.validate().is_err());
        config.security.jwt_expiry_hours = MAX_JWT_EXPIRY_HOURS;
        assert!(config.validate().is_ok());
        config.security.jwt_expiry_hours = 3_000_000_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_paths() {
        let config = AppConfig::development();
        assert!(config.storage.users_file().ends_with("users.json"));
        assert!(config.storage.questions_file().ends_with("questions.json"));
        assert!(config.storage.projects_file().ends_with("projects.json"));
    }
}
