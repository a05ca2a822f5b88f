#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

use portal_api::auth::{NewAccount, MIN_BCRYPT_COST};
use portal_api::config::{AppConfig, SeedConfig};
use portal_api::state::AppState;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const USER_EMAIL: &str = "user@example.com";
pub const USER_PASSWORD: &str = "user-password";

/// In-process API server over a throwaway data directory.
///
/// Seeded with one admin and one standard user. The directory lives as long
/// as the server handle.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub jwt_secret: String,
    pub data_dir: PathBuf,
    _dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(customize: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let dir = TempDir::new().context("failed to create data dir")?;
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;

        let mut config = AppConfig::development();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.storage.data_dir = dir.path().join("data");
        config.security.bcrypt_cost = MIN_BCRYPT_COST;
        config.seed = SeedConfig {
            admin_email: Some(ADMIN_EMAIL.to_string()),
            admin_password: Some(ADMIN_PASSWORD.to_string()),
            admin_name: Some("Admin".to_string()),
        };
        customize(&mut config);

        let jwt_secret = config.security.jwt_secret.clone();
        let data_dir = config.storage.data_dir.clone();
        let registration = config.security.enable_registration;
        let bind_addr = config.bind_addr();

        let state = AppState::initialize(config).await?;
        if registration {
            state
                .auth
                .register(NewAccount {
                    name: Some("Standard User".to_string()),
                    email: USER_EMAIL.to_string(),
                    password: USER_PASSWORD.to_string(),
                })
                .await?;
        }

        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", bind_addr))?;
        let app = portal_api::app(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            jwt_secret,
            data_dir,
            _dir: dir,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in and return the bearer token
    pub async fn token(&self, email: &str, password: &str) -> Result<String> {
        let res = reqwest::Client::new()
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body = res.json::<Value>().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response without token")
    }

    pub async fn admin_token(&self) -> Result<String> {
        self.token(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn user_token(&self) -> Result<String> {
        self.token(USER_EMAIL, USER_PASSWORD).await
    }
}
