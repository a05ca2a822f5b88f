// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Read access for any authenticated role. Route Prefix: /api/*
pub mod auth; // GET /api/auth/whoami
pub mod projects; // GET /api/projects[/:id]
pub mod questions; // GET /api/questions[/:id]

use crate::error::ApiError;

/// Parse a numeric record id from the path
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid id '{}'", raw)))
}
