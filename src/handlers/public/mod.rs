// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and self-service sign-up. Every input is untrusted.
pub mod auth;
