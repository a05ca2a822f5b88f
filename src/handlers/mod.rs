// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (JWT auth, any role) → Elevated (JWT auth, admin role)
pub mod elevated; // Tier 3: admin-only mutations and listings
pub mod protected; // Tier 2: JWT authentication required (/api/*)
pub mod public; // Tier 1: No authentication required (/api/login, /api/register)
