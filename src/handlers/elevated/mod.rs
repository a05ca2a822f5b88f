// handlers/elevated/mod.rs - Admin handlers (JWT authentication + admin role)
//
// Every mutation of questions.json and projects.json lands here.
pub mod projects; // POST/PUT/DELETE /api/projects[/:id]
pub mod questions; // POST/PUT/DELETE /api/questions[/:id]
pub mod users; // GET /api/admin/users
