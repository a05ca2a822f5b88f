pub mod project;
pub mod question;
pub mod user;

pub use project::{NewProject, Project, ProjectPatch};
pub use question::{NewQuestion, Question, QuestionPatch};
pub use user::{Role, User, UserSummary};
