use std::path::PathBuf;

use chrono::Utc;
use tracing::info;

use crate::database::collection::JsonCollection;
use crate::database::manager::StoreError;
use crate::database::models::project::{parse_audit_date, DEFAULT_ASSIGNEE};
use crate::database::models::question::DEFAULT_CATEGORY;
use crate::database::models::{
    NewProject, NewQuestion, Project, ProjectPatch, Question, QuestionPatch, Role, User, UserSummary,
};

/// Accounts from `users.json`.
pub struct UserRepository {
    users: JsonCollection<User>,
}

impl UserRepository {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self {
            users: JsonCollection::open("users", path).await?,
        })
    }

    /// Case-insensitive lookup
    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users.find(|u| u.email_matches(email)).await
    }

    pub async fn list(&self) -> Vec<UserSummary> {
        self.users.snapshot().await.iter().map(User::summary).collect()
    }

    /// Insert a new account unless the email is already taken.
    ///
    /// The existence check runs under the same write lock as the insert, so
    /// two simultaneous sign-ups for one address cannot both succeed.
    pub async fn register(&self, user: User) -> Result<UserSummary, StoreError> {
        let summary = self
            .users
            .mutate(move |users| {
                if users.iter().any(|u| u.email_matches(&user.email)) {
                    return Err(StoreError::Conflict("User already exists.".to_string()));
                }
                let summary = user.summary();
                users.push(user);
                Ok(summary)
            })
            .await?;

        info!("Registered {} with role {}", summary.email, summary.role);
        Ok(summary)
    }

    pub async fn has_admin(&self) -> bool {
        self.users.find(|u| u.role.is_admin()).await.is_some()
    }

    /// Insert `admin` if no admin account exists yet. Returns whether it was added.
    pub async fn ensure_admin(&self, admin: User) -> Result<bool, StoreError> {
        self.users
            .mutate(move |users| {
                if users.iter().any(|u| u.role.is_admin()) {
                    return Ok(false);
                }
                if users.iter().any(|u| u.email_matches(&admin.email)) {
                    return Err(StoreError::Conflict(format!(
                        "{} exists but is not an admin",
                        admin.email
                    )));
                }
                users.push(User {
                    role: Role::Admin,
                    ..admin
                });
                Ok(true)
            })
            .await
    }
}

/// Interview questions from `questions.json`.
pub struct QuestionRepository {
    questions: JsonCollection<Question>,
}

impl QuestionRepository {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self {
            questions: JsonCollection::open("questions", path).await?,
        })
    }

    pub async fn list(&self) -> Vec<Question> {
        self.questions.snapshot().await
    }

    pub async fn get(&self, id: i64) -> Result<Question, StoreError> {
        self.questions
            .find(|q| q.id == id)
            .await
            .ok_or_else(|| question_not_found(id))
    }

    pub async fn create(&self, draft: NewQuestion) -> Result<Question, StoreError> {
        let question = draft.question.trim().to_string();
        let answer = draft.answer.trim().to_string();
        if question.is_empty() || answer.is_empty() {
            return Err(StoreError::Validation("question and answer are required".to_string()));
        }
        let category = draft
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let created = self
            .questions
            .mutate(move |questions| {
                let record = Question {
                    id: next_question_id(questions, Utc::now().timestamp_millis()),
                    question,
                    answer,
                    category,
                };
                questions.push(record.clone());
                Ok(record)
            })
            .await?;

        info!("Question {} added in {}", created.id, created.category);
        Ok(created)
    }

    pub async fn update(&self, id: i64, patch: QuestionPatch) -> Result<Question, StoreError> {
        self.questions
            .mutate(move |questions| {
                let existing = questions
                    .iter_mut()
                    .find(|q| q.id == id)
                    .ok_or_else(|| question_not_found(id))?;
                existing.apply(patch);
                Ok(existing.clone())
            })
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<Question, StoreError> {
        let removed = self
            .questions
            .mutate(move |questions| {
                let index = questions
                    .iter()
                    .position(|q| q.id == id)
                    .ok_or_else(|| question_not_found(id))?;
                Ok(questions.remove(index))
            })
            .await?;

        info!("Question {} deleted", id);
        Ok(removed)
    }
}

/// Millisecond timestamp id, bumped past the current maximum on collision.
fn next_question_id(existing: &[Question], now_millis: i64) -> i64 {
    if existing.iter().any(|q| q.id == now_millis) {
        existing.iter().map(|q| q.id).max().unwrap_or(now_millis) + 1
    } else {
        now_millis
    }
}

fn question_not_found(id: i64) -> StoreError {
    StoreError::NotFound(format!("Question {} not found", id))
}

/// GRC projects from `projects.json`.
pub struct ProjectRepository {
    projects: JsonCollection<Project>,
}

impl ProjectRepository {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self {
            projects: JsonCollection::open("projects", path).await?,
        })
    }

    pub async fn list(&self) -> Vec<Project> {
        self.projects.snapshot().await
    }

    pub async fn get(&self, id: i64) -> Result<Project, StoreError> {
        self.projects
            .find(|p| p.id == id)
            .await
            .ok_or_else(|| project_not_found(id))
    }

    pub async fn create(&self, draft: NewProject) -> Result<Project, StoreError> {
        if !draft.missing_fields().is_empty() {
            return Err(StoreError::Validation(
                "projectName, compliance, riskLevel, status required".to_string(),
            ));
        }
        let last_audit = parse_audit_date(draft.last_audit.as_deref())
            .map_err(StoreError::Validation)?
            .unwrap_or_else(|| Utc::now().date_naive());
        let assigned_to = draft
            .assigned_to
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ASSIGNEE.to_string());

        let created = self
            .projects
            .mutate(move |projects| {
                let id = projects.iter().map(|p| p.id).max().unwrap_or(0) + 1;
                let project = Project {
                    id,
                    project_name: draft.project_name,
                    compliance: draft.compliance,
                    risk_level: draft.risk_level,
                    status: draft.status,
                    last_audit,
                    assigned_to,
                };
                projects.push(project.clone());
                Ok(project)
            })
            .await?;

        info!("Project {} '{}' created", created.id, created.project_name);
        Ok(created)
    }

    pub async fn update(&self, id: i64, patch: ProjectPatch) -> Result<Project, StoreError> {
        let last_audit = parse_audit_date(patch.last_audit.as_deref()).map_err(StoreError::Validation)?;

        self.projects
            .mutate(move |projects| {
                let existing = projects
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(|| project_not_found(id))?;
                existing.apply(patch, last_audit);
                Ok(existing.clone())
            })
            .await
    }

    /// Remove exactly `id`; sibling records keep their ids.
    pub async fn delete(&self, id: i64) -> Result<Project, StoreError> {
        let removed = self
            .projects
            .mutate(move |projects| {
                let index = projects
                    .iter()
                    .position(|p| p.id == id)
                    .ok_or_else(|| project_not_found(id))?;
                Ok(projects.remove(index))
            })
            .await?;

        info!("Project {} deleted", id);
        Ok(removed)
    }
}

fn project_not_found(id: i64) -> StoreError {
    StoreError::NotFound(format!("Project {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn user(email: &str, role: Role) -> User {
        User {
            name: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            password: "$2b$04$hash".to_string(),
            role,
        }
    }

    fn draft_project(name: &str) -> NewProject {
        NewProject {
            project_name: name.to_string(),
            compliance: "SOC2".to_string(),
            risk_level: "High".to_string(),
            status: "Active".to_string(),
            last_audit: Some("2024-03-01".to_string()),
            assigned_to: None,
        }
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts_and_keeps_first_record() {
        let dir = TempDir::new().unwrap();
        let users = UserRepository::open(dir.path().join("users.json")).await.unwrap();

        users.register(user("jane@example.com", Role::User)).await.unwrap();

        let mut second = user("JANE@example.com", Role::User);
        second.name = "Impostor".to_string();
        second.password = "other".to_string();
        let result = users.register(second).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        let stored = users.find_by_email("jane@EXAMPLE.com").await.unwrap();
        assert_eq!(stored.name, "jane");
        assert_eq!(stored.password, "$2b$04$hash");
        assert_eq!(users.list().await.len(), 1);
    }

    #[tokio::test]
    async fn ensure_admin_only_seeds_once() {
        let dir = TempDir::new().unwrap();
        let users = UserRepository::open(dir.path().join("users.json")).await.unwrap();

        assert!(!users.has_admin().await);
        assert!(users.ensure_admin(user("admin@example.com", Role::User)).await.unwrap());
        assert!(users.has_admin().await);
        assert!(!users.ensure_admin(user("other@example.com", Role::Admin)).await.unwrap());
        assert_eq!(users.list().await.len(), 1);
        assert_eq!(users.list().await[0].role, Role::Admin);
    }

    #[tokio::test]
    async fn created_question_is_listed_with_same_fields() {
        let dir = TempDir::new().unwrap();
        let questions = QuestionRepository::open(dir.path().join("questions.json")).await.unwrap();

        let created = questions
            .create(NewQuestion {
                question: "What is least privilege?".into(),
                answer: "Grant only the access needed.".into(),
                category: Some("IAM".into()),
            })
            .await
            .unwrap();

        let listed = questions.list().await;
        assert_eq!(listed, vec![created.clone()]);
        assert!(created.id > 0);
        assert_eq!(questions.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn question_requires_text_and_defaults_category() {
        let dir = TempDir::new().unwrap();
        let questions = QuestionRepository::open(dir.path().join("questions.json")).await.unwrap();

        let missing = questions
            .create(NewQuestion {
                question: "  ".into(),
                answer: "a".into(),
                category: None,
            })
            .await;
        assert!(matches!(missing, Err(StoreError::Validation(_))));

        let created = questions
            .create(NewQuestion {
                question: "q".into(),
                answer: "a".into(),
                category: None,
            })
            .await
            .unwrap();
        assert_eq!(created.category, "General");
    }

    #[tokio::test]
    async fn older_question_records_load_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, r#"[{"id":1700000000000,"question":"Q","answer":"A"},{"id":1700000000001,"question":"Q2"}]"#)
            .unwrap();

        let questions = QuestionRepository::open(&path).await.unwrap();
        let first = questions.get(1700000000000).await.unwrap();
        assert_eq!(first.category, DEFAULT_CATEGORY);
        assert_eq!(first.answer, "A");
        let second = questions.get(1700000000001).await.unwrap();
        assert_eq!(second.answer, "");
        assert_eq!(second.category, "General");
    }

    #[tokio::test]
    async fn question_update_merges_and_delete_removes() {
        let dir = TempDir::new().unwrap();
        let questions = QuestionRepository::open(dir.path().join("questions.json")).await.unwrap();
        let created = questions
            .create(NewQuestion {
                question: "What is a SIEM?".into(),
                answer: "Log correlation.".into(),
                category: Some("SOC".into()),
            })
            .await
            .unwrap();

        let updated = questions
            .update(
                created.id,
                QuestionPatch {
                    answer: Some("Security information and event management.".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.question, "What is a SIEM?");
        assert_eq!(updated.category, "SOC");
        assert_eq!(updated.answer, "Security information and event management.");

        assert!(matches!(
            questions.update(42, QuestionPatch::default()).await,
            Err(StoreError::NotFound(_))
        ));

        questions.delete(created.id).await.unwrap();
        assert!(questions.list().await.is_empty());
        assert!(matches!(questions.delete(created.id).await, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn question_ids_stay_unique_within_one_millisecond() {
        let existing = vec![
            Question {
                id: 1_700_000_000_000,
                question: "q".into(),
                answer: "a".into(),
                category: "SOC".into(),
            },
            Question {
                id: 1_700_000_000_005,
                question: "q".into(),
                answer: "a".into(),
                category: "SOC".into(),
            },
        ];
        assert_eq!(next_question_id(&existing, 1_700_000_000_001), 1_700_000_000_001);
        assert_eq!(next_question_id(&existing, 1_700_000_000_000), 1_700_000_000_006);
    }

    #[tokio::test]
    async fn project_ids_are_sequential() {
        let dir = TempDir::new().unwrap();
        let projects = ProjectRepository::open(dir.path().join("projects.json")).await.unwrap();

        let first = projects.create(draft_project("SOC 2 Audit Prep")).await.unwrap();
        let second = projects.create(draft_project("ISO 27001 Gap Review")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.assigned_to, "GRC Team");
        assert_eq!(first.last_audit, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[tokio::test]
    async fn project_create_validates_required_fields() {
        let dir = TempDir::new().unwrap();
        let projects = ProjectRepository::open(dir.path().join("projects.json")).await.unwrap();

        let mut draft = draft_project("PCI Scoping");
        draft.status = String::new();
        assert!(matches!(projects.create(draft).await, Err(StoreError::Validation(_))));

        let mut draft = draft_project("PCI Scoping");
        draft.last_audit = Some("yesterday".into());
        assert!(matches!(projects.create(draft).await, Err(StoreError::Validation(_))));

        let mut draft = draft_project("PCI Scoping");
        draft.last_audit = None;
        let created = projects.create(draft).await.unwrap();
        assert_eq!(created.last_audit, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn project_update_keeps_audit_date_when_blank() {
        let dir = TempDir::new().unwrap();
        let projects = ProjectRepository::open(dir.path().join("projects.json")).await.unwrap();
        let created = projects.create(draft_project("HIPAA Review")).await.unwrap();

        let updated = projects
            .update(
                created.id,
                ProjectPatch {
                    status: Some("Closed".into()),
                    last_audit: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, "Closed");
        assert_eq!(updated.last_audit, created.last_audit);
        assert_eq!(updated.project_name, "HIPAA Review");
    }

    #[tokio::test]
    async fn deleting_project_leaves_siblings_untouched() {
        let dir = TempDir::new().unwrap();
        let projects = ProjectRepository::open(dir.path().join("projects.json")).await.unwrap();
        for name in ["A", "B", "C"] {
            projects.create(draft_project(name)).await.unwrap();
        }

        let removed = projects.delete(2).await.unwrap();
        assert_eq!(removed.project_name, "B");
        let ids: Vec<i64> = projects.list().await.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let before = projects.list().await;
        assert!(matches!(projects.delete(99).await, Err(StoreError::NotFound(_))));
        assert_eq!(projects.list().await, before);

        // Next id continues from the current maximum
        let next = projects.create(draft_project("D")).await.unwrap();
        assert_eq!(next.id, 4);
    }
}
