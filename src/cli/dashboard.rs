use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::cli::client::{ClientError, PortalClient, WhoamiReply};
use crate::cli::session::{Session, SessionManager};
use crate::cli::store::KeyValueStore;
use crate::database::models::{
    NewProject, NewQuestion, Project, ProjectPatch, Question, QuestionPatch, UserSummary,
};
use crate::filter::{categories, filter_questions, paginate, shuffle, Page, QuestionQuery};

/// Shuffle request for the question view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShuffleMode {
    #[default]
    Off,
    Random,
    Seeded(u64),
}

/// One rendered page of the question bank
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub categories: Vec<String>,
    pub category: String,
    #[serde(flatten)]
    pub page: Page<Question>,
}

/// Session plus client: every protected call carries the stored token and
/// a 401/403 reply ends the session before the error is returned.
pub struct Dashboard<S: KeyValueStore> {
    client: PortalClient,
    session: SessionManager<S>,
}

impl<S: KeyValueStore> Dashboard<S> {
    /// Build a dashboard and restore any persisted session
    pub fn open(client: PortalClient, store: S) -> Result<Self, ClientError> {
        let mut session = SessionManager::new(store);
        session.hydrate()?;
        Ok(Self { client, session })
    }

    pub fn client(&self) -> &PortalClient {
        &self.client
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.session()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Session, ClientError> {
        let reply = self.client.login(email, password).await?;
        Ok(self.session.establish(reply)?)
    }

    pub fn logout(&mut self) -> Result<(), ClientError> {
        Ok(self.session.logout()?)
    }

    pub async fn register(&self, name: Option<&str>, email: &str, password: &str) -> Result<String, ClientError> {
        self.client.register(name, email, password).await
    }

    fn token(&self) -> Result<String, ClientError> {
        self.session
            .token()
            .map(str::to_string)
            .ok_or(ClientError::NotLoggedIn)
    }

    /// Drop the session when the server refused the token
    fn settle<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(err) = &result {
            if err.ends_session() {
                self.session.handle_auth_failure()?;
            }
        }
        result
    }

    pub async fn whoami(&mut self) -> Result<WhoamiReply, ClientError> {
        let token = self.token()?;
        let result = self.client.whoami(&token).await;
        self.settle(result)
    }

    pub async fn questions(&mut self) -> Result<Vec<Question>, ClientError> {
        let token = self.token()?;
        let result = self.client.questions(&token).await;
        self.settle(result)
    }

    pub async fn question(&mut self, id: i64) -> Result<Question, ClientError> {
        let token = self.token()?;
        let result = self.client.question(&token, id).await;
        self.settle(result)
    }

    /// Fetch, filter, optionally shuffle, then slice one page
    pub async fn question_page(
        &mut self,
        query: &QuestionQuery,
        page: usize,
        page_size: usize,
        mode: ShuffleMode,
    ) -> Result<QuestionView, ClientError> {
        let all = self.questions().await?;
        let mut matching = filter_questions(&all, query);

        match mode {
            ShuffleMode::Off => {}
            ShuffleMode::Random => shuffle(&mut matching, &mut rand::thread_rng()),
            ShuffleMode::Seeded(seed) => shuffle(&mut matching, &mut StdRng::seed_from_u64(seed)),
        }

        let page = paginate(&matching, page, page_size).map_err(|e| ClientError::BadRequest(e.to_string()))?;
        Ok(QuestionView {
            categories: categories(&all),
            category: query.category.to_string(),
            page,
        })
    }

    pub async fn add_question(&mut self, question: &NewQuestion) -> Result<Question, ClientError> {
        let token = self.token()?;
        let result = self.client.create_question(&token, question).await;
        self.settle(result)
    }

    pub async fn update_question(&mut self, id: i64, patch: &QuestionPatch) -> Result<Question, ClientError> {
        let token = self.token()?;
        let result = self.client.update_question(&token, id, patch).await;
        self.settle(result)
    }

    pub async fn delete_question(&mut self, id: i64) -> Result<Question, ClientError> {
        let token = self.token()?;
        let result = self.client.delete_question(&token, id).await;
        self.settle(result)
    }

    pub async fn projects(&mut self) -> Result<Vec<Project>, ClientError> {
        let token = self.token()?;
        let result = self.client.projects(&token).await;
        self.settle(result)
    }

    pub async fn project(&mut self, id: i64) -> Result<Project, ClientError> {
        let token = self.token()?;
        let result = self.client.project(&token, id).await;
        self.settle(result)
    }

    pub async fn add_project(&mut self, project: &NewProject) -> Result<Project, ClientError> {
        let token = self.token()?;
        let result = self.client.create_project(&token, project).await;
        self.settle(result)
    }

    pub async fn update_project(&mut self, id: i64, patch: &ProjectPatch) -> Result<Project, ClientError> {
        let token = self.token()?;
        let result = self.client.update_project(&token, id, patch).await;
        self.settle(result)
    }

    pub async fn delete_project(&mut self, id: i64) -> Result<Project, ClientError> {
        let token = self.token()?;
        let result = self.client.delete_project(&token, id).await;
        self.settle(result)
    }

    pub async fn users(&mut self) -> Result<Vec<UserSummary>, ClientError> {
        let token = self.token()?;
        let result = self.client.users(&token).await;
        self.settle(result)
    }
}
