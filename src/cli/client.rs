use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::cli::store::StorageError;
use crate::database::models::{
    NewProject, NewQuestion, Project, ProjectPatch, Question, QuestionPatch, Role, UserSummary,
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("Session expired or not authorized; please log in again")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Errors that mean the stored token can no longer be used
    pub fn ends_session(&self) -> bool {
        matches!(self, ClientError::Unauthorized | ClientError::Forbidden)
    }
}

/// Body of a successful `POST /api/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginReply {
    pub message: String,
    pub token: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoamiReply {
    pub user: UserSummary,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Deserialize)]
struct QuestionsReply {
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct QuestionReply {
    question: Question,
}

#[derive(Deserialize)]
struct ProjectsReply {
    projects: Vec<Project>,
}

#[derive(Deserialize)]
struct ProjectReply {
    project: Project,
}

#[derive(Deserialize)]
struct UsersReply {
    users: Vec<UserSummary>,
}

#[derive(Deserialize)]
struct MessageReply {
    #[serde(default)]
    message: String,
}

/// Typed HTTP client for the portal API. One request per call; nothing is
/// retried.
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base: Url,
}

impl PortalClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self::with_http(http, Url::parse(base_url)?))
    }

    /// Requests resolve below `base`, so a path prefix such as
    /// `https://host/portal` is kept.
    pub fn with_http(http: reqwest::Client, mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { http, base }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `path` is relative to the base URL, e.g. `api/login`.
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> Result<RequestBuilder, ClientError> {
        let builder = self.http.request(method, self.endpoint(path)?);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let response = self.request(Method::GET, "health", None)?.send().await?;
        decode(response).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginReply, ClientError> {
        let response = self
            .request(Method::POST, "api/login", None)?
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::InvalidCredentials);
        }
        decode(response).await
    }

    /// Returns the server's confirmation message
    pub async fn register(&self, name: Option<&str>, email: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .request(Method::POST, "api/register", None)?
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        let reply: MessageReply = decode(response).await?;
        Ok(reply.message)
    }

    pub async fn whoami(&self, token: &str) -> Result<WhoamiReply, ClientError> {
        let response = self.request(Method::GET, "api/auth/whoami", Some(token))?.send().await?;
        decode(response).await
    }

    pub async fn questions(&self, token: &str) -> Result<Vec<Question>, ClientError> {
        let response = self.request(Method::GET, "api/questions", Some(token))?.send().await?;
        let reply: QuestionsReply = decode(response).await?;
        Ok(reply.questions)
    }

    pub async fn question(&self, token: &str, id: i64) -> Result<Question, ClientError> {
        let path = format!("api/questions/{}", id);
        let response = self.request(Method::GET, &path, Some(token))?.send().await?;
        let reply: QuestionReply = decode(response).await?;
        Ok(reply.question)
    }

    pub async fn create_question(&self, token: &str, question: &NewQuestion) -> Result<Question, ClientError> {
        let response = self
            .request(Method::POST, "api/questions", Some(token))?
            .json(question)
            .send()
            .await?;
        let reply: QuestionReply = decode(response).await?;
        Ok(reply.question)
    }

    pub async fn update_question(&self, token: &str, id: i64, patch: &QuestionPatch) -> Result<Question, ClientError> {
        let path = format!("api/questions/{}", id);
        let response = self.request(Method::PUT, &path, Some(token))?.json(patch).send().await?;
        let reply: QuestionReply = decode(response).await?;
        Ok(reply.question)
    }

    pub async fn delete_question(&self, token: &str, id: i64) -> Result<Question, ClientError> {
        let path = format!("api/questions/{}", id);
        let response = self.request(Method::DELETE, &path, Some(token))?.send().await?;
        let reply: QuestionReply = decode(response).await?;
        Ok(reply.question)
    }

    pub async fn projects(&self, token: &str) -> Result<Vec<Project>, ClientError> {
        let response = self.request(Method::GET, "api/projects", Some(token))?.send().await?;
        let reply: ProjectsReply = decode(response).await?;
        Ok(reply.projects)
    }

    pub async fn project(&self, token: &str, id: i64) -> Result<Project, ClientError> {
        let path = format!("api/projects/{}", id);
        let response = self.request(Method::GET, &path, Some(token))?.send().await?;
        let reply: ProjectReply = decode(response).await?;
        Ok(reply.project)
    }

    pub async fn create_project(&self, token: &str, project: &NewProject) -> Result<Project, ClientError> {
        let response = self
            .request(Method::POST, "api/projects", Some(token))?
            .json(project)
            .send()
            .await?;
        let reply: ProjectReply = decode(response).await?;
        Ok(reply.project)
    }

    pub async fn update_project(&self, token: &str, id: i64, patch: &ProjectPatch) -> Result<Project, ClientError> {
        let path = format!("api/projects/{}", id);
        let response = self.request(Method::PUT, &path, Some(token))?.json(patch).send().await?;
        let reply: ProjectReply = decode(response).await?;
        Ok(reply.project)
    }

    pub async fn delete_project(&self, token: &str, id: i64) -> Result<Project, ClientError> {
        let path = format!("api/projects/{}", id);
        let response = self.request(Method::DELETE, &path, Some(token))?.send().await?;
        let reply: ProjectReply = decode(response).await?;
        Ok(reply.project)
    }

    pub async fn users(&self, token: &str) -> Result<Vec<UserSummary>, ClientError> {
        let response = self.request(Method::GET, "api/admin/users", Some(token))?.send().await?;
        let reply: UsersReply = decode(response).await?;
        Ok(reply.users)
    }
}

/// Parse a success body or map the status to a `ClientError`
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        let body = response.bytes().await?;
        return parse_body(&body);
    }

    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    Err(error_for_status(status, message))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}

fn error_for_status(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::BAD_REQUEST => ClientError::BadRequest(message),
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden,
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::CONFLICT => ClientError::Conflict(message),
        _ => ClientError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_client_errors() {
        assert!(matches!(
            error_for_status(StatusCode::CONFLICT, "User already exists.".into()),
            ClientError::Conflict(m) if m == "User already exists."
        ));
        assert!(error_for_status(StatusCode::UNAUTHORIZED, String::new()).ends_session());
        assert!(error_for_status(StatusCode::FORBIDDEN, String::new()).ends_session());
        assert!(!error_for_status(StatusCode::NOT_FOUND, "gone".into()).ends_session());
        assert!(matches!(
            error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
            ClientError::Server { status: 500, .. }
        ));
    }

    #[test]
    fn endpoints_keep_the_base_path() {
        let client = PortalClient::new("http://localhost:5000/portal").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/portal/");
        assert_eq!(
            client.endpoint("api/login").unwrap().as_str(),
            "http://localhost:5000/portal/api/login"
        );
        assert_eq!(
            client.endpoint(&format!("api/questions/{}", 7)).unwrap().as_str(),
            "http://localhost:5000/portal/api/questions/7"
        );

        let root = PortalClient::new("http://localhost:5000").unwrap();
        assert_eq!(root.endpoint("health").unwrap().as_str(), "http://localhost:5000/health");
    }

    #[test]
    fn unreadable_success_body_is_a_decode_error() {
        let result: Result<LoginReply, _> = parse_body(b"<html>maintenance</html>");
        assert!(matches!(result, Err(ClientError::Decode(_))));

        let result: Result<LoginReply, _> = parse_body(br#"{"message":"ok"}"#);
        assert!(matches!(result, Err(ClientError::Decode(_))));
        assert!(!ClientError::Decode(String::new()).ends_session());

        let reply: MessageReply = parse_body(br#"{"message":"User registered"}"#).unwrap();
        assert_eq!(reply.message, "User registered");
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(PortalClient::new("not a url"), Err(ClientError::InvalidUrl(_))));
    }
}
