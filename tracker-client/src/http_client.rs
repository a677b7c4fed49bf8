use std::time::Duration;

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;
use uuid::Uuid;

use crate::error::{TrackerClientError, TrackerClientResult};
use crate::export::{ExportFile, ExportFormat, file_name_from_disposition};
use crate::models::{
    AdminStats, AuthResponse, Problem, ProblemDraft, SignupResponse, User, UserSummary,
};
use crate::validation::{Credentials, ProfileUpdate, RegistrationRequest};

const LOGIN_PATH: &str = "/api/v1/auth/login";
const SIGNUP_PATH: &str = "/api/v1/auth/signup";
const ME_PATH: &str = "/api/v1/users/me";
const PROBLEMS_PATH: &str = "/api/v1/problems";
const ADMIN_STATS_PATH: &str = "/api/v1/admin/dashboard/stats";
const ADMIN_USERS_PATH: &str = "/api/v1/admin/dashboard/users";

#[derive(Debug, Clone)]
/// Параметры HTTP-клиента.
pub struct ClientConfig {
    /// Базовый URL сервера, например `http://localhost:8080`.
    pub base_url: String,
    /// Таймаут установки соединения.
    pub connect_timeout: Duration,
    /// Таймаут запроса целиком.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Конфигурация с таймаутами по умолчанию (5 с на соединение, 10 с на запрос).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для REST API трекера.
///
/// Ничего не знает о сессии: токен передаётся в каждый вызов явно.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(config: &ClientConfig) -> TrackerClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        debug!(%method, path, authorized = token.is_some(), "api request");

        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: Response) -> TrackerClientError {
        let status = response.status().as_u16();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.error.or(body.message),
            Err(_) => None,
        };
        debug!(status, ?message, "api error response");
        TrackerClientError::from_status(status, message)
    }

    async fn send(request: RequestBuilder) -> TrackerClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(TrackerClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn send_json<TRes>(request: RequestBuilder) -> TrackerClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        Self::send(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(TrackerClientError::from_reqwest)
    }

    async fn get<TRes>(&self, path: &str, token: Option<&str>) -> TrackerClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        Self::send_json(self.request(Method::GET, path, token)).await
    }

    /// универсальный helper для запросов с json-payload
    async fn with_body<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> TrackerClientResult<TRes>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        Self::send_json(self.request(method, path, token).json(body)).await
    }

    async fn download(
        &self,
        path: &str,
        token: Option<&str>,
        format: ExportFormat,
        fallback_name: String,
    ) -> TrackerClientResult<ExportFile> {
        let response = Self::send(self.request(Method::GET, path, token)).await?;

        let headers = response.headers();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(file_name_from_disposition)
            .unwrap_or(fallback_name);
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(format.content_type())
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(TrackerClientError::from_reqwest)?;

        Ok(ExportFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    pub(crate) async fn login(&self, credentials: &Credentials) -> TrackerClientResult<AuthResponse> {
        self.with_body(Method::POST, LOGIN_PATH, credentials, None)
            .await
    }

    pub(crate) async fn signup(
        &self,
        request: &RegistrationRequest,
    ) -> TrackerClientResult<SignupResponse> {
        self.with_body(Method::POST, SIGNUP_PATH, request, None)
            .await
    }

    pub(crate) async fn current_user(&self, token: Option<&str>) -> TrackerClientResult<User> {
        self.get(ME_PATH, token).await
    }

    pub(crate) async fn update_profile(
        &self,
        token: Option<&str>,
        update: &ProfileUpdate,
    ) -> TrackerClientResult<User> {
        self.with_body(Method::PUT, ME_PATH, update, token).await
    }

    pub(crate) async fn list_problems(&self, token: Option<&str>) -> TrackerClientResult<Vec<Problem>> {
        self.get(PROBLEMS_PATH, token).await
    }

    pub(crate) async fn get_problem(
        &self,
        token: Option<&str>,
        id: Uuid,
    ) -> TrackerClientResult<Problem> {
        self.get(&format!("{PROBLEMS_PATH}/{id}"), token).await
    }

    pub(crate) async fn create_problem(
        &self,
        token: Option<&str>,
        draft: &ProblemDraft,
    ) -> TrackerClientResult<Problem> {
        self.with_body(Method::POST, PROBLEMS_PATH, draft, token)
            .await
    }

    pub(crate) async fn update_problem(
        &self,
        token: Option<&str>,
        id: Uuid,
        draft: &ProblemDraft,
    ) -> TrackerClientResult<Problem> {
        self.with_body(Method::PUT, &format!("{PROBLEMS_PATH}/{id}"), draft, token)
            .await
    }

    pub(crate) async fn delete_problem(&self, token: Option<&str>, id: Uuid) -> TrackerClientResult<()> {
        Self::send(self.request(Method::DELETE, &format!("{PROBLEMS_PATH}/{id}"), token)).await?;
        Ok(())
    }

    pub(crate) async fn export_problems(
        &self,
        token: Option<&str>,
        format: ExportFormat,
    ) -> TrackerClientResult<ExportFile> {
        let path = format!("{PROBLEMS_PATH}/export/{}", format.path_segment());
        self.download(&path, token, format, format.problems_file_name())
            .await
    }

    pub(crate) async fn admin_stats(&self, token: Option<&str>) -> TrackerClientResult<AdminStats> {
        self.get(ADMIN_STATS_PATH, token).await
    }

    pub(crate) async fn admin_users(&self, token: Option<&str>) -> TrackerClientResult<Vec<UserSummary>> {
        self.get(ADMIN_USERS_PATH, token).await
    }

    pub(crate) async fn admin_user_problems(
        &self,
        token: Option<&str>,
        user_id: Uuid,
    ) -> TrackerClientResult<Vec<Problem>> {
        self.get(&format!("{ADMIN_USERS_PATH}/{user_id}/problems"), token)
            .await
    }

    pub(crate) async fn export_user_data(
        &self,
        token: Option<&str>,
        user_id: Uuid,
        format: ExportFormat,
    ) -> TrackerClientResult<ExportFile> {
        let path = format!(
            "/api/v1/admin/export/user/{user_id}/{}",
            format.path_segment()
        );
        self.download(&path, token, format, format.user_file_name(user_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new(&ClientConfig::new("http://localhost:8080/"))
            .expect("client must build");
        let full = client.endpoint("/api/v1/problems");
        assert_eq!(full, "http://localhost:8080/api/v1/problems");
    }

    #[test]
    fn default_config_uses_ten_second_timeout() {
        let config = ClientConfig::new("http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn signup_response_allows_missing_token() {
        let raw = r#"{
            "message": "User registered successfully",
            "user": {"userId": "00000000-0000-0000-0000-000000000003", "username": "u", "email": "u@example.com", "role": "USER"}
        }"#;
        let dto: SignupResponse = serde_json::from_str(raw).expect("signup dto must parse");
        assert!(dto.token.is_none());
        assert_eq!(dto.user.username, "u");
    }
}
