use gloo_net::http::{Request, RequestBuilder, Response};
use gloo_timers::callback::Timeout;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracker_client::validation::{Credentials, RegistrationRequest};
use tracker_client::{
    AdminStats, AuthResponse, ExportFile, ExportFormat, Problem, ProblemDraft, SignupResponse,
    TrackerClientError, TrackerClientResult, UserSummary, file_name_from_disposition,
};
use uuid::Uuid;

const API_BASE_URL: &str = match option_env!("WASM_API_BASE_URL") {
    Some(value) => value,
    None => "http://localhost:8080",
};

const REQUEST_TIMEOUT_MS: u32 = 10_000;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn endpoint(path: &str) -> String {
    format!(
        "{}/api/v1/{}",
        API_BASE_URL.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn network(err: gloo_net::Error) -> TrackerClientError {
    TrackerClientError::Network(err.to_string())
}

fn authorized(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.header("Authorization", &format!("Bearer {token}")),
        None => request,
    }
}

async fn parse_error_body(response: Response) -> TrackerClientError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error.or(body.message));
    TrackerClientError::from_status(status, message)
}

/// Отправляет запрос с таймаутом: по истечении fetch отменяется через
/// `AbortController`.
async fn send(request: RequestBuilder, body: Option<String>) -> TrackerClientResult<Response> {
    let controller = web_sys::AbortController::new()
        .map_err(|_| TrackerClientError::Network("AbortController is not available".into()))?;
    let signal = controller.signal();
    let _timeout = Timeout::new(REQUEST_TIMEOUT_MS, move || controller.abort());

    let request = request.abort_signal(Some(&signal));
    let response = match body {
        Some(body) => request
            .header("Content-Type", "application/json")
            .body(body)
            .map_err(network)?
            .send()
            .await,
        None => request.send().await,
    }
    .map_err(network)?;

    if !response.ok() {
        return Err(parse_error_body(response).await);
    }
    Ok(response)
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> TrackerClientResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|err| TrackerClientError::Decode(err.to_string()))
}

async fn get<T: DeserializeOwned>(path: &str, token: Option<&str>) -> TrackerClientResult<T> {
    let response = send(authorized(Request::get(&endpoint(path)), token), None).await?;
    parse_json(response).await
}

async fn with_body<TReq, TRes>(
    request: RequestBuilder,
    payload: &TReq,
    token: Option<&str>,
) -> TrackerClientResult<TRes>
where
    TReq: Serialize,
    TRes: DeserializeOwned,
{
    let body = serde_json::to_string(payload)
        .map_err(|err| TrackerClientError::Decode(err.to_string()))?;
    let response = send(authorized(request, token), Some(body)).await?;
    parse_json(response).await
}

async fn download(
    path: &str,
    token: Option<&str>,
    format: ExportFormat,
    fallback_name: String,
) -> TrackerClientResult<ExportFile> {
    let response = send(authorized(Request::get(&endpoint(path)), token), None).await?;

    let headers = response.headers();
    let file_name = headers
        .get("content-disposition")
        .and_then(|value| file_name_from_disposition(&value))
        .unwrap_or(fallback_name);
    let content_type = headers
        .get("content-type")
        .unwrap_or_else(|| format.content_type().to_string());
    let bytes = response.binary().await.map_err(network)?;

    Ok(ExportFile {
        file_name,
        content_type,
        bytes,
    })
}

pub(crate) async fn login(credentials: &Credentials) -> TrackerClientResult<AuthResponse> {
    with_body(Request::post(&endpoint("auth/login")), credentials, None).await
}

pub(crate) async fn signup(request: &RegistrationRequest) -> TrackerClientResult<SignupResponse> {
    with_body(Request::post(&endpoint("auth/signup")), request, None).await
}

pub(crate) async fn list_problems(token: Option<&str>) -> TrackerClientResult<Vec<Problem>> {
    get("problems", token).await
}

pub(crate) async fn create_problem(
    token: Option<&str>,
    draft: &ProblemDraft,
) -> TrackerClientResult<Problem> {
    with_body(Request::post(&endpoint("problems")), draft, token).await
}

pub(crate) async fn update_problem(
    token: Option<&str>,
    id: Uuid,
    draft: &ProblemDraft,
) -> TrackerClientResult<Problem> {
    with_body(Request::put(&endpoint(&format!("problems/{id}"))), draft, token).await
}

pub(crate) async fn delete_problem(token: Option<&str>, id: Uuid) -> TrackerClientResult<()> {
    send(
        authorized(Request::delete(&endpoint(&format!("problems/{id}"))), token),
        None,
    )
    .await?;
    Ok(())
}

pub(crate) async fn export_problems(
    token: Option<&str>,
    format: ExportFormat,
) -> TrackerClientResult<ExportFile> {
    let path = format!("problems/export/{}", format.path_segment());
    download(&path, token, format, format.problems_file_name()).await
}

pub(crate) async fn admin_stats(token: Option<&str>) -> TrackerClientResult<AdminStats> {
    get("admin/dashboard/stats", token).await
}

pub(crate) async fn admin_users(token: Option<&str>) -> TrackerClientResult<Vec<UserSummary>> {
    get("admin/dashboard/users", token).await
}

pub(crate) async fn admin_user_problems(
    token: Option<&str>,
    user_id: Uuid,
) -> TrackerClientResult<Vec<Problem>> {
    get(&format!("admin/dashboard/users/{user_id}/problems"), token).await
}

pub(crate) async fn export_user_data(
    token: Option<&str>,
    user_id: Uuid,
    format: ExportFormat,
) -> TrackerClientResult<ExportFile> {
    let path = format!("admin/export/user/{user_id}/{}", format.path_segment());
    download(&path, token, format, format.user_file_name(user_id)).await
}
