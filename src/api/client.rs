use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::api::dtos::responses::{is_capacity_message, CreneauInfo, MutationResponse};
use crate::domain::services::session_store::SessionStore;
use crate::error::AppError;

/// Thin JSON-over-HTTPS client for the remote registration API. Attaches the
/// session's bearer token and maps HTTP failures onto `AppError`.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, session: Arc<SessionStore>) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid API URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!("API URL {} cannot carry a path", base_url)));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url, session })
    }

    /// Appends `segments` to the base URL, each one percent-encoded including `/`.
    pub(crate) fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, AppError> {
        let res = self.send(Method::GET, path, None::<&()>, &[]).await?;
        decode(res).await
    }

    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let res = self.send(Method::GET, path, None::<&()>, query).await?;
        decode(res).await
    }

    pub async fn send_json<B, T>(&self, method: Method, path: &[&str], body: Option<&B>) -> Result<T, AppError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let res = self.send(method, path, body, &[]).await?;
        decode(res).await
    }

    /// Sends a mutating call and unwraps the `{ success, error?, creneau_info? }` envelope.
    pub async fn send_mutation<B>(&self, method: Method, path: &[&str], body: Option<&B>) -> Result<Option<CreneauInfo>, AppError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let envelope: MutationResponse = self.send_json(method, path, body).await?;
        envelope.into_result()
    }

    async fn send<B>(&self, method: Method, path: &[&str], body: Option<&B>, query: &[(&str, &str)]) -> Result<Response, AppError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let request_id = Uuid::new_v4().to_string();
        let url = self.url(path);
        let span = info_span!(
            "api_request",
            request_id = %request_id,
            method = %method,
            path = %url.path(),
        );

        async move {
            let started = Instant::now();

            let mut req = self
                .client
                .request(method, url)
                .header("X-Request-Id", &request_id);
            if !query.is_empty() {
                req = req.query(query);
            }
            if let Some(token) = self.session.token() {
                req = req.bearer_auth(token);
            }
            if let Some(body) = body {
                req = req.json(body);
            }

            let res = req.send().await.map_err(|e| {
                error!("Registration API connection error: {}", e);
                AppError::Transport(e)
            })?;

            let status = res.status();
            info!(
                status = status.as_u16(),
                latency_ms = started.elapsed().as_millis() as u64,
                "finished api request"
            );

            if status.is_success() {
                return Ok(res);
            }

            let text = res.text().await.unwrap_or_default();
            Err(error_for_status(status, &text))
        }
        .instrument(span)
        .await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, AppError> {
    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        warn!("Undecodable API response: {}", e);
        AppError::Decode(e.to_string())
    })
}

fn extract_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error.or(parsed.message);
    }
    let trimmed = body.trim();
    (!trimmed.is_empty() && trimmed.len() <= 200).then(|| trimmed.to_string())
}

pub(crate) fn error_for_status(status: StatusCode, body: &str) -> AppError {
    let message = extract_message(body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized,
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::CapacityConflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            if is_capacity_message(&message) {
                AppError::CapacityConflict(message)
            } else {
                AppError::Rejected(message)
            }
        }
        _ => {
            error!("Registration API failed. Status: {}, Body: {}", status, body);
            AppError::Api { status: status.as_u16(), message }
        }
    }
}
