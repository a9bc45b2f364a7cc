// src/api.rs
//! Typed client for the inventory backend. One method per route, bearer
//! credentials attached from the persisted session store when present.
//! Every operation is a single attempt: no retries, no backoff, no
//! client-enforced timeout.

use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Cabinet, Container, CreateCabinetRequest, CreateContainerRequest, CreateUserRequest,
    QuantityRequest, SummaryReport, Transaction, UpdateCabinetRequest, UpdateContainerRequest,
    UpdateUserRequest, User,
};
use crate::session::{TokenPair, TokenStore};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
}

trait WithAuth {
    fn with_auth(self, tokens: &TokenStore) -> Self;
}

impl WithAuth for reqwest::RequestBuilder {
    fn with_auth(self, tokens: &TokenStore) -> Self {
        match tokens.access_token() {
            Some(token) => self.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => self,
        }
    }
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: TokenStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ==================== AUTH ====================

    /// POST /token/ - the only unauthenticated call.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<TokenPair> {
        let response = self
            .http
            .post(self.url("token/"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        decode_json(response).await
    }

    /// POST /token/refresh/ - exchanges the refresh token for a new access token.
    pub async fn refresh_token(&self, refresh: &str) -> ApiResult<String> {
        #[derive(serde::Deserialize)]
        struct Refreshed {
            access: String,
        }
        let response = self
            .http
            .post(self.url("token/refresh/"))
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await?;
        let refreshed: Refreshed = decode_json(response).await?;
        Ok(refreshed.access)
    }

    // ==================== USERS ====================

    pub async fn get_users(&self) -> ApiResult<Vec<User>> {
        let response = self.http.get(self.url("users/")).with_auth(&self.tokens).send().await?;
        decode_json(response).await
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> ApiResult<User> {
        let response = self
            .http
            .post(self.url("users/"))
            .with_auth(&self.tokens)
            .json(request)
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn update_user(&self, id: i64, request: &UpdateUserRequest) -> ApiResult<User> {
        let response = self
            .http
            .put(self.url(&format!("users/{}/", id)))
            .with_auth(&self.tokens)
            .json(request)
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn delete_user(&self, id: i64) -> ApiResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("users/{}/", id)))
            .with_auth(&self.tokens)
            .send()
            .await?;
        check_status(response).await
    }

    // ==================== CABINETS ====================

    pub async fn get_cabinets(&self) -> ApiResult<Vec<Cabinet>> {
        let response = self.http.get(self.url("cabinets/")).with_auth(&self.tokens).send().await?;
        decode_json(response).await
    }

    pub async fn create_cabinet(&self, request: &CreateCabinetRequest) -> ApiResult<Cabinet> {
        let response = self
            .http
            .post(self.url("cabinets/"))
            .with_auth(&self.tokens)
            .json(request)
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn update_cabinet(&self, id: i64, request: &UpdateCabinetRequest) -> ApiResult<Cabinet> {
        let response = self
            .http
            .put(self.url(&format!("cabinets/{}/", id)))
            .with_auth(&self.tokens)
            .json(request)
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn delete_cabinet(&self, id: i64) -> ApiResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("cabinets/{}/", id)))
            .with_auth(&self.tokens)
            .send()
            .await?;
        check_status(response).await
    }

    // ==================== CONTAINERS ====================

    pub async fn get_container(&self, id: Uuid) -> ApiResult<Container> {
        let response = self
            .http
            .get(self.url(&format!("containers/{}/", id)))
            .with_auth(&self.tokens)
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn create_container(&self, request: &CreateContainerRequest) -> ApiResult<Container> {
        let response = self
            .http
            .post(self.url("containers/"))
            .with_auth(&self.tokens)
            .json(request)
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn update_container(
        &self,
        id: Uuid,
        request: &UpdateContainerRequest,
    ) -> ApiResult<Container> {
        let response = self
            .http
            .put(self.url(&format!("containers/{}/", id)))
            .with_auth(&self.tokens)
            .json(request)
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn delete_container(&self, id: Uuid) -> ApiResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("containers/{}/", id)))
            .with_auth(&self.tokens)
            .send()
            .await?;
        check_status(response).await
    }

    /// The backend performs the arithmetic and returns the updated container.
    pub async fn replenish(&self, id: Uuid, quantity: f64) -> ApiResult<Container> {
        let response = self
            .http
            .post(self.url(&format!("containers/{}/replenish/", id)))
            .with_auth(&self.tokens)
            .json(&QuantityRequest { quantity })
            .send()
            .await?;
        decode_json(response).await
    }

    /// Rejected server-side when stock is insufficient or the quantity is
    /// invalid; the backend message is carried in the error.
    pub async fn write_off(&self, id: Uuid, quantity: f64) -> ApiResult<Container> {
        let response = self
            .http
            .post(self.url(&format!("containers/{}/write_off/", id)))
            .with_auth(&self.tokens)
            .json(&QuantityRequest { quantity })
            .send()
            .await?;
        decode_json(response).await
    }

    // ==================== HISTORY & REPORTS ====================

    pub async fn get_transactions(&self) -> ApiResult<Vec<Transaction>> {
        let response = self
            .http
            .get(self.url("transactions/"))
            .with_auth(&self.tokens)
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn get_summary_report(&self, cabinet_id: Option<i64>) -> ApiResult<SummaryReport> {
        let mut request = self.http.get(self.url("reports/summary/")).with_auth(&self.tokens);
        if let Some(id) = cabinet_id {
            request = request.query(&[("cabinet_id", id)]);
        }
        let response = request.send().await?;
        decode_json(response).await
    }

    /// GET /qr/{id}/ - raw PNG bytes.
    pub async fn get_qr_image(&self, container_id: Uuid) -> ApiResult<Vec<u8>> {
        let response = self
            .http
            .get(self.url(&format!("qr/{}/", container_id)))
            .with_auth(&self.tokens)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.bytes().await?.to_vec())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(error_from_status(status, &body))
        }
    }
}

// ==================== RESPONSE HANDLING ====================

async fn decode_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(error_from_status(status, &body))
    }
}

async fn check_status(response: Response) -> ApiResult<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(error_from_status(status, &body))
    }
}

fn error_from_status(status: StatusCode, body: &str) -> ApiError {
    let message = extract_message(body)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
    match status {
        StatusCode::BAD_REQUEST => ApiError::BadRequest(message),
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::UNPROCESSABLE_ENTITY => ApiError::ValidationError(message),
        _ => ApiError::ServerError(message),
    }
}

/// Backends in the wild answer with different envelope keys; pick whichever
/// is present so the user sees the server's own words.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["error", "detail", "message"] {
        if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
            return Some(message.to_string());
        }
    }
    None
}
