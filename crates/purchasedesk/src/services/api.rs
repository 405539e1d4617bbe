use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::middleware::attach_token;
use crate::auth::SessionStore;
use crate::error::ApiError;
use crate::models::{Envelope, LoginRequest, Purchase, PurchasePayload, User};

/// Thin client for the purchases backend.
///
/// Every call carries the stored token. Any non-2xx response is an error;
/// the client never touches the session itself.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: &Url, session: SessionStore) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Send a request and decode the JSON response body.
    pub async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self.send(method, endpoint, body).await?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Decode(format!("{endpoint}: {e}")))
    }

    /// Send a request whose response body is not used.
    pub async fn execute<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, endpoint, body).await?;
        Ok(())
    }

    async fn send<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{endpoint}", self.base_url);
        tracing::debug!("{method} {url}");

        let mut request = attach_token(self.http.request(method.clone(), &url), &self.session);
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::debug!("{method} {endpoint} failed with {status}");
            return Err(ApiError::from_status(status));
        }
        Ok(resp)
    }

    /// `POST /v1/auth/login`, returning the issued token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: Envelope<String> = self
            .request(Method::POST, "/v1/auth/login", Some(&body))
            .await?;
        Ok(resp.data)
    }

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        let resp: Envelope<Vec<User>> = self.request::<_, ()>(Method::GET, "/v1/users", None).await?;
        Ok(resp.data)
    }

    pub async fn user(&self, user_id: i64) -> Result<User, ApiError> {
        let resp: Envelope<User> = self
            .request::<_, ()>(Method::GET, &format!("/v1/users/{user_id}"), None)
            .await?;
        Ok(resp.data)
    }

    pub async fn purchases(&self) -> Result<Vec<Purchase>, ApiError> {
        let resp: Envelope<Vec<Purchase>> = self
            .request::<_, ()>(Method::GET, "/v1/purchases", None)
            .await?;
        Ok(resp.data)
    }

    pub async fn create_purchase(&self, payload: &PurchasePayload) -> Result<(), ApiError> {
        self.execute(Method::POST, "/v1/purchases", Some(payload)).await
    }

    pub async fn update_purchase(
        &self,
        purchase_id: i64,
        payload: &PurchasePayload,
    ) -> Result<(), ApiError> {
        self.execute(
            Method::PATCH,
            &format!("/v1/purchases/{purchase_id}"),
            Some(payload),
        )
        .await
    }

    pub async fn delete_purchase(&self, purchase_id: i64) -> Result<(), ApiError> {
        self.execute::<()>(Method::DELETE, &format!("/v1/purchases/{purchase_id}"), None)
            .await
    }
}
