//! HTTP client for the memorial API that signs writes with the stored session.

use std::sync::Arc;

use reqwest::{header::AUTHORIZATION, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::memorials::{
    dto::{CreateMemorialRequest, DeletedResponse, UpdateMemorialRequest},
    Memorial,
};
use crate::session::{AuthSession, SessionStore};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not logged in")]
    NotLoggedIn,
    #[error("memorial not found")]
    NotFound,
    #[error("request failed with {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct MemorialClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl MemorialClient {
    /// `base_url` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let session = AuthSession::load(self.session.as_ref())
            .filter(AuthSession::is_authenticated)
            .ok_or(ClientError::NotLoggedIn)?;
        Ok(self
            .http
            .request(method, self.url(path))
            .header(AUTHORIZATION, session.authorization_header()))
    }

    async fn read<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res.json::<T>().await?);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        let message = match res.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        warn!(%status, %message, "memorial api call failed");
        Err(ClientError::Status { status, message })
    }

    pub async fn list(&self) -> Result<Vec<Memorial>, ClientError> {
        let res = self.http.get(self.url("/memorials")).send().await?;
        Self::read(res).await
    }

    pub async fn get(&self, id: i64) -> Result<Memorial, ClientError> {
        let res = self
            .http
            .get(self.url(&format!("/memorials/{}", id)))
            .send()
            .await?;
        Self::read(res).await
    }

    pub async fn create(&self, req: &CreateMemorialRequest) -> Result<Memorial, ClientError> {
        let res = self.authed(Method::POST, "/memorials")?.json(req).send().await?;
        let created: Memorial = Self::read(res).await?;
        debug!(id = created.id, "memorial created");
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i64,
        req: &UpdateMemorialRequest,
    ) -> Result<Memorial, ClientError> {
        let res = self
            .authed(Method::PUT, &format!("/memorials/{}", id))?
            .json(req)
            .send()
            .await?;
        Self::read(res).await
    }

    pub async fn delete(&self, id: i64) -> Result<DeletedResponse, ClientError> {
        let res = self
            .authed(Method::DELETE, &format!("/memorials/{}", id))?
            .send()
            .await?;
        Self::read(res).await
    }
}
