//! OAuth2 authorization-code login that fills the client session.

use rand::{distributions::Alphanumeric, Rng};
use reqwest::{header::AUTHORIZATION, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::OAuthConfig;
use crate::session::{now_millis, AuthSession, OAuthTokens, SessionStore, OAUTH_STATE_KEY};

const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("invalid endpoint url: {0}")]
    Endpoint(String),
    #[error("state parameter missing or does not match")]
    StateMismatch,
    #[error("no authorization code received")]
    MissingCode,
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("failed to fetch user info: {0}")]
    UserInfo(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("failed to store session: {0}")]
    Session(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Random alphanumeric value guarding the redirect against CSRF.
pub fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(26)
        .map(char::from)
        .collect()
}

pub struct OAuthClient {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_http(config, reqwest::Client::new())
    }

    pub fn with_http(config: OAuthConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn authorization_url(&self, state: &str) -> Result<Url, OAuthError> {
        Url::parse_with_params(
            &self.config.authorization_endpoint,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::Endpoint(e.to_string()))
    }

    /// Remembers a fresh `state` in `store` and returns where to send the user.
    pub fn begin_login(&self, store: &dyn SessionStore) -> Result<Url, OAuthError> {
        let state = generate_state();
        let url = self.authorization_url(&state)?;
        store.set(OAUTH_STATE_KEY, state);
        debug!("oauth login started");
        Ok(url)
    }

    /// Finishes the redirect: checks `state`, trades `code` for tokens, loads the user,
    /// and stores the resulting session.
    pub async fn complete_login(
        &self,
        store: &dyn SessionStore,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<AuthSession, OAuthError> {
        let expected = store.get(OAUTH_STATE_KEY);
        match (state, expected.as_deref()) {
            (Some(got), Some(want)) if got == want => {}
            _ => {
                warn!("oauth callback with invalid state");
                return Err(OAuthError::StateMismatch);
            }
        }
        store.remove(OAUTH_STATE_KEY);

        let code = code.filter(|c| !c.is_empty()).ok_or(OAuthError::MissingCode)?;

        let tokens = self.exchange_code(code).await?;
        let user = self.fetch_user(&tokens.access_token).await?;

        let expires_in = tokens.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let session = AuthSession::OAuth(OAuthTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: now_millis().saturating_add(expires_in.saturating_mul(1000)),
            user,
        });
        session.save(store)?;
        info!(expires_in, "oauth login completed");
        Ok(session)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let res = self
            .http
            .post(&self.config.token_endpoint)
            .form(&form)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!(%status, body = %body, "token exchange rejected");
            return Err(OAuthError::TokenExchange(status.to_string()));
        }
        res.json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))
    }

    async fn fetch_user(&self, access_token: &str) -> Result<serde_json::Value, OAuthError> {
        let res = self
            .http
            .get(&self.config.user_info_endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            error!(%status, "user info request rejected");
            return Err(OAuthError::UserInfo(status.to_string()));
        }
        res.json::<serde_json::Value>()
            .await
            .map_err(|e| OAuthError::UserInfo(e.to_string()))
    }
}
