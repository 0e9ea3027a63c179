use axum::{extract::Query, response::Redirect, routing::get, Router};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/callback", get(oauth_callback))
}

/// Hands the authorization code to the login page, which completes the exchange.
#[instrument(skip(params))]
pub async fn oauth_callback(Query(params): Query<CallbackParams>) -> Redirect {
    let target = login_redirect(&params);
    info!(has_code = params.code.is_some(), "oauth callback");
    Redirect::temporary(&target)
}

fn login_redirect(params: &CallbackParams) -> String {
    match (params.code.as_deref(), params.state.as_deref()) {
        (Some(code), Some(state)) => format!(
            "/login?code={}&state={}",
            urlencoding::encode(code),
            urlencoding::encode(state)
        ),
        (Some(code), None) => format!("/login?code={}", urlencoding::encode(code)),
        (None, _) => "/login".to_string(),
    }
}
