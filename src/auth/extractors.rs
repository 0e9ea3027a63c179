use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::{warn, Span};

use super::validator::{CredentialValidator, Editor};
use crate::error::ApiError;

/// Extracts an authorized editor or rejects the request with 401.
pub struct AuthEditor(pub Editor);

#[async_trait]
impl<S> FromRequestParts<S> for AuthEditor
where
    S: Send + Sync,
    Arc<CredentialValidator>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let validator = <Arc<CredentialValidator> as FromRef<S>>::from_ref(state);
        match validator.authorize(&parts.headers) {
            Ok(editor) => {
                Span::current().record("editor_role", editor.role.as_str());
                Ok(AuthEditor(editor))
            }
            Err(reason) => {
                warn!(%reason, method = %parts.method, uri = %parts.uri, "write rejected");
                Err(ApiError::Unauthorized)
            }
        }
    }
}
