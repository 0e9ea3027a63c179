use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod extractors;
pub mod handlers;
pub mod validator;

pub use extractors::AuthEditor;
pub use validator::{AuthFailure, CredentialValidator, Editor};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
