pub mod dto;
pub mod handlers;
pub mod memory;
pub mod model;
pub mod repo;
pub mod seed;

use crate::state::AppState;
use axum::Router;

pub use model::{Memorial, MemorialChanges, NewMemorial, Tag};
pub use repo::MemorialRepo;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::memorial_routes())
}
