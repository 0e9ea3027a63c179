use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{auth::AuthEditor, error::ApiError, state::AppState};

use super::{
    dto::{CreateMemorialRequest, DeletedResponse, UpdateMemorialRequest},
    model::Memorial,
};

pub fn memorial_routes() -> Router<AppState> {
    Router::new()
        .route("/memorials", get(list_memorials).post(create_memorial))
        .route(
            "/memorials/:id",
            get(get_memorial).put(update_memorial).delete(delete_memorial),
        )
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::Validation("Invalid ID".into()))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

#[instrument(skip(state))]
pub async fn list_memorials(State(state): State<AppState>) -> Result<Json<Vec<Memorial>>, ApiError> {
    let memorials = state
        .memorials
        .list()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch memorials", e))?;
    Ok(Json(memorials))
}

#[instrument(skip(state))]
pub async fn get_memorial(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Memorial>, ApiError> {
    let id = parse_id(&id)?;
    state
        .memorials
        .get(id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch memorial", e))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[instrument(skip(state, payload))]
pub async fn create_memorial(
    State(state): State<AppState>,
    AuthEditor(editor): AuthEditor,
    payload: Result<Json<CreateMemorialRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<Memorial>), ApiError> {
    let new = json_body(payload)?.validate()?;
    let memorial = state
        .memorials
        .create(new)
        .await
        .map_err(|e| ApiError::internal("Failed to create memorial", e))?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/memorials/{}", memorial.id)) {
        headers.insert(header::LOCATION, location);
    }

    info!(id = memorial.id, role = %editor.role, subject = ?editor.subject, "memorial created");
    Ok((StatusCode::CREATED, headers, Json(memorial)))
}

#[instrument(skip(state, payload))]
pub async fn update_memorial(
    State(state): State<AppState>,
    AuthEditor(editor): AuthEditor,
    Path(id): Path<String>,
    payload: Result<Json<UpdateMemorialRequest>, JsonRejection>,
) -> Result<Json<Memorial>, ApiError> {
    let id = parse_id(&id)?;
    let changes = json_body(payload)?.validate()?;
    let memorial = state
        .memorials
        .update(id, changes)
        .await
        .map_err(|e| ApiError::internal("Failed to update memorial", e))?
        .ok_or(ApiError::NotFound)?;

    info!(id, role = %editor.role, subject = ?editor.subject, "memorial updated");
    Ok(Json(memorial))
}

#[instrument(skip(state))]
pub async fn delete_memorial(
    State(state): State<AppState>,
    AuthEditor(editor): AuthEditor,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state
        .memorials
        .delete(id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete memorial", e))?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    info!(id, role = %editor.role, subject = ?editor.subject, "memorial deleted");
    Ok(Json(DeletedResponse::new()))
}
