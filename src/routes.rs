//! REST transport over an [`EntityStore`].
//!
//! Every route takes the registered type identifier as its first path segment,
//! so one router serves every registered type.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

use crate::core::Record;
use crate::errors::ApiError;
use crate::models::{FilterOptions, SearchRequest, SearchResponse};
use crate::operations::{CoreDao, EntityStore};

/// Outcome of a delete, `{"success": true, "message": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
}

impl MutationResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Router with every entity route mounted under `/api/entity`.
pub fn router(store: EntityStore) -> Router {
    Router::new()
        .route(
            "/api/entity/{entity}",
            get(search_query)
                .post(create_one)
                .put(update_one)
                .delete(mass_delete),
        )
        .route("/api/entity/{entity}/search", post(search_body))
        .route("/api/entity/{entity}/{id}", get(get_one).delete(delete_one))
        .with_state(store)
}

#[utoipa::path(
    get,
    path = "/api/entity/{entity}",
    params(
        ("entity" = String, Path, description = "Registered type identifier"),
        FilterOptions
    ),
    responses(
        (status = StatusCode::OK, description = "One page of matching records", body = Object),
        (status = StatusCode::BAD_REQUEST, description = "Invalid filter, field or pagination", body = MutationResponse),
        (status = StatusCode::NOT_FOUND, description = "Unknown entity type", body = MutationResponse)
    ),
    tag = "entities"
)]
pub async fn search_query(
    State(store): State<EntityStore>,
    Path(entity): Path<String>,
    Query(params): Query<FilterOptions>,
) -> Result<Json<SearchResponse>, ApiError> {
    let request = params.into_search_request()?;
    Ok(Json(store.search_entities(&entity, &request).await?))
}

#[utoipa::path(
    post,
    path = "/api/entity/{entity}/search",
    params(("entity" = String, Path, description = "Registered type identifier")),
    request_body = SearchRequest,
    responses(
        (status = StatusCode::OK, description = "One page of matching records", body = Object),
        (status = StatusCode::BAD_REQUEST, description = "Invalid filter, field or pagination", body = MutationResponse),
        (status = StatusCode::NOT_FOUND, description = "Unknown entity type", body = MutationResponse)
    ),
    tag = "entities"
)]
pub async fn search_body(
    State(store): State<EntityStore>,
    Path(entity): Path<String>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    Ok(Json(store.search_entities(&entity, &request).await?))
}

#[utoipa::path(
    get,
    path = "/api/entity/{entity}/{id}",
    params(
        ("entity" = String, Path, description = "Registered type identifier"),
        ("id" = i64, Path, description = "Record identifier")
    ),
    responses(
        (status = StatusCode::OK, description = "The requested record", body = Object),
        (status = StatusCode::NOT_FOUND, description = "Unknown type or no such record", body = MutationResponse)
    ),
    tag = "entities"
)]
pub async fn get_one(
    State(store): State<EntityStore>,
    Path((entity, id)): Path<(String, i64)>,
) -> Result<Json<Record>, ApiError> {
    store
        .find_by_id(&entity, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(entity, id))
}

#[utoipa::path(
    post,
    path = "/api/entity/{entity}",
    params(("entity" = String, Path, description = "Registered type identifier")),
    request_body = Object,
    responses(
        (status = StatusCode::CREATED, description = "The stored record", body = Object),
        (status = StatusCode::BAD_REQUEST, description = "Payload does not fit the type", body = MutationResponse)
    ),
    tag = "entities"
)]
pub async fn create_one(
    State(store): State<EntityStore>,
    Path(entity): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let record = store.registry().bind(&entity, payload)?;
    let created = store.create(&entity, record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Merge update: only the attributes present in the body are written, so the
/// body is checked against attribute domains rather than bound as a full record.
#[utoipa::path(
    put,
    path = "/api/entity/{entity}",
    params(("entity" = String, Path, description = "Registered type identifier")),
    request_body = Object,
    responses(
        (status = StatusCode::OK, description = "The merged record", body = Object),
        (status = StatusCode::BAD_REQUEST, description = "Payload does not fit the type", body = MutationResponse)
    ),
    tag = "entities"
)]
pub async fn update_one(
    State(store): State<EntityStore>,
    Path(entity): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<Record>, ApiError> {
    let serde_json::Value::Object(record) = payload else {
        return Err(ApiError::bad_request(format!(
            "{entity} update must be a JSON object"
        )));
    };
    Ok(Json(store.update(&entity, record).await?))
}

#[utoipa::path(
    delete,
    path = "/api/entity/{entity}/{id}",
    params(
        ("entity" = String, Path, description = "Registered type identifier"),
        ("id" = i64, Path, description = "Record identifier")
    ),
    responses(
        (status = StatusCode::OK, description = "Deleted, or already absent", body = MutationResponse)
    ),
    tag = "entities"
)]
pub async fn delete_one(
    State(store): State<EntityStore>,
    Path((entity, id)): Path<(String, i64)>,
) -> Result<Json<MutationResponse>, ApiError> {
    store.delete(&entity, id).await?;
    Ok(Json(MutationResponse::ok(format!("{entity} {id} deleted"))))
}

#[utoipa::path(
    delete,
    path = "/api/entity/{entity}",
    params(("entity" = String, Path, description = "Registered type identifier")),
    request_body = Vec<i64>,
    responses(
        (status = StatusCode::OK, description = "Every listed record is gone", body = MutationResponse)
    ),
    tag = "entities"
)]
pub async fn mass_delete(
    State(store): State<EntityStore>,
    Path(entity): Path<String>,
    Json(ids): Json<BTreeSet<i64>>,
) -> Result<Json<MutationResponse>, ApiError> {
    store.mass_delete(&entity, &ids).await?;
    Ok(Json(MutationResponse::ok(format!(
        "{} {entity} records deleted",
        ids.len()
    ))))
}
