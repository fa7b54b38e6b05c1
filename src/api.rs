// HTTP surface - axum router over the Type Catalog and Entry Store
//
// One shared connection behind a mutex. Each handler holds the lock for a
// single store call; writes run inside their own transaction.

use crate::config::Settings;
use crate::entities::data_entry::{
    create_data_entry, delete_data_entry, get_data_entry, list_data_entries, update_data_entry,
    DataEntry, DataEntryInput, EntryFilter,
};
use crate::entities::data_type::{
    create_data_type, delete_data_type, get_data_type, list_data_types, update_data_type,
    DataType, DataTypeInput, DEFAULT_LIST_LIMIT,
};
use crate::error::StoreError;
use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request, State,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    settings: Arc<Settings>,
}

impl AppState {
    /// Wrap a connection whose schema is already set up
    pub fn new(conn: Connection, settings: Settings) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            settings: Arc::new(settings),
        }
    }

    /// Borrow the connection for the length of one operation
    fn session(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db.lock().map_err(|_| ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "database connection unavailable".to_string(),
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error body: `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl ApiError {
    /// Map a store failure; `storage_status` covers unexpected database errors
    fn from_store(err: StoreError, storage_status: StatusCode) -> Self {
        let status = match &err {
            StoreError::Validation(_) | StoreError::InvalidReference => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Storage(_) => storage_status,
        };
        ApiError {
            status,
            detail: err.to_string(),
        }
    }

    fn bad_request(detail: String) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            detail,
        }
    }

    /// Write paths report unexpected database failures as 400
    fn on_write(err: StoreError) -> Self {
        Self::from_store(err, StatusCode::BAD_REQUEST)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::from_store(err, StatusCode::INTERNAL_SERVER_ERROR)
    }
}

// Malformed bodies, query strings and path ids are all client input errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, detail = %self.detail, "request failed");
        } else {
            tracing::warn!(status = %self.status, detail = %self.detail, "request rejected");
        }
        (self.status, Json(ErrorBody { detail: &self.detail })).into_response()
    }
}

// ============================================================================
// Response shapes
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    environment: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    skip: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

// ============================================================================
// Extractors - axum's own, with rejections reported as `{"detail"}` 400s
// ============================================================================

struct JsonBody<T>(T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

struct QueryParams<T>(T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(QueryParams(value))
    }
}

struct RecordId(i64);

#[async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        Ok(RecordId(id))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        environment: state.settings.environment.clone(),
    })
}

/// POST /data-types/
#[tracing::instrument(skip(state))]
async fn create_type(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<DataTypeInput>,
) -> Result<Json<DataType>, ApiError> {
    let mut conn = state.session()?;
    let created = create_data_type(&mut conn, &input).map_err(ApiError::on_write)?;
    Ok(Json(created))
}

/// GET /data-types/?skip=&limit=
#[tracing::instrument(skip(state))]
async fn list_types(
    State(state): State<AppState>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<Vec<DataType>>, ApiError> {
    let conn = state.session()?;
    Ok(Json(list_data_types(&conn, page.skip, page.limit)?))
}

/// GET /data-types/:id
#[tracing::instrument(skip(state))]
async fn get_type(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<DataType>, ApiError> {
    let conn = state.session()?;
    Ok(Json(get_data_type(&conn, id)?))
}

/// PUT /data-types/:id
#[tracing::instrument(skip(state))]
async fn update_type(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(input): JsonBody<DataTypeInput>,
) -> Result<Json<DataType>, ApiError> {
    let mut conn = state.session()?;
    let updated = update_data_type(&mut conn, id, &input).map_err(ApiError::on_write)?;
    Ok(Json(updated))
}

/// DELETE /data-types/:id
#[tracing::instrument(skip(state))]
async fn delete_type(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut conn = state.session()?;
    delete_data_type(&mut conn, id).map_err(ApiError::on_write)?;
    Ok(Json(MessageResponse::new("Data type deleted successfully")))
}

/// POST /data-entries/
#[tracing::instrument(skip(state))]
async fn create_entry(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<DataEntryInput>,
) -> Result<Json<DataEntry>, ApiError> {
    let mut conn = state.session()?;
    Ok(Json(create_data_entry(&mut conn, &input)?))
}

/// GET /data-entries/?start_date=&end_date=&type=
#[tracing::instrument(skip(state))]
async fn list_entries(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<EntryFilter>,
) -> Result<Json<Vec<DataEntry>>, ApiError> {
    let conn = state.session()?;
    Ok(Json(list_data_entries(&conn, &filter)?))
}

/// GET /data-entries/:id
#[tracing::instrument(skip(state))]
async fn get_entry(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<DataEntry>, ApiError> {
    let conn = state.session()?;
    Ok(Json(get_data_entry(&conn, id)?))
}

/// PUT /data-entries/:id
#[tracing::instrument(skip(state))]
async fn update_entry(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(input): JsonBody<DataEntryInput>,
) -> Result<Json<DataEntry>, ApiError> {
    let mut conn = state.session()?;
    let updated = update_data_entry(&mut conn, id, &input).map_err(ApiError::on_write)?;
    Ok(Json(updated))
}

/// DELETE /data-entries/:id
#[tracing::instrument(skip(state))]
async fn delete_entry(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut conn = state.session()?;
    delete_data_entry(&mut conn, id).map_err(ApiError::on_write)?;
    Ok(Json(MessageResponse::new("Data entry deleted successfully")))
}

// ============================================================================
// Router
// ============================================================================

/// Build the full application router, CORS and request tracing included
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/data-types", get(list_types).post(create_type))
        .route("/data-types/", get(list_types).post(create_type))
        .route(
            "/data-types/:id",
            get(get_type).put(update_type).delete(delete_type),
        )
        .route("/data-entries", get(list_entries).post(create_entry))
        .route("/data-entries/", get(list_entries).post(create_entry))
        .route(
            "/data-entries/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
