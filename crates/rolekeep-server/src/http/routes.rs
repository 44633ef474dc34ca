//! HTTP route definitions and handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rolekeep_core::models::organization::{CreateOrganization, Organization};
use rolekeep_core::models::permission::{Permission, PermissionKey, UpsertPermission};
use rolekeep_core::models::user::{CreateUser, User};
use rolekeep_core::repository::{OrganizationRepository, PermissionRepository, UserRepository};
use serde::{Deserialize, Serialize};
use surrealdb::Connection;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::docs;
use super::error::{ApiError, ApiResult, JsonBody, QueryParams, error_codes};
use super::state::AppState;

/// Default request body size limit (1MB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates the HTTP router with the default body limit and timeout.
pub fn create_router<C: Connection>(state: AppState<C>) -> Router {
    create_router_with_limits(state, DEFAULT_BODY_LIMIT, DEFAULT_REQUEST_TIMEOUT)
}

/// Creates the HTTP router with a custom body limit and request timeout.
pub fn create_router_with_limits<C: Connection>(
    state: AppState<C>,
    body_limit: usize,
    request_timeout: Duration,
) -> Router {
    let shared_state = Arc::new(state);

    let router = Router::new()
        .route("/users", get(list_users::<C>).post(create_user::<C>))
        .route("/users/{user_id}", get(get_user::<C>))
        .route("/orgs", get(list_orgs::<C>).post(create_org::<C>))
        .route(
            "/permissions",
            post(upsert_permissions::<C>).delete(delete_permissions::<C>),
        )
        .route("/health", get(health_check))
        .route("/docs", get(docs::swagger_ui))
        .route("/openapi.json", get(docs::openapi_json))
        .with_state(shared_state)
        .layer(RequestBodyLimitLayer::new(body_limit));

    with_request_timeout(router, request_timeout).layer(TraceLayer::new_for_http())
}

/// Abort requests running longer than `request_timeout` with a 408 carrying
/// the standard error body.
pub fn with_request_timeout(router: Router, request_timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::map_response(timeout_error_body))
}

async fn timeout_error_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiError::new(error_codes::REQUEST_TIMEOUT, "request timed out").into_response();
    }
    response
}

// ============================================================
// Request / response bodies
// ============================================================

/// Optional case-insensitive substring filter on `name`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameFilter {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub count: usize,
    pub data: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrganizationListResponse {
    pub count: usize,
    pub data: Vec<Organization>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpsertPermissionsResponse {
    /// Number of distinct keys written.
    pub count: usize,
    pub created: u64,
    pub updated: u64,
    pub data: Vec<Permission>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletePermissionsResponse {
    pub deleted_count: u64,
    pub deleted: Vec<PermissionKey>,
    pub not_found: Vec<PermissionKey>,
    pub message: String,
}

// ============================================================
// Health
// ============================================================

/// Liveness probe. Does not touch the store.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Users
// ============================================================

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(NameFilter),
    responses((status = 200, description = "Matching users", body = UserListResponse))
)]
pub async fn list_users<C: Connection>(
    State(state): State<Arc<AppState<C>>>,
    QueryParams(filter): QueryParams<NameFilter>,
) -> ApiResult<Json<UserListResponse>> {
    let data = state.users.list(filter.name.as_deref()).await?;
    Ok(Json(UserListResponse {
        count: data.len(),
        data,
    }))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "users",
    params(("user_id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "No such user", body = ApiError)
    )
)]
pub async fn get_user<C: Connection>(
    State(state): State<Arc<AppState<C>>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = Uuid::parse_str(&user_id)
        .map_err(|_| ApiError::validation_error(format!("invalid user id: {user_id}")))?;
    let user = state.users.get_by_id(id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Malformed request", body = ApiError),
        (status = 409, description = "Id already taken", body = ApiError)
    )
)]
pub async fn create_user<C: Connection>(
    State(state): State<Arc<AppState<C>>>,
    JsonBody(input): JsonBody<CreateUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state.users.create(input).await?;
    info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

// ============================================================
// Organizations
// ============================================================

#[utoipa::path(
    get,
    path = "/orgs",
    tag = "orgs",
    params(NameFilter),
    responses(
        (status = 200, description = "Matching organizations", body = OrganizationListResponse)
    )
)]
pub async fn list_orgs<C: Connection>(
    State(state): State<Arc<AppState<C>>>,
    QueryParams(filter): QueryParams<NameFilter>,
) -> ApiResult<Json<OrganizationListResponse>> {
    let data = state.orgs.list(filter.name.as_deref()).await?;
    Ok(Json(OrganizationListResponse {
        count: data.len(),
        data,
    }))
}

#[utoipa::path(
    post,
    path = "/orgs",
    tag = "orgs",
    request_body = CreateOrganization,
    responses(
        (status = 201, description = "Organization created", body = Organization),
        (status = 400, description = "Malformed request", body = ApiError),
        (status = 409, description = "Name already taken", body = ApiError)
    )
)]
pub async fn create_org<C: Connection>(
    State(state): State<Arc<AppState<C>>>,
    JsonBody(input): JsonBody<CreateOrganization>,
) -> ApiResult<impl IntoResponse> {
    let org = state.orgs.create(input).await?;
    info!(org_id = %org.id, name = %org.name, "Organization created");
    Ok((StatusCode::CREATED, Json(org)))
}

// ============================================================
// Permissions
// ============================================================

#[utoipa::path(
    post,
    path = "/permissions",
    tag = "permissions",
    request_body = Vec<UpsertPermission>,
    responses(
        (status = 200, description = "Resulting permission set", body = UpsertPermissionsResponse),
        (status = 400, description = "Malformed entries", body = ApiError)
    )
)]
pub async fn upsert_permissions<C: Connection>(
    State(state): State<Arc<AppState<C>>>,
    JsonBody(entries): JsonBody<Vec<UpsertPermission>>,
) -> ApiResult<Json<UpsertPermissionsResponse>> {
    let result = state.permissions.bulk_upsert(entries).await?;
    info!(
        created = result.created,
        updated = result.updated,
        "Permissions upserted"
    );

    Ok(Json(UpsertPermissionsResponse {
        count: result.permissions.len(),
        created: result.created,
        updated: result.updated,
        data: result.permissions,
    }))
}

#[utoipa::path(
    delete,
    path = "/permissions",
    tag = "permissions",
    request_body = Vec<PermissionKey>,
    responses(
        (status = 200, description = "Deletion report", body = DeletePermissionsResponse),
        (status = 400, description = "Malformed request", body = ApiError)
    )
)]
pub async fn delete_permissions<C: Connection>(
    State(state): State<Arc<AppState<C>>>,
    JsonBody(keys): JsonBody<Vec<PermissionKey>>,
) -> ApiResult<Json<DeletePermissionsResponse>> {
    let result = state.permissions.bulk_delete(keys).await?;
    let deleted_count = result.deleted_count();
    info!(
        deleted = deleted_count,
        not_found = result.not_found.len(),
        "Permissions deleted"
    );

    let message = if deleted_count == 0 {
        "No permission matched the given keys".to_string()
    } else {
        format!("{deleted_count} permissions removed")
    };

    Ok(Json(DeletePermissionsResponse {
        deleted_count,
        deleted: result.deleted,
        not_found: result.not_found,
        message,
    }))
}
