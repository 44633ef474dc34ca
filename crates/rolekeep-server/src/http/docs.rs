//! OpenAPI document and the interactive documentation page.

use axum::{Json, response::Html};
use rolekeep_core::models::organization::{CreateOrganization, Organization};
use rolekeep_core::models::permission::{Permission, PermissionKey, UpsertPermission};
use rolekeep_core::models::user::{CreateUser, User};
use utoipa::OpenApi;

use super::error::ApiError;
use super::routes::{
    self, DeletePermissionsResponse, OrganizationListResponse, UpsertPermissionsResponse,
    UserListResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "rolekeep",
        description = "Users, organizations and the permissions linking them"
    ),
    paths(
        routes::list_users,
        routes::get_user,
        routes::create_user,
        routes::list_orgs,
        routes::create_org,
        routes::upsert_permissions,
        routes::delete_permissions,
    ),
    components(schemas(
        User,
        CreateUser,
        UserListResponse,
        Organization,
        CreateOrganization,
        OrganizationListResponse,
        Permission,
        PermissionKey,
        UpsertPermission,
        UpsertPermissionsResponse,
        DeletePermissionsResponse,
        ApiError,
    )),
    tags(
        (name = "users", description = "User records"),
        (name = "orgs", description = "Organization records"),
        (name = "permissions", description = "Bulk permission writes"),
    )
)]
pub struct ApiDoc;

const SWAGGER_UI_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>rolekeep API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>
"##;

pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI_PAGE)
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
