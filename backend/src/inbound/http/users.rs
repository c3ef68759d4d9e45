//! User directory HTTP handlers.
//!
//! ```text
//! POST   /api/v1/users        {"email":"ada@example.com","name":"Ada"}
//! GET    /api/v1/users/{id}
//! PATCH  /api/v1/users/{id}   {"name":"Ada Lovelace"}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Every handler runs under the request deadline held in [`HttpState`].

use std::future::Future;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ports::UpdateUserRequest;
use crate::domain::{Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Unique email address.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Display name.
    #[schema(example = "Ada Lovelace")]
    pub name: String,
}

/// Request body for `PATCH /api/v1/users/{id}`. Omitted or empty fields
/// are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    /// Replacement email.
    #[serde(default)]
    pub email: Option<String>,
    /// Replacement name.
    #[serde(default)]
    pub name: Option<String>,
}

/// User record as returned on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Store-assigned identifier.
    #[schema(example = 42)]
    pub id: i64,
    /// Unique email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Creation time in RFC 3339.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.get(),
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

/// JSON extractor configuration that reports malformed bodies with the
/// shared error payload instead of Actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        warn!(error = %err, "rejected malformed JSON body");
        Error::invalid_input(format!("invalid request body: {err}")).into()
    })
}

fn parse_user_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| Error::invalid_input(format!("user id must be an integer, got {raw:?}")))
}

async fn within_deadline<T>(
    state: &HttpState,
    operation: impl Future<Output = ApiResult<T>>,
) -> ApiResult<T> {
    tokio::time::timeout(state.request_timeout, operation)
        .await
        .map_err(|_| {
            Error::internal(format!(
                "request deadline of {}ms exceeded",
                state.request_timeout.as_millis()
            ))
        })?
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let CreateUserRequest { email, name } = payload.into_inner();
    let user = within_deadline(&state, state.users.create_user(&email, &name)).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Fetch a user by identifier.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "No such user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_user_id(&path.into_inner())?;
    let user = within_deadline(&state, state.users.get_user(id))
        .await?
        .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;
    Ok(web::Json(user.into()))
}

/// Apply a partial update.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No such user", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserPayload>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_user_id(&path.into_inner())?;
    let UpdateUserPayload { email, name } = payload.into_inner();
    let request = UpdateUserRequest {
        id,
        email: email.unwrap_or_default(),
        name: name.unwrap_or_default(),
    };
    let user = within_deadline(&state, state.users.update_user(request)).await?;
    Ok(web::Json(user.into()))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "No such user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner())?;
    within_deadline(&state, state.users.delete_user(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the user routes on a scope or app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_user)
        .service(get_user)
        .service(update_user)
        .service(delete_user);
}
