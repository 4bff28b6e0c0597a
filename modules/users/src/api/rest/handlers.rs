use std::sync::Arc;

use api_ingress::problem::{Problem, ProblemResponse};
use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{error, info};

use crate::api::rest::dto::{UserDto, UserReq};
use crate::api::rest::error::{map_domain_error, user_not_found};
use crate::domain::service::Service;

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserReq,
    responses(
        (status = 200, description = "Created user", body = UserDto),
        (status = 409, description = "Email already in use", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    ),
    tag = "users",
    operation_id = "users.create_user"
)]
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req_body): Json<UserReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Creating user: {:?}", req_body);

    match svc.create_user(req_body.into()).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "Not Found", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    ),
    tag = "users",
    operation_id = "users.get_user"
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i64>,
    uri: Uri,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Getting user with id: {}", id);

    match svc.get_user(id).await {
        Ok(Some(user)) => Ok(Json(UserDto::from(user))),
        Ok(None) => Err(user_not_found(id, uri.path())),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List every user
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users, possibly empty", body = [UserDto]),
        (status = 500, description = "Internal Server Error", body = Problem)
    ),
    tag = "users",
    operation_id = "users.get_all_users"
)]
pub async fn get_all_users(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    info!("Listing users");

    match svc.get_all_users().await {
        Ok(users) => Ok(Json(users.into_iter().map(UserDto::from).collect())),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Overwrite an existing user
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = UserReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 404, description = "Not Found", body = Problem),
        (status = 409, description = "Email already in use", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    ),
    tag = "users",
    operation_id = "users.update_user"
)]
pub async fn update_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i64>,
    Json(req_body): Json<UserReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Updating user {} with: {:?}", id, req_body);

    match svc.update_user(id, req_body.into()).await {
        Ok(Some(user)) => Ok(Json(UserDto::from(user))),
        Ok(None) => Err(user_not_found(id, uri.path())),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a user by ID
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Not Found", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    ),
    tag = "users",
    operation_id = "users.delete_user"
)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i64>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting user: {}", id);

    match svc.delete_user(id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(user_not_found(id, uri.path())),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
