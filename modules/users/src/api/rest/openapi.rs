use api_ingress::problem::Problem;
use axum::response::Json;
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};

/// OpenAPI document for the users REST surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        description = "CRUD operations on the User resource."
    ),
    paths(
        handlers::create_user,
        handlers::get_user,
        handlers::get_all_users,
        handlers::update_user,
        handlers::delete_user,
    ),
    components(schemas(dto::UserDto, dto::UserReq, Problem)),
    tags((name = "users", description = "User management"))
)]
pub struct UsersApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(UsersApiDoc::openapi())
}
