use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::api::rest::{handlers, openapi};
use crate::domain::service::Service;

/// Mount the users routes (and their OpenAPI document) on `router`.
/// The service is injected via `Extension`.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route(
            "/users",
            get(handlers::get_all_users).post(handlers::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/openapi.json", get(openapi::openapi_json))
        .layer(Extension(service))
}
