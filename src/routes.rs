use crate::{SharedData, api, logging};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Assembles every route the service exposes. JSON routes live under `/api`; the
/// interactive docs are served from `/swagger-ui`.
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let api_routes = Router::new()
        .nest("/auth", api::auth::auth_routes())
        .nest("/tasks", api::task::task_routes())
        .nest("/admin", api::admin::admin_routes());

    let router = Router::new()
        .nest("/api", api_routes)
        .merge(api::swagger_main::build_documentation())
        .layer(CorsLayer::permissive());

    logging::attach_tracing_http(router).with_state(shared_data)
}
