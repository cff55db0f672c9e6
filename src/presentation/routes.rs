use axum::{Router, routing::{get, post}};
use std::sync::Arc;
use crate::presentation::handlers;
use crate::services::search::SearchService;

/// 应用状态
pub struct AppContext {
    pub search_service: SearchService,
}

/// 创建应用路由
pub fn create_app_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .nest("/api/github", api_routes())
        .with_state(ctx)
}

/// API 路由
fn api_routes() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/search", post(handlers::github::search_repositories))
        .route("/repositories", get(handlers::github::list_repositories))
}
