use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::{handlers, request_context::request_context_middleware, seo, state::AppState};

/// Every route with the request context and CORS layers.
pub fn create_router(state: AppState) -> Router {
    // Read-only public API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/content", get(handlers::list_all_content))
        .route("/api/content/:kind", get(handlers::list_content))
        .route("/api/content/:kind/tags", get(handlers::list_content_tags))
        .route("/api/content/:kind/:slug", get(handlers::get_content))
        .route("/rss.xml", get(seo::rss_xml))
        .route("/sitemap.xml", get(seo::sitemap_xml))
        .route("/robots.txt", get(seo::robots_txt))
        .with_state(state)
        .layer(middleware::from_fn(request_context_middleware))
        .layer(cors)
}
