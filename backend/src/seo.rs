use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use folio_shared::{build_robots, build_rss, build_sitemap};

use crate::state::AppState;

/// GET /rss.xml
pub async fn rss_xml(State(state): State<AppState>) -> Response {
    let items = state.repository.list_everything().await;
    let xml = build_rss(&state.site, &items);
    tracing::debug!("rss: {} published items", items.len());
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")], xml)
        .into_response()
}

/// GET /sitemap.xml
pub async fn sitemap_xml(State(state): State<AppState>) -> Response {
    let items = state.repository.list_everything().await;
    let xml = build_sitemap(&state.site, &items);
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml)
        .into_response()
}

/// GET /robots.txt
pub async fn robots_txt(State(state): State<AppState>) -> Response {
    let body = build_robots(&state.site);
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}
