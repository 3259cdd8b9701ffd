use std::{fmt, str::FromStr};

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use folio_shared::{
    build_json_ld, count_tags, filter, paginate, sort, ContentItem, ContentType, DateRange,
    FilterSpec, ReadingTimeRange, SortDirection, SortField, SortSpec, TagCount,
};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::state::AppState;

const DEFAULT_PER_PAGE: usize = folio_shared::filter::DEFAULT_PER_PAGE;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Query string accepted by the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    /// Free text search.
    #[serde(default)]
    pub q: Option<String>,
    /// Comma separated; every tag must match.
    #[serde(default)]
    pub tags: Option<String>,
    /// Earliest date, `YYYY-MM-DD`.
    #[serde(default)]
    pub from: Option<String>,
    /// Latest date, `YYYY-MM-DD`.
    #[serde(default)]
    pub to: Option<String>,
    /// Shortest reading time in minutes.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_read: Option<u32>,
    /// Longest reading time in minutes.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_read: Option<u32>,
    /// `true` or `false`; blank means either.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub featured: Option<bool>,
    /// Leadership or fiction category.
    #[serde(default)]
    pub category: Option<String>,
    /// Technical difficulty.
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Technical article `type`.
    #[serde(default)]
    pub kind: Option<String>,
    /// Technical code language.
    #[serde(default)]
    pub language: Option<String>,
    /// Fiction region.
    #[serde(default)]
    pub region: Option<String>,
    /// Fiction or project status.
    #[serde(default)]
    pub status: Option<String>,
    /// TTRPG rule system.
    #[serde(default)]
    pub system: Option<String>,
    /// TTRPG availability.
    #[serde(default)]
    pub availability: Option<String>,
    /// TTRPG playtested flag.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub playtested: Option<bool>,
    /// `date`, `title` or `reading_time`.
    #[serde(default)]
    pub sort: Option<String>,
    /// `asc` or `desc`.
    #[serde(default)]
    pub order: Option<String>,
    /// 1-based page number.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<usize>,
    /// Page size, at most 100.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub per_page: Option<usize>,
}

/// Blank values such as `?min_read=` count as absent.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|err| de::Error::custom(format!("invalid value '{value}': {err}"))),
    }
}

fn query_or_bad_request(
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> Result<ContentQuery, ApiError> {
    query.map(|Query(query)| query).map_err(|rejection| {
        tracing::debug!("Rejected query string: {}", rejection.body_text());
        bad_request(&rejection.body_text())
    })
}

impl ContentQuery {
    fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            search: self.q.clone(),
            tags: self
                .tags
                .as_deref()
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|tag| !tag.is_empty())
                        .map(ToOwned::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
            date_range: DateRange::from_strs(
                self.from.as_deref().unwrap_or_default(),
                self.to.as_deref().unwrap_or_default(),
            ),
            reading_time: ReadingTimeRange {
                min: self.min_read,
                max: self.max_read,
            },
            featured: self.featured,
            category: self.category.clone(),
            difficulty: self.difficulty.clone(),
            kind: self.kind.clone(),
            language: self.language.clone(),
            region: self.region.clone(),
            status: self.status.clone(),
            system: self.system.clone(),
            availability: self.availability.clone(),
            playtested: self.playtested,
        }
    }

    fn sort_spec(&self) -> Result<SortSpec, ApiError> {
        let field = match self.sort.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw.parse::<SortField>().map_err(|err| bad_request(&err))?,
            None => SortField::default(),
        };
        let direction = match self.order.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw.parse::<SortDirection>().map_err(|err| bad_request(&err))?,
            None => SortDirection::default(),
        };
        Ok(SortSpec {
            field,
            direction,
        })
    }
}

/// Body of the list endpoints.
#[derive(Debug, Serialize)]
pub struct ContentListResponse {
    /// Requested page of matching items.
    pub items: Vec<ContentItem>,
    /// Every tag of the listed content type(s), sorted, before filtering.
    pub tags: Vec<String>,
    /// Matching items before paging.
    pub total: usize,
    /// 1-based page number.
    pub page: usize,
    /// Page size after clamping.
    pub per_page: usize,
    /// Number of pages.
    pub total_pages: usize,
}

/// Body of the single item endpoint.
#[derive(Debug, Serialize)]
pub struct ContentItemResponse {
    /// Item with rendered `content`.
    pub item: ContentItem,
    /// schema.org JSON-LD for the item page.
    pub structured_data: serde_json::Value,
}

/// Body of the tags endpoint.
#[derive(Debug, Serialize)]
pub struct TagsResponse {
    /// Tags sorted by name.
    pub tags: Vec<TagCount>,
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human readable message.
    pub error: String,
    /// HTTP status code.
    pub code: u16,
}

fn parse_content_type(raw: &str) -> Result<ContentType, ApiError> {
    raw.parse::<ContentType>().map_err(|err| {
        tracing::debug!("{err}");
        not_found("Unknown content type")
    })
}

fn list_response(items: Vec<ContentItem>, query: &ContentQuery) -> Result<ContentListResponse, ApiError> {
    let sort_spec = query.sort_spec()?;
    let tags = count_tags(&items).into_iter().map(|tag| tag.name).collect();
    let matching = sort(&filter(&items, &query.filter_spec()), &sort_spec);
    let page = paginate(
        matching,
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(DEFAULT_PER_PAGE),
    );

    Ok(ContentListResponse {
        items: page.items,
        tags,
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages,
    })
}

/// GET /api/content/:kind
pub async fn list_content(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> Result<Json<ContentListResponse>, ApiError> {
    let content_type = parse_content_type(&kind)?;
    let query = query_or_bad_request(query)?;
    let items = state.repository.list_all(content_type).await;
    Ok(Json(list_response(items, &query)?))
}

/// GET /api/content
pub async fn list_all_content(
    State(state): State<AppState>,
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> Result<Json<ContentListResponse>, ApiError> {
    let query = query_or_bad_request(query)?;
    let items = state.repository.list_everything().await;
    Ok(Json(list_response(items, &query)?))
}

/// GET /api/content/:kind/tags
pub async fn list_content_tags(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<TagsResponse>, ApiError> {
    let content_type = parse_content_type(&kind)?;
    let tags = state.repository.tags(content_type).await;
    Ok(Json(TagsResponse {
        tags,
    }))
}

/// GET /api/content/:kind/:slug
pub async fn get_content(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
) -> Result<Json<ContentItemResponse>, ApiError> {
    let content_type = parse_content_type(&kind)?;

    match state.repository.get_by_slug(content_type, &slug).await {
        Some(item) => {
            let structured_data = build_json_ld(&state.site, &item);
            Ok(Json(ContentItemResponse {
                item,
                structured_data,
            }))
        },
        None => Err(not_found("Content not found")),
    }
}

fn not_found(message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
            code: 404,
        }),
    )
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: 400,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_maps_to_filter_spec() {
        let query = ContentQuery {
            q: Some("rust".to_string()),
            tags: Some("async, tokio,,".to_string()),
            from: Some("2024-01-01".to_string()),
            min_read: Some(2),
            playtested: Some(true),
            ..ContentQuery::default()
        };
        let spec = query.filter_spec();

        assert_eq!(spec.search.as_deref(), Some("rust"));
        assert_eq!(spec.tags, vec!["async".to_string(), "tokio".to_string()]);
        assert!(spec.date_range.start.is_some());
        assert!(spec.date_range.end.is_none());
        assert_eq!(spec.reading_time.min, Some(2));
        assert_eq!(spec.playtested, Some(true));
    }

    #[test]
    fn sort_spec_rejects_unknown_keywords() {
        let query = ContentQuery {
            sort: Some("popularity".to_string()),
            ..ContentQuery::default()
        };
        let (status, body) = query.sort_spec().expect_err("unknown field");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, 400);

        let query = ContentQuery {
            sort: Some("title".to_string()),
            order: Some("asc".to_string()),
            ..ContentQuery::default()
        };
        let spec = query.sort_spec().expect("valid sort");
        assert_eq!(spec.field, SortField::Title);
        assert_eq!(spec.direction, SortDirection::Asc);
    }
}
