//! `folio list`.

use anyhow::{Context, Result};
use folio_shared::{
    filter, sort, ContentItem, ContentRepository, ContentSource, ContentType, FilterSpec,
    SortDirection, SortField, SortSpec,
};

use crate::utils::{format_item_table, parse_tags};

/// Flags of `folio list`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Free text search.
    pub search: Option<String>,
    /// Raw `--tag` values.
    pub tags: Vec<String>,
    /// Sort key.
    pub sort: SortField,
    /// Sort order.
    pub order: SortDirection,
    /// Featured filter.
    pub featured: Option<bool>,
    /// Print JSON instead of a table.
    pub json: bool,
}

/// Filtered and sorted listing.
pub async fn select<S: ContentSource>(
    repo: &ContentRepository<S>,
    content_type: ContentType,
    options: &ListOptions,
) -> Vec<ContentItem> {
    let items = repo.list_all(content_type).await;
    let spec = FilterSpec {
        search: options.search.clone(),
        tags: parse_tags(&options.tags),
        featured: options.featured,
        ..FilterSpec::default()
    };
    sort(&filter(&items, &spec), &SortSpec {
        field: options.sort,
        direction: options.order,
    })
}

/// Print the listing.
pub async fn run<S: ContentSource>(
    repo: &ContentRepository<S>,
    content_type: ContentType,
    options: &ListOptions,
) -> Result<()> {
    let items = select(repo, content_type, options).await;

    if options.json {
        let json = serde_json::to_string_pretty(&items).context("Failed to serialize items")?;
        println!("{json}");
    } else {
        print!("{}", format_item_table(&items));
    }
    tracing::debug!("Listed {} {} item(s)", items.len(), content_type);
    Ok(())
}
