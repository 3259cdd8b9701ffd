//! `folio show`.

use anyhow::{Context, Result};
use folio_shared::{ContentRepository, ContentSource, ContentType};

use crate::utils::format_item_details;

/// Print one item, or its rendered HTML.
pub async fn run<S: ContentSource>(
    repo: &ContentRepository<S>,
    content_type: ContentType,
    slug: &str,
    html: bool,
) -> Result<()> {
    let item = repo
        .get_by_slug(content_type, slug)
        .await
        .with_context(|| format!("No published {content_type} item with slug '{slug}'"))?;

    if html {
        print!("{}", item.content.as_deref().unwrap_or_default());
    } else {
        print!("{}", format_item_details(&item));
    }
    Ok(())
}
