//! `folio tags`.

use anyhow::Result;
use folio_shared::{ContentRepository, ContentSource, ContentType};

use crate::utils::format_tag_table;

/// Print the tag index of one type.
pub async fn run<S: ContentSource>(repo: &ContentRepository<S>, content_type: ContentType) -> Result<()> {
    let tags = repo.tags(content_type).await;
    print!("{}", format_tag_table(&tags));
    Ok(())
}
