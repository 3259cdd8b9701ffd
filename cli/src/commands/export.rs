//! `folio feed` and `folio sitemap`.

use std::path::Path;

use anyhow::Result;
use folio_shared::{build_rss, build_sitemap, ContentRepository, ContentSource, SiteConfig};

use crate::utils::write_output;

/// Write the RSS feed to `out`, or stdout.
pub async fn feed<S: ContentSource>(
    repo: &ContentRepository<S>,
    site: &SiteConfig,
    out: Option<&Path>,
) -> Result<()> {
    let items = repo.list_everything().await;
    write_output(out, &build_rss(site, &items))
}

/// Write the XML sitemap to `out`, or stdout.
pub async fn sitemap<S: ContentSource>(
    repo: &ContentRepository<S>,
    site: &SiteConfig,
    out: Option<&Path>,
) -> Result<()> {
    let items = repo.list_everything().await;
    write_output(out, &build_sitemap(site, &items))
}
