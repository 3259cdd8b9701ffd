use std::sync::Arc;

use folio_shared::{ContentRepository, RenderOptions, SiteConfig};

use crate::config::ServerConfig;

/// Shared, read-only handler state. Content is re-read on every request, so
/// nothing here needs a lock.
#[derive(Clone)]
pub struct AppState {
    /// Content repository.
    pub repository: Arc<ContentRepository>,
    /// Site identity for feeds and structured data.
    pub site: Arc<SiteConfig>,
}

impl AppState {
    /// State for a server configuration.
    pub fn new(config: &ServerConfig) -> Self {
        let repository = ContentRepository::open(&config.content_dir).with_render_options(RenderOptions {
            highlight: config.highlight,
        });
        Self::from_parts(repository, config.site.clone())
    }

    /// State from ready-made parts.
    pub fn from_parts(repository: ContentRepository, site: SiteConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            site: Arc::new(site),
        }
    }
}
