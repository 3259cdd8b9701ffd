//! Public identity of the site.

use std::env;

use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TITLE: &str = "Folio";
const DEFAULT_DESCRIPTION: &str = "Leadership, technical writing, fiction, TTRPG material and projects.";
const DEFAULT_LANGUAGE: &str = "en-us";

/// Site identity used by the feed, sitemap and structured data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Absolute origin without a trailing slash.
    pub base_url: String,
    /// Feed and site title.
    pub title: String,
    /// Feed description.
    pub description: String,
    /// Default author for feeds and structured data.
    pub author: Option<String>,
    /// Language tag, e.g. `en-us`.
    pub language: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            author: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl SiteConfig {
    /// Read `SITE_BASE_URL`, `SITE_TITLE`, `SITE_DESCRIPTION`, `SITE_AUTHOR`
    /// and `SITE_LANGUAGE`. Blank values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`SiteConfig::from_env`] with an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        Self {
            base_url: get("SITE_BASE_URL")
                .and_then(|raw| normalize_base_url(&raw))
                .unwrap_or(defaults.base_url),
            title: get("SITE_TITLE").unwrap_or(defaults.title),
            description: get("SITE_DESCRIPTION").unwrap_or(defaults.description),
            author: get("SITE_AUTHOR"),
            language: get("SITE_LANGUAGE").unwrap_or(defaults.language),
        }
    }

    /// Override the origin, e.g. from a command line flag.
    pub fn with_base_url(mut self, raw: &str) -> Self {
        if let Some(base_url) = normalize_base_url(raw) {
            self.base_url = base_url;
        }
        self
    }

    /// `path` joined onto the origin.
    pub fn absolute_url(&self, path: &str) -> String {
        if path.is_empty() || path == "/" {
            return format!("{}/", self.base_url);
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> Option<String> {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {
            Some(url.as_str().trim_end_matches('/').to_string())
        },
        _ => {
            tracing::warn!("Ignoring invalid site base URL: {raw}");
            None
        },
    }
}
