//! Content pipeline shared by the Folio backend and CLI.
//!
//! Markdown files are read from one directory per [`ContentType`], split into
//! frontmatter and body, normalized into [`ContentItem`]s, rendered to HTML
//! and then filtered / sorted for presentation. Nothing is cached: every call
//! re-reads the files it needs.

pub mod error;
pub mod filter;
pub mod frontmatter;
pub mod models;
pub mod normalize;
pub mod render;
pub mod repository;
pub mod site;
pub mod source;
pub mod syndication;

pub use error::ContentError;
pub use filter::{
    filter, paginate, sort, DateRange, FilterSpec, Page, ReadingTimeRange, SortDirection, SortField,
    SortSpec,
};
pub use frontmatter::{parse_frontmatter, Frontmatter, FrontmatterValue, HeaderState};
pub use models::{
    ContentItem, ContentType, ContentVariant, FictionFields, LeadershipFields, ProjectFields,
    TagCount, TechnicalFields, TtrpgFields,
};
pub use normalize::{normalize, slugify, NormalizeContext};
pub use render::{extract_headings, render_markdown, Heading, RenderOptions};
pub use repository::{count_tags, AuditReport, ContentRepository, SlugCollision};
pub use site::SiteConfig;
pub use source::{ContentSource, FsSource, MemorySource};
pub use syndication::{build_json_ld, build_robots, build_rss, build_sitemap, FEED_ITEM_LIMIT};
