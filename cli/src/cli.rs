//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio_shared::{ContentType, SortDirection, SortField};

/// Folio content tooling.
#[derive(Parser)]
#[command(name = "folio", version)]
pub struct Cli {
    /// Content root holding one directory per content type.
    #[arg(long, global = true, env = "CONTENT_DIR", default_value = "./content")]
    pub content_dir: PathBuf,
    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands of `folio`.
#[derive(Subcommand)]
pub enum Commands {
    /// List published items of one content type.
    List {
        /// leadership, technical, artumin, dnd or projects.
        content_type: ContentType,
        /// Case-insensitive text search.
        #[arg(long)]
        search: Option<String>,
        /// Required tag; repeat or comma-separate for several.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Sort key: date, title or reading_time.
        #[arg(long, default_value = "date")]
        sort: SortField,
        /// asc or desc.
        #[arg(long, default_value = "desc")]
        order: SortDirection,
        /// Only featured (true) or only non-featured (false) items.
        #[arg(long)]
        featured: Option<bool>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print one item.
    Show {
        /// leadership, technical, artumin, dnd or projects.
        content_type: ContentType,
        /// Slug derived from the file name.
        slug: String,
        /// Print rendered HTML instead of the metadata summary.
        #[arg(long)]
        html: bool,
    },
    /// Tag index of one content type.
    Tags {
        /// leadership, technical, artumin, dnd or projects.
        content_type: ContentType,
    },
    /// Audit every content directory; fails on slug collisions and
    /// unreadable files.
    Check {
        /// Print the reports as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Write the RSS feed.
    Feed {
        /// Output file (stdout when omitted).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Public origin used for links.
        #[arg(long, env = "SITE_BASE_URL")]
        base_url: Option<String>,
    },
    /// Write the XML sitemap.
    Sitemap {
        /// Output file (stdout when omitted).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Public origin used for links.
        #[arg(long, env = "SITE_BASE_URL")]
        base_url: Option<String>,
    },
}
