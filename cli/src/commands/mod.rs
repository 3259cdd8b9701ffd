//! One module per subcommand.

pub mod check;
pub mod export;
pub mod list;
pub mod show;
pub mod tags;

use anyhow::Result;
use folio_shared::{ContentRepository, SiteConfig};

use crate::cli::{Cli, Commands};

/// Run the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let repo = ContentRepository::open(&cli.content_dir);

    match cli.command {
        Commands::List {
            content_type,
            search,
            tags,
            sort,
            order,
            featured,
            json,
        } => {
            let options = list::ListOptions {
                search,
                tags,
                sort,
                order,
                featured,
                json,
            };
            list::run(&repo, content_type, &options).await
        },
        Commands::Show {
            content_type,
            slug,
            html,
        } => show::run(&repo, content_type, &slug, html).await,
        Commands::Tags {
            content_type,
        } => tags::run(&repo, content_type).await,
        Commands::Check {
            json,
        } => check::run(&repo, json).await,
        Commands::Feed {
            out,
            base_url,
        } => export::feed(&repo, &site_config(base_url.as_deref()), out.as_deref()).await,
        Commands::Sitemap {
            out,
            base_url,
        } => export::sitemap(&repo, &site_config(base_url.as_deref()), out.as_deref()).await,
    }
}

fn site_config(base_url: Option<&str>) -> SiteConfig {
    let site = SiteConfig::from_env();
    match base_url {
        Some(base_url) => site.with_base_url(base_url),
        None => site,
    }
}
