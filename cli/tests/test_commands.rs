//! Integration tests for CLI commands.

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use folio_cli::{
        cli::{Cli, Commands},
        commands::{check, export, list},
    };
    use folio_shared::{ContentRepository, ContentType, SiteConfig, SortDirection, SortField};
    use tempfile::TempDir;

    fn write(dir: &TempDir, relative: &str, contents: &str) {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create content dir");
        }
        fs::write(path, contents).expect("write content file");
    }

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().expect("create temp dir");
        write(
            &dir,
            "leadership/one-on-ones.md",
            "---\ntitle: Better One-on-Ones\ndate: 2024-01-05\ntags: [management, \
             coaching]\nfeatured: true\n---\n\nListen more than you talk.\n",
        );
        write(
            &dir,
            "leadership/hiring.md",
            "---\ntitle: Hiring Loops\ndate: 2024-03-20\ntags: [hiring]\n---\n\nStructure every \
             interview.\n",
        );
        dir
    }

    #[test]
    fn list_arguments_parse() {
        let cli = Cli::try_parse_from([
            "folio",
            "--content-dir",
            "/tmp/content",
            "list",
            "leadership",
            "--tag",
            "management,coaching",
            "--sort",
            "title",
            "--order",
            "asc",
        ])
        .expect("parse list");

        assert_eq!(cli.content_dir, std::path::PathBuf::from("/tmp/content"));
        match cli.command {
            Commands::List {
                content_type,
                tags,
                sort,
                order,
                ..
            } => {
                assert_eq!(content_type, ContentType::Leadership);
                assert_eq!(tags, vec!["management,coaching"]);
                assert_eq!(sort, SortField::Title);
                assert_eq!(order, SortDirection::Asc);
            },
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn unknown_content_type_is_rejected() {
        assert!(Cli::try_parse_from(["folio", "tags", "poetry"]).is_err());
    }

    #[tokio::test]
    async fn list_applies_tag_filter_and_sort() {
        let dir = fixture();
        let repo = ContentRepository::open(dir.path());

        let all = list::select(&repo, ContentType::Leadership, &list::ListOptions::default()).await;
        let slugs: Vec<_> = all.iter().map(|item| item.slug.as_str()).collect();
        assert_eq!(slugs, vec!["hiring", "one-on-ones"]);

        let tagged = list::select(&repo, ContentType::Leadership, &list::ListOptions {
            tags: vec!["coaching".to_string()],
            ..list::ListOptions::default()
        })
        .await;
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].slug, "one-on-ones");
    }

    #[tokio::test]
    async fn check_fails_on_slug_collision() {
        let dir = fixture();
        let repo = ContentRepository::open(dir.path());
        assert!(check::run(&repo, false).await.is_ok());

        write(
            &dir,
            "leadership/Hiring.markdown",
            "---\ntitle: Hiring Again\ndate: 2024-04-01\n---\n\nDuplicate.\n",
        );
        let reports = check::audit_all(&repo).await;
        let leadership = reports
            .iter()
            .find(|report| report.content_type == ContentType::Leadership)
            .expect("leadership report");
        assert_eq!(leadership.collisions.len(), 1);
        assert!(check::run(&repo, false).await.is_err());
    }

    #[tokio::test]
    async fn feed_export_writes_file() {
        let dir = fixture();
        let repo = ContentRepository::open(dir.path());
        let site = SiteConfig::default().with_base_url("https://example.com");
        let out = dir.path().join("public/rss.xml");

        export::feed(&repo, &site, Some(&out)).await.expect("export feed");

        let xml = fs::read_to_string(out).expect("read feed");
        assert!(xml.contains("https://example.com/leadership/hiring"));
        assert!(xml.contains("Better One-on-Ones"));
    }
}
