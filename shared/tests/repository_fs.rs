//! Integration tests for the shared filesystem repository.

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use folio_shared::{
        build_rss, build_sitemap, filter, sort, ContentRepository, ContentType, FilterSpec,
        SiteConfig, SortDirection, SortField, SortSpec,
    };
    use tempfile::TempDir;

    fn write(dir: &TempDir, relative: &str, contents: &str) {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create content dir");
        }
        fs::write(path, contents).expect("write content file");
    }

    fn repo(dir: &TempDir) -> ContentRepository {
        ContentRepository::open(dir.path())
            .with_today(NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"))
    }

    fn technical_fixture() -> TempDir {
        let dir = tempfile::tempdir().expect("create temp dir");
        write(
            &dir,
            "technical/k8s-at-home.md",
            "---\ntitle: Kubernetes at Home\ndate: 2024-02-10\ntags: [kubernetes, \
             homelab]\ndifficulty: intermediate\n---\n\n## Cluster\n\n```yaml\nkind: Pod\n```\n",
        );
        write(
            &dir,
            "technical/async-rust.md",
            "---\ntitle: Async Rust\ndate: 2024-04-01\ntags: [rust]\ncode_languages: \
             [rust]\n---\n\nFutures all the way down.\n",
        );
        write(
            &dir,
            "technical/wip.md",
            "---\ntitle: Work in progress\ndate: 2024-05-01\ndraft: true\n---\n\nSoon.\n",
        );
        write(&dir, "technical/notes.txt", "not markdown");
        dir
    }

    #[tokio::test]
    async fn three_files_with_one_draft_list_two_items() {
        let dir = technical_fixture();
        let items = repo(&dir).list_all(ContentType::Technical).await;

        let slugs: Vec<_> = items.iter().map(|item| item.slug.as_str()).collect();
        assert_eq!(slugs, vec!["async-rust", "k8s-at-home"]);
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let dir = technical_fixture();
        let repo = repo(&dir);

        assert!(repo.get_by_slug(ContentType::Technical, "no-such-post").await.is_none());
        assert!(repo.get_by_slug(ContentType::Technical, "../technical/wip").await.is_none());
    }

    #[tokio::test]
    async fn single_item_has_rendered_and_highlighted_body() {
        let dir = technical_fixture();
        let item = repo(&dir)
            .get_by_slug(ContentType::Technical, "k8s-at-home")
            .await
            .expect("item exists");

        let html = item.content.expect("rendered content");
        assert!(html.contains(r#"<h2 id="cluster">"#));
        assert!(html.contains(r#"class="language-yaml hl""#));
        assert!(item.modified.is_some());
    }

    #[tokio::test]
    async fn missing_content_root_yields_nothing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = ContentRepository::open(dir.path().join("missing"));

        assert!(repo.list_all(ContentType::Leadership).await.is_empty());
        assert!(repo.get_by_slug(ContentType::Leadership, "anything").await.is_none());
        assert!(repo.list_everything().await.is_empty());
    }

    #[tokio::test]
    async fn listing_filters_and_sorts_end_to_end() {
        let dir = technical_fixture();
        let items = repo(&dir).list_all(ContentType::Technical).await;

        let spec = FilterSpec {
            search: Some("KUBERNETES".to_string()),
            ..FilterSpec::default()
        };
        let found = filter(&items, &spec);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].slug, "k8s-at-home");

        let by_title = sort(&items, &SortSpec {
            field: SortField::Title,
            direction: SortDirection::Asc,
        });
        assert_eq!(by_title[0].title, "Async Rust");
    }

    #[tokio::test]
    async fn feed_and_sitemap_cover_published_items() {
        let dir = technical_fixture();
        write(&dir, "projects/folio.md", "---\ntitle: Folio\ndate: 2024-03-01\n---\nSite.\n");
        let items = repo(&dir).list_everything().await;
        let site = SiteConfig::default().with_base_url("https://example.dev");

        let rss = build_rss(&site, &items);
        assert_eq!(rss.matches("<item>").count(), 3);
        assert!(!rss.contains("Work in progress"));

        let sitemap = build_sitemap(&site, &items);
        assert!(sitemap.contains("<loc>https://example.dev/projects/folio</loc>"));
        assert!(!sitemap.contains("/technical/wip"));
    }
}
