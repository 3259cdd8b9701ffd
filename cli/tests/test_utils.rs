//! Integration tests for CLI utilities.

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use folio_cli::utils;
    use folio_shared::{AuditReport, ContentType, SlugCollision, TagCount};

    #[test]
    fn parse_tags_splits_repeated_and_comma_separated_values() {
        let tags = utils::parse_tags(&["rust, wasm", " ", "homelab"]);
        assert_eq!(tags, vec!["rust", "wasm", "homelab"]);
    }

    #[test]
    fn relative_filename_strips_root() {
        let root = Path::new("/srv/content");
        assert_eq!(
            utils::relative_filename(root, Path::new("/srv/content/technical/a.md")),
            "technical/a.md"
        );
        assert_eq!(utils::relative_filename(root, Path::new("/elsewhere/b.md")), "elsewhere/b.md");
    }

    #[test]
    fn write_output_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let out = dir.path().join("public/feeds/rss.xml");

        utils::write_output(Some(&out), "<rss/>").expect("write output");

        assert_eq!(std::fs::read_to_string(out).expect("read output"), "<rss/>");
    }

    #[test]
    fn tag_table_aligns_counts() {
        let tags = vec![
            TagCount {
                name: "homelab".to_string(),
                count: 1,
            },
            TagCount {
                name: "rust".to_string(),
                count: 3,
            },
        ];
        assert_eq!(utils::format_tag_table(&tags), "homelab  1\nrust     3\n");
        assert_eq!(utils::format_tag_table(&[]), "(no tags)\n");
    }

    #[test]
    fn audit_summary_reports_collisions_as_errors() {
        let root = PathBuf::from("/srv/content");
        let report = AuditReport {
            content_type: ContentType::Technical,
            directory: root.join("technical"),
            missing_directory: false,
            published: 2,
            drafts: vec![root.join("technical/wip.md")],
            unreadable: Vec::new(),
            malformed_headers: Vec::new(),
            collisions: vec![SlugCollision {
                slug: "hello".to_string(),
                kept: root.join("technical/Hello.md"),
                shadowed: vec![root.join("technical/hello.markdown")],
            }],
        };

        let summary = utils::format_audit(&report, &root);
        assert!(summary.starts_with("technical: 2 published, 1 draft(s)\n"));
        assert!(summary.contains(
            "error: slug 'hello' used by technical/Hello.md and technical/hello.markdown"
        ));
        assert!(!report.is_clean());
    }

    #[test]
    fn empty_item_table_has_placeholder() {
        assert_eq!(utils::format_item_table(&[]), "(no items)\n");
    }
}
