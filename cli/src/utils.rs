//! Argument helpers and plain text formatting.

use std::path::Path;

use anyhow::{Context, Result};
use folio_shared::{AuditReport, ContentItem, TagCount};

/// Flatten repeated and comma separated `--tag` values.
pub fn parse_tags<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.as_ref().split(','))
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(|tag| tag.to_string())
        .collect()
}

/// Path shown to the user, relative to `root` when possible.
pub fn relative_filename(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .to_string_lossy()
        .replace('\\', "/")
        .trim_start_matches('/')
        .to_string()
}

/// Write to `out`, or stdout when `None`.
pub fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        },
        None => print!("{contents}"),
    }
    Ok(())
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let truncated: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// Fixed-width listing: date, reading time, slug, title, tags.
pub fn format_item_table(items: &[ContentItem]) -> String {
    if items.is_empty() {
        return "(no items)\n".to_string();
    }
    let slug_width = items
        .iter()
        .map(|item| item.slug.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(4, 40);

    let mut out = format!("{:<10}  {:>4}  {:<slug_width$}  TITLE\n", "DATE", "MIN", "SLUG");
    for item in items {
        let mut line = format!(
            "{:<10}  {:>4}  {:<slug_width$}  {}",
            truncate(&item.date, 10),
            item.reading_time,
            truncate(&item.slug, slug_width),
            item.title,
        );
        if item.featured {
            line.push_str(" *");
        }
        if !item.tags.is_empty() {
            line.push_str(&format!("  [{}]", item.tags.join(", ")));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Tag names with their counts, one per line.
pub fn format_tag_table(tags: &[TagCount]) -> String {
    if tags.is_empty() {
        return "(no tags)\n".to_string();
    }
    let width = tags
        .iter()
        .map(|tag| tag.name.chars().count())
        .max()
        .unwrap_or(0);
    tags.iter()
        .map(|tag| format!("{:<width$}  {}\n", tag.name, tag.count))
        .collect()
}

/// Metadata block printed by `show`.
pub fn format_item_details(item: &ContentItem) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", item.title));
    out.push_str(&format!("  path:         {}\n", item.path()));
    out.push_str(&format!("  date:         {}\n", item.date));
    if let Some(updated) = &item.updated {
        out.push_str(&format!("  updated:      {updated}\n"));
    }
    if let Some(author) = &item.author {
        out.push_str(&format!("  author:       {author}\n"));
    }
    out.push_str(&format!("  reading time: {} min\n", item.reading_time));
    if !item.tags.is_empty() {
        out.push_str(&format!("  tags:         {}\n", item.tags.join(", ")));
    }
    if item.featured {
        out.push_str("  featured:     yes\n");
    }
    let terms = item.searchable_terms();
    if !terms.is_empty() {
        out.push_str(&format!("  details:      {}\n", terms.join(", ")));
    }
    out.push_str(&format!("\n{}\n", item.excerpt));
    out
}

/// Human readable audit summary. Problems are prefixed with `error:`,
/// notes with `note:`.
pub fn format_audit(report: &AuditReport, root: &Path) -> String {
    let mut out = format!("{}: ", report.content_type);
    if report.missing_directory {
        out.push_str("no directory\n");
        return out;
    }
    out.push_str(&format!(
        "{} published, {} draft(s)\n",
        report.published,
        report.drafts.len()
    ));
    for collision in &report.collisions {
        let shadowed: Vec<String> = collision
            .shadowed
            .iter()
            .map(|path| relative_filename(root, path))
            .collect();
        out.push_str(&format!(
            "  error: slug '{}' used by {} and {}\n",
            collision.slug,
            relative_filename(root, &collision.kept),
            shadowed.join(", ")
        ));
    }
    for path in &report.unreadable {
        out.push_str(&format!("  error: cannot read {}\n", relative_filename(root, path)));
    }
    for path in &report.malformed_headers {
        out.push_str(&format!(
            "  note: frontmatter is not a mapping, defaults used for {}\n",
            relative_filename(root, path)
        ));
    }
    out
}
