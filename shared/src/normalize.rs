//! Turns parsed frontmatter into a fully populated [`ContentItem`].
//!
//! Precedence for every field: explicit frontmatter value, then a value
//! computed from the body or filename, then a static fallback. All functions
//! here are pure; the current date is passed in through [`NormalizeContext`].

use std::{cmp::Ordering, path::Path};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::Regex;

use crate::{
    frontmatter::Frontmatter,
    models::{
        ContentItem, ContentType, ContentVariant, FictionFields, LeadershipFields, ProjectFields,
        TechnicalFields, TtrpgFields,
    },
};

const WORDS_PER_MINUTE: usize = 200;
const ELLIPSIS: &str = "...";
const UNTITLED_SLUG: &str = "untitled";

static DIRECTIVE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{%[^%]*%\}").expect("directive pattern is valid"));
static DIRECTIVE_ARGUMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{%\s*\w+\s*([^%]*?)\s*%\}").expect("directive argument pattern is valid")
});

/// Inputs that are not part of the file itself.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext {
    /// Type of the directory being read.
    pub content_type: ContentType,
    /// Used when the frontmatter has no date.
    pub today: NaiveDate,
}

/// Build a [`ContentItem`] (without rendered content) from a file name and
/// its parsed frontmatter.
pub fn normalize(file_name: &str, frontmatter: &Frontmatter, ctx: &NormalizeContext) -> ContentItem {
    let stem = file_stem(file_name);
    let body = frontmatter.body.as_str();

    let title = frontmatter
        .get_string("title")
        .unwrap_or_else(|| stem.to_string());
    let date = frontmatter
        .get_string("date")
        .map(|raw| normalize_date(&raw))
        .unwrap_or_else(|| ctx.today.format("%Y-%m-%d").to_string());
    let excerpt = frontmatter
        .first_string(&["excerpt", "summary", "description"])
        .unwrap_or_else(|| derive_excerpt(body, ctx.content_type.excerpt_budget()));
    let tags = frontmatter
        .get_list("tags")
        .map(dedup_keep_order)
        .unwrap_or_default();
    let reading_time = frontmatter
        .first_u32(&["reading_time", "read_time", "readingTime"])
        .unwrap_or_else(|| estimate_reading_time(body));

    ContentItem {
        content_type: ctx.content_type,
        slug: slugify(stem),
        title,
        date,
        excerpt,
        tags,
        reading_time,
        featured_image: frontmatter.first_string(&["featured_image", "featuredImage", "image", "cover"]),
        featured: frontmatter.get_bool("featured").unwrap_or(false),
        draft: frontmatter.get_bool("draft").unwrap_or(false),
        author: frontmatter.get_string("author"),
        updated: frontmatter
            .first_string(&["updated", "lastmod"])
            .map(|raw| normalize_date(&raw)),
        modified: None,
        content: None,
        variant: build_variant(ctx.content_type, frontmatter),
    }
}

fn build_variant(content_type: ContentType, fm: &Frontmatter) -> ContentVariant {
    match content_type {
        ContentType::Leadership => ContentVariant::Leadership(LeadershipFields {
            category: fm.get_string("category"),
        }),
        ContentType::Technical => ContentVariant::Technical(TechnicalFields {
            difficulty: fm.get_string("difficulty"),
            kind: fm.get_string("type"),
            code_languages: fm
                .first_list(&["code_languages", "codeLanguages", "languages"])
                .unwrap_or_default(),
        }),
        ContentType::Artumin => ContentVariant::Artumin(FictionFields {
            categories: fm.first_list(&["categories", "category"]).unwrap_or_default(),
            region: fm.get_string("region"),
            status: fm.get_string("status"),
            connections: fm.get_list("connections").unwrap_or_default(),
        }),
        ContentType::Dnd => ContentVariant::Dnd(TtrpgFields {
            system: fm.get_string("system"),
            availability: fm.get_string("availability"),
            playtested: fm.get_bool("playtested").unwrap_or(false),
        }),
        ContentType::Projects => ContentVariant::Projects(ProjectFields {
            status: fm.get_string("status"),
            tech_stack: fm
                .first_list(&["tech_stack", "techStack", "technologies"])
                .unwrap_or_default(),
            repository: fm.first_string(&["repository", "github"]),
            live_url: fm.first_string(&["live_url", "liveUrl", "demo"]),
        }),
    }
}

/// URL-safe identifier for a file stem: lowercase ASCII alphanumerics
/// separated by single hyphens.
pub fn slugify(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut last_dash = true;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            result.push('-');
            last_dash = true;
        }
    }

    let trimmed = result.trim_end_matches('-');
    if trimmed.is_empty() {
        UNTITLED_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Slug of a file name or path, ignoring directories and the extension.
pub fn slug_from_file_name(file_name: &str) -> String {
    slugify(file_stem(file_name))
}

fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
}

/// `ceil(words / 200)` minutes.
pub fn estimate_reading_time(body: &str) -> u32 {
    let words = body.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Plain text excerpt of at most `max_chars` characters plus an ellipsis.
pub fn derive_excerpt(body: &str, max_chars: usize) -> String {
    let mut text = strip_markdown(body);
    if text.is_empty() {
        // Bodies made only of code or HTML still deserve an excerpt.
        text = collapse_whitespace(&DIRECTIVE_PATTERN.replace_all(body, " "));
    }
    if text.is_empty() {
        // Only directives left: use their arguments, e.g. the embedded URL.
        text = collapse_whitespace(&DIRECTIVE_ARGUMENT.replace_all(body, " $1 "));
    }
    if text.is_empty() {
        text = collapse_whitespace(body);
    }
    truncate_chars(&text, max_chars)
}

/// Truncate on a character boundary, appending `...` when anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}{}", truncated.trim_end(), ELLIPSIS)
}

/// Strip markdown formatting, returning whitespace-collapsed plain text.
/// Code blocks, raw HTML and embed directives are dropped.
pub fn strip_markdown(markdown: &str) -> String {
    let without_directives = DIRECTIVE_PATTERN.replace_all(markdown, " ");
    let parser = Parser::new(&without_directives);
    let mut buf = String::with_capacity(markdown.len());
    let mut in_code_block = false;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) | Event::Code(text) if !in_code_block => buf.push_str(&text),
            Event::SoftBreak | Event::HardBreak => buf.push(' '),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => buf.push(' '),
            _ => {},
        }
    }
    collapse_whitespace(&buf)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn dedup_keep_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Parse the date formats accepted in frontmatter.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return Some(date_time.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(date_time.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y/%m/%d").ok()
}

/// `YYYY-MM-DD` when parseable, the trimmed input otherwise.
pub fn normalize_date(raw: &str) -> String {
    parse_date(raw)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

/// Newest first; unparseable dates sort last; ties broken by slug.
pub fn compare_newest_first(a: &ContentItem, b: &ContentItem) -> Ordering {
    parse_date(&b.date)
        .cmp(&parse_date(&a.date))
        .then_with(|| a.slug.cmp(&b.slug))
}
