//! Filtering, sorting and paging of already materialized items.
//!
//! One engine serves every content type: a [`FilterSpec`] is a set of
//! optional predicates and an item must satisfy all active ones. Nothing
//! here mutates its input or fails.

use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    models::{ContentItem, ContentVariant},
    normalize::parse_date,
};

/// Page size when the caller gives none.
pub const DEFAULT_PER_PAGE: usize = 20;
/// Largest accepted page size.
pub const MAX_PER_PAGE: usize = 100;

/// Inclusive date bounds; `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest accepted date.
    pub start: Option<NaiveDate>,
    /// Latest accepted date.
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Bounds from user input; empty or unparseable text is an open side.
    pub fn from_strs(start: &str, end: &str) -> Self {
        Self {
            start: parse_date(start),
            end: parse_date(end),
        }
    }

    fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    fn contains(&self, date: Option<NaiveDate>) -> bool {
        if self.is_open() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Inclusive reading time bounds in minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingTimeRange {
    /// Shortest accepted reading time.
    pub min: Option<u32>,
    /// Longest accepted reading time.
    pub max: Option<u32>,
}

impl ReadingTimeRange {
    fn contains(&self, minutes: u32) -> bool {
        self.min.is_none_or(|min| minutes >= min) && self.max.is_none_or(|max| minutes <= max)
    }
}

/// Declarative filter. The default value matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Case-insensitive substring over title, excerpt, tags and the
    /// variant's searchable fields. Blank means unconstrained.
    pub search: Option<String>,
    /// Every listed tag must be present.
    pub tags: Vec<String>,
    /// Publication date bounds. Undated items fail a bounded range.
    pub date_range: DateRange,
    /// Reading time bounds in minutes.
    pub reading_time: ReadingTimeRange,
    /// Keep only featured (`true`) or only non-featured (`false`) items.
    pub featured: Option<bool>,
    /// Leadership `category` or one of the fiction `categories`.
    pub category: Option<String>,
    /// Technical article difficulty.
    pub difficulty: Option<String>,
    /// Technical article `type`.
    pub kind: Option<String>,
    /// One of a technical article's code languages.
    pub language: Option<String>,
    /// Fiction region.
    pub region: Option<String>,
    /// Fiction or project status.
    pub status: Option<String>,
    /// TTRPG rule system.
    pub system: Option<String>,
    /// TTRPG availability (free, paid, ...).
    pub availability: Option<String>,
    /// Whether a TTRPG adventure has been playtested.
    pub playtested: Option<bool>,
}

impl FilterSpec {
    /// Whether `item` satisfies every active predicate.
    pub fn matches(&self, item: &ContentItem) -> bool {
        self.matches_search(item)
            && self.matches_tags(item)
            && self.date_range.contains(parse_date(&item.date))
            && self.reading_time.contains(item.reading_time)
            && self.featured.is_none_or(|featured| item.featured == featured)
            && self.matches_variant(&item.variant)
    }

    fn matches_search(&self, item: &ContentItem) -> bool {
        let Some(query) = active(&self.search) else {
            return true;
        };
        let needle = query.to_lowercase();
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

        contains(&item.title)
            || contains(&item.excerpt)
            || item.tags.iter().any(|tag| contains(tag))
            || item.searchable_terms().into_iter().any(contains)
    }

    fn matches_tags(&self, item: &ContentItem) -> bool {
        self.tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .all(|wanted| item.tags.iter().any(|tag| tag.eq_ignore_ascii_case(wanted)))
    }

    fn matches_variant(&self, variant: &ContentVariant) -> bool {
        let facets = Facets::of(variant);

        field_matches(&self.category, facets.categories.iter().copied())
            && field_matches(&self.difficulty, facets.difficulty)
            && field_matches(&self.kind, facets.kind)
            && field_matches(&self.language, facets.languages.iter().map(String::as_str))
            && field_matches(&self.region, facets.region)
            && field_matches(&self.status, facets.status)
            && field_matches(&self.system, facets.system)
            && field_matches(&self.availability, facets.availability)
            && self
                .playtested
                .is_none_or(|wanted| facets.playtested == Some(wanted))
    }
}

/// Filterable fields of a variant. Fields the variant does not have stay
/// empty, so an active predicate on them cannot match.
#[derive(Default)]
struct Facets<'a> {
    categories: Vec<&'a str>,
    difficulty: Option<&'a str>,
    kind: Option<&'a str>,
    languages: &'a [String],
    region: Option<&'a str>,
    status: Option<&'a str>,
    system: Option<&'a str>,
    availability: Option<&'a str>,
    playtested: Option<bool>,
}

impl<'a> Facets<'a> {
    fn of(variant: &'a ContentVariant) -> Self {
        match variant {
            ContentVariant::Leadership(fields) => Facets {
                categories: fields.category.as_deref().into_iter().collect(),
                ..Facets::default()
            },
            ContentVariant::Technical(fields) => Facets {
                difficulty: fields.difficulty.as_deref(),
                kind: fields.kind.as_deref(),
                languages: &fields.code_languages,
                ..Facets::default()
            },
            ContentVariant::Artumin(fields) => Facets {
                categories: fields.categories.iter().map(String::as_str).collect(),
                region: fields.region.as_deref(),
                status: fields.status.as_deref(),
                ..Facets::default()
            },
            ContentVariant::Dnd(fields) => Facets {
                system: fields.system.as_deref(),
                availability: fields.availability.as_deref(),
                playtested: Some(fields.playtested),
                ..Facets::default()
            },
            ContentVariant::Projects(fields) => Facets {
                status: fields.status.as_deref(),
                ..Facets::default()
            },
        }
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn field_matches<'a>(wanted: &Option<String>, values: impl IntoIterator<Item = &'a str>) -> bool {
    let Some(wanted) = active(wanted) else {
        return true;
    };
    values
        .into_iter()
        .any(|value| value.trim().eq_ignore_ascii_case(wanted))
}

/// Items matching `spec`, in input order.
pub fn filter(items: &[ContentItem], spec: &FilterSpec) -> Vec<ContentItem> {
    items
        .iter()
        .filter(|item| spec.matches(item))
        .cloned()
        .collect()
}

/// Key to sort on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Publication date.
    #[default]
    Date,
    /// Title, case-insensitively.
    Title,
    /// Reading time in minutes.
    ReadingTime,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortField::Date),
            "title" => Ok(SortField::Title),
            "reading_time" | "reading-time" | "readingtime" => Ok(SortField::ReadingTime),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortField::Date => "date",
            SortField::Title => "title",
            SortField::ReadingTime => "reading_time",
        })
    }
}

/// Sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

/// Sort key and direction. Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Key to sort on.
    pub field: SortField,
    /// Sort order.
    pub direction: SortDirection,
}

fn compare_by(field: SortField, a: &ContentItem, b: &ContentItem) -> Ordering {
    match field {
        // Unparseable dates compare lowest.
        SortField::Date => parse_date(&a.date).cmp(&parse_date(&b.date)),
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::ReadingTime => a.reading_time.cmp(&b.reading_time),
    }
}

/// Stable sort: items with equal keys keep their input order in either
/// direction.
pub fn sort(items: &[ContentItem], spec: &SortSpec) -> Vec<ContentItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| match spec.direction {
        SortDirection::Asc => compare_by(spec.field, a, b),
        SortDirection::Desc => compare_by(spec.field, b, a),
    });
    sorted
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Item count before paging.
    pub total: usize,
    /// 1-based.
    pub page: usize,
    /// Page size after clamping.
    pub per_page: usize,
    /// Number of pages; zero when there are no items.
    pub total_pages: usize,
}

/// Slice `items` into a 1-based page. Page 0 is treated as page 1 and
/// `per_page` is clamped to `1..=MAX_PER_PAGE`; a page past the end is
/// empty.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.clamp(1, MAX_PER_PAGE);
    let page = page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    Page {
        items,
        total,
        page,
        per_page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ContentType, FictionFields, LeadershipFields, TechnicalFields, TtrpgFields,
    };

    fn item(slug: &str, date: &str, tags: &[&str]) -> ContentItem {
        ContentItem {
            content_type: ContentType::Leadership,
            slug: slug.to_string(),
            title: slug.to_string(),
            date: date.to_string(),
            excerpt: String::new(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            reading_time: 5,
            featured_image: None,
            featured: false,
            draft: false,
            author: None,
            updated: None,
            modified: None,
            content: None,
            variant: ContentVariant::Leadership(LeadershipFields::default()),
        }
    }

    fn slugs(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|item| item.slug.as_str()).collect()
    }

    #[test]
    fn default_spec_matches_everything() {
        let items = vec![item("a", "2024-01-01", &[]), item("b", "not a date", &["x"])];
        assert_eq!(filter(&items, &FilterSpec::default()), items);
    }

    #[test]
    fn tag_filter_is_intersection() {
        let items = vec![
            item("first", "2024-01-01", &["a"]),
            item("second", "2024-01-01", &["a", "b"]),
            item("third", "2024-01-01", &["b"]),
        ];
        let spec = FilterSpec {
            tags: vec!["a".to_string(), "b".to_string()],
            ..FilterSpec::default()
        };
        assert_eq!(slugs(&filter(&items, &spec)), vec!["second"]);
    }

    #[test]
    fn reading_time_bounds_are_inclusive() {
        let mut short = item("short", "2024-01-01", &[]);
        short.reading_time = 3;
        let mut long = item("long", "2024-01-01", &[]);
        long.reading_time = 10;
        let mut longer = item("longer", "2024-01-01", &[]);
        longer.reading_time = 11;

        let spec = FilterSpec {
            reading_time: ReadingTimeRange {
                min: Some(3),
                max: Some(10),
            },
            ..FilterSpec::default()
        };
        assert_eq!(slugs(&filter(&[short, long, longer], &spec)), vec!["short", "long"]);
    }

    #[test]
    fn date_range_is_inclusive_with_open_sides() {
        let items = vec![
            item("jan", "2024-01-01", &[]),
            item("feb", "2024-02-01", &[]),
            item("mar", "2024-03-01", &[]),
            item("undated", "someday", &[]),
        ];
        let spec = FilterSpec {
            date_range: DateRange::from_strs("2024-02-01", ""),
            ..FilterSpec::default()
        };
        assert_eq!(slugs(&filter(&items, &spec)), vec!["feb", "mar"]);

        let spec = FilterSpec {
            date_range: DateRange::from_strs("2024-01-01", "2024-02-01"),
            ..FilterSpec::default()
        };
        assert_eq!(slugs(&filter(&items, &spec)), vec!["jan", "feb"]);
    }

    #[test]
    fn search_scenario_matches_title_excerpt_or_tags() {
        let mut by_title = item("by-title", "2024-01-01", &[]);
        by_title.title = "Running Kubernetes at home".to_string();
        let mut by_excerpt = item("by-excerpt", "2024-01-01", &[]);
        by_excerpt.excerpt = "Notes on KUBERNETES operators".to_string();
        let by_tag = item("by-tag", "2024-01-01", &["kubernetes"]);
        let unrelated = item("unrelated", "2024-01-01", &["docker"]);

        let spec = FilterSpec {
            search: Some("kubernetes".to_string()),
            tags: Vec::new(),
            date_range: DateRange::from_strs("", ""),
            reading_time: ReadingTimeRange {
                min: Some(0),
                max: Some(60),
            },
            featured: None,
            ..FilterSpec::default()
        };
        let found = filter(&[by_title, by_excerpt, by_tag, unrelated], &spec);
        assert_eq!(slugs(&found), vec!["by-title", "by-excerpt", "by-tag"]);
    }

    #[test]
    fn search_covers_variant_fields() {
        let mut rust_post = item("rust-post", "2024-01-01", &[]);
        rust_post.variant = ContentVariant::Technical(TechnicalFields {
            difficulty: None,
            kind: None,
            code_languages: vec!["Rust".to_string()],
        });
        let spec = FilterSpec {
            search: Some("rust".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(filter(&[rust_post], &spec).len(), 1);
    }

    #[test]
    fn featured_filter_requires_exact_value() {
        let mut starred = item("starred", "2024-01-01", &[]);
        starred.featured = true;
        let plain = item("plain", "2024-01-01", &[]);
        let items = vec![starred, plain];

        let spec = FilterSpec {
            featured: Some(false),
            ..FilterSpec::default()
        };
        assert_eq!(slugs(&filter(&items, &spec)), vec!["plain"]);
    }

    #[test]
    fn type_predicates_do_not_match_other_variants() {
        let mut module = item("module", "2024-01-01", &[]);
        module.variant = ContentVariant::Dnd(TtrpgFields {
            system: Some("5e".to_string()),
            availability: Some("free".to_string()),
            playtested: true,
        });
        let mut story = item("story", "2024-01-01", &[]);
        story.variant = ContentVariant::Artumin(FictionFields {
            categories: vec!["Myth".to_string()],
            region: Some("North".to_string()),
            status: Some("complete".to_string()),
            connections: Vec::new(),
        });
        let essay = item("essay", "2024-01-01", &[]);
        let items = vec![module, story, essay];

        let by_system = FilterSpec {
            system: Some("5E".to_string()),
            playtested: Some(true),
            ..FilterSpec::default()
        };
        assert_eq!(slugs(&filter(&items, &by_system)), vec!["module"]);

        let by_category = FilterSpec {
            category: Some("myth".to_string()),
            region: Some("north".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(slugs(&filter(&items, &by_category)), vec!["story"]);
    }

    #[test]
    fn sort_is_stable_for_equal_dates() {
        let items = vec![
            item("older", "2023-01-01", &[]),
            item("first-same", "2024-01-01", &[]),
            item("second-same", "2024-01-01", &[]),
        ];
        let sorted = sort(&items, &SortSpec::default());
        assert_eq!(slugs(&sorted), vec!["first-same", "second-same", "older"]);

        let ascending = sort(&items, &SortSpec {
            field: SortField::Date,
            direction: SortDirection::Asc,
        });
        assert_eq!(slugs(&ascending), vec!["older", "first-same", "second-same"]);
    }

    #[test]
    fn sort_by_title_and_reading_time() {
        let mut b = item("Beta", "2024-01-01", &[]);
        b.reading_time = 1;
        let mut a = item("alpha", "2024-01-01", &[]);
        a.reading_time = 9;
        let items = vec![b, a];

        let by_title = sort(&items, &SortSpec {
            field: SortField::Title,
            direction: SortDirection::Asc,
        });
        assert_eq!(slugs(&by_title), vec!["alpha", "Beta"]);

        let by_time = sort(&items, &SortSpec {
            field: SortField::ReadingTime,
            direction: SortDirection::Desc,
        });
        assert_eq!(slugs(&by_time), vec!["alpha", "Beta"]);
    }

    #[test]
    fn sort_does_not_mutate_input() {
        let items = vec![item("a", "2023-01-01", &[]), item("b", "2024-01-01", &[])];
        let _ = sort(&items, &SortSpec::default());
        assert_eq!(slugs(&items), vec!["a", "b"]);
    }

    #[test]
    fn parses_sort_keywords() {
        assert_eq!("reading_time".parse::<SortField>(), Ok(SortField::ReadingTime));
        assert_eq!("ASC".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert!("size".parse::<SortField>().is_err());
    }

    #[test]
    fn paginate_clamps_inputs() {
        let page = paginate((1..=45).collect::<Vec<_>>(), 3, 20);
        assert_eq!(page.items, (41..=45).collect::<Vec<_>>());
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);

        let first = paginate(vec![1, 2, 3], 0, 0);
        assert_eq!(first.page, 1);
        assert_eq!(first.per_page, 1);
        assert_eq!(first.items, vec![1]);

        assert!(paginate(vec![1, 2, 3], 9, 10).items.is_empty());
    }
}
