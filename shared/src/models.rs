//! Content types and the items read from them.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// One of the site's content verticals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Leadership essays.
    Leadership,
    /// Technical writing.
    Technical,
    /// Artumin fantasy fiction.
    Artumin,
    /// TTRPG material.
    Dnd,
    /// Project write-ups.
    Projects,
}

impl ContentType {
    /// Every content type, in hub display order.
    pub const ALL: [ContentType; 5] = [
        ContentType::Leadership,
        ContentType::Technical,
        ContentType::Artumin,
        ContentType::Dnd,
        ContentType::Projects,
    ];

    /// Lowercase identifier, also the directory name under the content root.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Leadership => "leadership",
            ContentType::Technical => "technical",
            ContentType::Artumin => "artumin",
            ContentType::Dnd => "dnd",
            ContentType::Projects => "projects",
        }
    }

    /// Human readable label used in feeds.
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Leadership => "Leadership",
            ContentType::Technical => "Technical",
            ContentType::Artumin => "Artumin",
            ContentType::Dnd => "D&D",
            ContentType::Projects => "Projects",
        }
    }

    /// Public path prefix of the type's hub page.
    pub fn url_prefix(self) -> String {
        format!("/{}", self.as_str())
    }

    /// Maximum excerpt length (in characters) before the ellipsis.
    pub fn excerpt_budget(self) -> usize {
        match self {
            ContentType::Leadership => 160,
            ContentType::Technical => 200,
            ContentType::Artumin | ContentType::Dnd => 150,
            ContentType::Projects => 180,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ContentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "leadership" => Ok(ContentType::Leadership),
            "technical" => Ok(ContentType::Technical),
            "artumin" | "fiction" => Ok(ContentType::Artumin),
            "dnd" | "ttrpg" => Ok(ContentType::Dnd),
            "projects" | "project" => Ok(ContentType::Projects),
            _ => Err(ContentError::UnknownContentType(value.to_string())),
        }
    }
}

/// A published piece of content, recomputed from its markdown file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Type of the directory the file was read from. Always equal to
    /// `variant.content_type()`; [`normalize`](crate::normalize::normalize)
    /// derives both from the same context.
    pub content_type: ContentType,
    /// URL-safe identifier derived from the file name.
    pub slug: String,
    /// Frontmatter `title`, or the file stem.
    pub title: String,
    /// `YYYY-MM-DD` when the source date could be parsed, verbatim otherwise.
    pub date: String,
    /// Frontmatter excerpt or one derived from the body.
    pub excerpt: String,
    /// Tags in source order, without duplicates.
    pub tags: Vec<String>,
    /// Minutes.
    pub reading_time: u32,
    /// Hero image path or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    /// Highlighted on hub pages.
    #[serde(default)]
    pub featured: bool,
    /// Drafts never leave the repository.
    #[serde(default)]
    pub draft: bool,
    /// Author name for feeds and structured data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Frontmatter `updated` date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// Modification date of the source file; sitemap input only.
    #[serde(skip)]
    pub modified: Option<NaiveDate>,
    /// Rendered HTML, only present on single item fetches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Type specific fields.
    pub variant: ContentVariant,
}

impl ContentItem {
    /// Drop the rendered body, leaving the list view shape.
    pub fn into_summary(mut self) -> Self {
        self.content = None;
        self
    }

    /// Public path of the item page, e.g. `/technical/async-rust`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.content_type.url_prefix(), urlencoding::encode(&self.slug))
    }

    /// Type specific strings that the free text search also looks at.
    pub fn searchable_terms(&self) -> Vec<&str> {
        self.variant.searchable_terms()
    }
}

/// Extension fields, one shape per content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum ContentVariant {
    /// Leadership essay fields.
    Leadership(LeadershipFields),
    /// Technical article fields.
    Technical(TechnicalFields),
    /// Fiction fields.
    Artumin(FictionFields),
    /// TTRPG fields.
    Dnd(TtrpgFields),
    /// Project fields.
    Projects(ProjectFields),
}

impl ContentVariant {
    /// The content type this variant belongs to.
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentVariant::Leadership(_) => ContentType::Leadership,
            ContentVariant::Technical(_) => ContentType::Technical,
            ContentVariant::Artumin(_) => ContentType::Artumin,
            ContentVariant::Dnd(_) => ContentType::Dnd,
            ContentVariant::Projects(_) => ContentType::Projects,
        }
    }

    fn searchable_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = Vec::new();
        match self {
            ContentVariant::Leadership(fields) => {
                terms.extend(fields.category.as_deref());
            },
            ContentVariant::Technical(fields) => {
                terms.extend(fields.difficulty.as_deref());
                terms.extend(fields.kind.as_deref());
                terms.extend(fields.code_languages.iter().map(String::as_str));
            },
            ContentVariant::Artumin(fields) => {
                terms.extend(fields.categories.iter().map(String::as_str));
                terms.extend(fields.region.as_deref());
                terms.extend(fields.status.as_deref());
            },
            ContentVariant::Dnd(fields) => {
                terms.extend(fields.system.as_deref());
                terms.extend(fields.availability.as_deref());
            },
            ContentVariant::Projects(fields) => {
                terms.extend(fields.status.as_deref());
                terms.extend(fields.tech_stack.iter().map(String::as_str));
            },
        }
        terms
    }
}

/// Leadership essay extension fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadershipFields {
    /// Essay category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Technical article extension fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalFields {
    /// Reader level (beginner, intermediate, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// Frontmatter `type` (tutorial, deep-dive, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Languages of the code shown in the article.
    #[serde(default)]
    pub code_languages: Vec<String>,
}

/// Fiction (artumin) extension fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FictionFields {
    /// Story categories.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Region of the world the story is set in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Writing status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Slugs of related stories.
    #[serde(default)]
    pub connections: Vec<String>,
}

/// TTRPG (dnd) extension fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TtrpgFields {
    /// Rule system, e.g. `5e`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Where the material can be obtained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    /// Whether the material has been run at a table.
    #[serde(default)]
    pub playtested: bool,
}

/// Project extension fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFields {
    /// Project status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Technologies used.
    #[serde(default)]
    pub tech_stack: Vec<String>,
    /// Source repository URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Deployed URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
}

/// Tag index entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    /// Tag as written in frontmatter.
    pub name: String,
    /// Published items carrying the tag.
    pub count: usize,
}
