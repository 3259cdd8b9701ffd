//! Content repository: one directory per [`ContentType`] under a root.
//!
//! Every call goes back to the source. Nothing read here is cached, so an
//! edited file shows up on the next request.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::{
    error::ContentError,
    frontmatter::{parse_frontmatter, HeaderState},
    models::{ContentItem, ContentType, TagCount},
    normalize::{compare_newest_first, normalize, slug_from_file_name, NormalizeContext},
    render::{render_markdown, RenderOptions},
    source::{ContentSource, FsSource},
};

/// Files that map to the same slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugCollision {
    /// Slug shared by every file of the group.
    pub slug: String,
    /// The file that is served: the first non-draft in file name order, or
    /// the first file when every one of them is a draft.
    pub kept: PathBuf,
    /// Files hidden behind `kept`.
    pub shadowed: Vec<PathBuf>,
}

/// Integrity report for one content directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Audited type.
    pub content_type: ContentType,
    /// Directory that was read.
    pub directory: PathBuf,
    /// The directory does not exist; not an error.
    pub missing_directory: bool,
    /// Published items that would be listed.
    pub published: usize,
    /// Files marked `draft: true`.
    pub drafts: Vec<PathBuf>,
    /// Files, or the directory itself, that could not be read.
    pub unreadable: Vec<PathBuf>,
    /// Files whose `---` header is not a YAML mapping.
    pub malformed_headers: Vec<PathBuf>,
    /// Files sharing a slug, drafts included.
    pub collisions: Vec<SlugCollision>,
}

impl AuditReport {
    /// No collisions and nothing unreadable. Drafts and malformed headers
    /// are only notes.
    pub fn is_clean(&self) -> bool {
        self.collisions.is_empty() && self.unreadable.is_empty()
    }
}

struct LoadedFile {
    path: PathBuf,
    header: HeaderState,
    item: ContentItem,
}

#[derive(Default)]
struct LoadedDir {
    missing: bool,
    files: Vec<LoadedFile>,
    unreadable: Vec<PathBuf>,
}

/// Reads content items of every type from `root/<type>/*.md`.
#[derive(Debug, Clone)]
pub struct ContentRepository<S = FsSource> {
    source: S,
    root: PathBuf,
    today: Option<NaiveDate>,
    render: RenderOptions,
}

impl ContentRepository<FsSource> {
    /// Repository over the local filesystem.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(FsSource, root)
    }
}

impl<S: ContentSource> ContentRepository<S> {
    /// Repository over any [`ContentSource`].
    pub fn new(source: S, root: impl Into<PathBuf>) -> Self {
        Self {
            source,
            root: root.into(),
            today: None,
            render: RenderOptions::default(),
        }
    }

    /// Pin the date used for items without a `date` field. Defaults to the
    /// local date at call time.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Renderer switches for single item fetches.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Content root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding files of `content_type`.
    pub fn type_dir(&self, content_type: ContentType) -> PathBuf {
        self.root.join(content_type.as_str())
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Published items of one type, newest first, without rendered content.
    ///
    /// Drafts and unreadable files are skipped; when several files share a
    /// slug the first one in file name order wins.
    pub async fn list_all(&self, content_type: ContentType) -> Vec<ContentItem> {
        let loaded = self.load_dir(content_type).await;
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(loaded.files.len());

        for file in loaded.files {
            if file.item.draft {
                continue;
            }
            if !seen.insert(file.item.slug.clone()) {
                tracing::warn!(
                    "Duplicate slug '{}' in {}, ignoring {}",
                    file.item.slug,
                    content_type,
                    file.path.display()
                );
                continue;
            }
            items.push(file.item.into_summary());
        }

        items.sort_by(compare_newest_first);
        items
    }

    /// One published item with its body rendered to HTML.
    pub async fn get_by_slug(&self, content_type: ContentType, slug: &str) -> Option<ContentItem> {
        let dir = self.type_dir(content_type);
        let paths = self.list_paths(content_type, &dir).await.ok()?;

        for path in paths {
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if slug_from_file_name(file_name) != slug {
                continue;
            }
            let text = match self.source.read_to_string(&path).await {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!("Skipping unreadable content file: {err}");
                    continue;
                },
            };
            let frontmatter = parse_frontmatter(&text);
            let mut item = normalize(file_name, &frontmatter, &self.context(content_type));
            if item.draft {
                continue;
            }
            item.modified = self.source.modified(&path).await;
            item.content = Some(render_markdown(&frontmatter.body, &self.render));
            return Some(item);
        }

        tracing::debug!("No {} item with slug '{}'", content_type, slug);
        None
    }

    /// Tag index of one type with per-tag counts, sorted by tag name.
    pub async fn tags(&self, content_type: ContentType) -> Vec<TagCount> {
        count_tags(&self.list_all(content_type).await)
    }

    /// Published items of every type, newest first.
    pub async fn list_everything(&self) -> Vec<ContentItem> {
        let mut items = Vec::new();
        for content_type in ContentType::ALL {
            items.extend(self.list_all(content_type).await);
        }
        items.sort_by(compare_newest_first);
        items
    }

    /// Integrity report for one type.
    ///
    /// Collisions are reported across drafts too, since publishing a draft
    /// would otherwise silently shadow or be shadowed by another file.
    pub async fn audit(&self, content_type: ContentType) -> AuditReport {
        let loaded = self.load_dir(content_type).await;
        let mut by_slug: BTreeMap<String, Vec<(PathBuf, bool)>> = BTreeMap::new();
        let mut drafts = Vec::new();
        let mut malformed_headers = Vec::new();
        let mut published = HashSet::new();

        for file in &loaded.files {
            by_slug
                .entry(file.item.slug.clone())
                .or_default()
                .push((file.path.clone(), file.item.draft));
            if file.header == HeaderState::Malformed {
                malformed_headers.push(file.path.clone());
            }
            if file.item.draft {
                drafts.push(file.path.clone());
            } else {
                published.insert(file.item.slug.clone());
            }
        }

        let collisions = by_slug
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(slug, mut files)| {
                let kept_at = files.iter().position(|(_, draft)| !draft).unwrap_or(0);
                let (kept, _) = files.remove(kept_at);
                SlugCollision {
                    slug,
                    kept,
                    shadowed: files.into_iter().map(|(path, _)| path).collect(),
                }
            })
            .collect();

        AuditReport {
            content_type,
            directory: self.type_dir(content_type),
            missing_directory: loaded.missing,
            published: published.len(),
            drafts,
            unreadable: loaded.unreadable,
            malformed_headers,
            collisions,
        }
    }

    fn context(&self, content_type: ContentType) -> NormalizeContext {
        NormalizeContext {
            content_type,
            today: self.today(),
        }
    }

    async fn list_paths(
        &self,
        content_type: ContentType,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, ContentError> {
        let listed = self.source.list_markdown(dir).await;
        match &listed {
            Ok(_) => {},
            Err(err @ ContentError::MissingDirectory(_)) => {
                tracing::debug!("No {} content: {err}", content_type);
            },
            Err(err) => {
                tracing::warn!("Failed to list {} content: {err}", content_type);
            },
        }
        listed
    }

    async fn load_dir(&self, content_type: ContentType) -> LoadedDir {
        let dir = self.type_dir(content_type);
        let paths = match self.list_paths(content_type, &dir).await {
            Ok(paths) => paths,
            Err(ContentError::MissingDirectory(_)) => {
                return LoadedDir {
                    missing: true,
                    ..LoadedDir::default()
                };
            },
            // An unlistable directory is reported like an unreadable file.
            Err(_) => {
                return LoadedDir {
                    unreadable: vec![dir],
                    ..LoadedDir::default()
                };
            },
        };

        let context = self.context(content_type);
        let mut loaded = LoadedDir::default();
        for path in paths {
            let text = match self.source.read_to_string(&path).await {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!("Skipping unreadable content file: {err}");
                    loaded.unreadable.push(path);
                    continue;
                },
            };
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let frontmatter = parse_frontmatter(&text);
            let mut item = normalize(&file_name, &frontmatter, &context);
            item.modified = self.source.modified(&path).await;
            loaded.files.push(LoadedFile {
                path,
                header: frontmatter.header,
                item,
            });
        }
        loaded
    }
}

/// Count tags over `items`, sorted by tag name.
pub fn count_tags(items: &[ContentItem]) -> Vec<TagCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in items.iter().flat_map(|item| item.tags.iter()) {
        *counts.entry(tag.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| TagCount {
            name: name.to_string(),
            count,
        })
        .collect()
}
