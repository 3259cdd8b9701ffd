//! Markdown to HTML.
//!
//! Authors are trusted: raw HTML in the body passes through untouched and
//! nothing is sanitized.

mod embed;
mod highlight;

use std::collections::HashSet;

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd, TextMergeStream};
use serde::Serialize;

use embed::Directives;
pub use embed::{render_embed, resolve_embed, Embed, EmbedProvider};
pub use highlight::highlight_code_block;

use crate::normalize::slugify;

/// Renderer switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Highlight fenced code blocks with syntect classes.
    pub highlight: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            highlight: true,
        }
    }
}

/// One entry of a page outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading level, 1 to 6.
    pub level: u8,
    /// Plain text of the heading.
    pub text: String,
    /// `id` attribute given to the rendered heading.
    pub anchor: String,
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options
}

/// Render a markdown body to HTML.
///
/// Never fails: code in an unknown language is emitted unhighlighted and an
/// embed directive that cannot be resolved degrades to a link or to its
/// literal text.
pub fn render_markdown(body: &str, options: &RenderOptions) -> String {
    let (prepared, directives) = Directives::extract(body);
    let mut events = TextMergeStream::new(Parser::new_ext(&prepared, markdown_options()))
        .map(|event| directives.restore_event(event));
    let mut output: Vec<Event<'_>> = Vec::new();
    let mut anchors = AnchorSet::default();

    while let Some(event) = events.next() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match &kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                let mut code = String::new();
                for inner in events.by_ref() {
                    match inner {
                        Event::Text(text) => code.push_str(&text),
                        Event::End(TagEnd::CodeBlock) => break,
                        _ => {},
                    }
                }
                let html = highlight_code_block(&code, language.as_deref(), options.highlight);
                output.push(Event::Html(html.into()));
            },
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let inner = collect_until(&mut events, |event| {
                    matches!(event, Event::End(TagEnd::Heading(_)))
                });
                let anchor = anchors.claim(
                    id.map(|id| id.to_string())
                        .unwrap_or_else(|| slugify(&plain_text(&inner))),
                );
                output.push(Event::Start(Tag::Heading {
                    level,
                    id: Some(anchor.into()),
                    classes,
                    attrs,
                }));
                output.extend(inner.into_iter().map(expand_directives));
                output.push(Event::End(TagEnd::Heading(level)));
            },
            Event::Start(Tag::Paragraph) => {
                let inner =
                    collect_until(&mut events, |event| matches!(event, Event::End(TagEnd::Paragraph)));
                if let Some(embed) = standalone_embed(&inner) {
                    output.push(Event::Html(embed.into()));
                    continue;
                }
                output.push(Event::Start(Tag::Paragraph));
                output.extend(inner.into_iter().map(expand_directives));
                output.push(Event::End(TagEnd::Paragraph));
            },
            other => output.push(expand_directives(other)),
        }
    }

    let mut rendered = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut rendered, output.into_iter());
    rendered
}

/// Heading outline of `body`, with the same anchors [`render_markdown`]
/// assigns.
pub fn extract_headings(body: &str) -> Vec<Heading> {
    let (prepared, directives) = Directives::extract(body);
    let mut events = TextMergeStream::new(Parser::new_ext(&prepared, markdown_options()))
        .map(|event| directives.restore_event(event));
    let mut anchors = AnchorSet::default();
    let mut headings = Vec::new();

    while let Some(event) = events.next() {
        if let Event::Start(Tag::Heading { level, id, .. }) = event {
            let inner =
                collect_until(&mut events, |event| matches!(event, Event::End(TagEnd::Heading(_))));
            let text = plain_text(&inner);
            let anchor = anchors.claim(
                id.map(|id| id.to_string())
                    .unwrap_or_else(|| slugify(&text)),
            );
            headings.push(Heading {
                level: level as u8,
                text,
                anchor,
            });
        }
    }
    headings
}

/// Consume events up to and including the first one matching `is_end`,
/// returning the ones before it.
fn collect_until<'a>(
    events: &mut impl Iterator<Item = Event<'a>>,
    is_end: impl Fn(&Event<'a>) -> bool,
) -> Vec<Event<'a>> {
    let mut inner = Vec::new();
    for event in events.by_ref() {
        if is_end(&event) {
            break;
        }
        inner.push(event);
    }
    inner
}

fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(value) | Event::Code(value) => text.push_str(value),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {},
        }
    }
    text.trim().to_string()
}

/// A paragraph made of nothing but one directive becomes a block embed.
fn standalone_embed(events: &[Event<'_>]) -> Option<String> {
    let [Event::Text(text)] = events else {
        return None;
    };
    let url = embed::standalone_directive(text)?;
    Some(format!("{}\n", render_embed(url)))
}

fn expand_directives(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Text(text) => match embed::expand_inline(&text) {
            Some(html) => Event::InlineHtml(html.into()),
            None => Event::Text(text),
        },
        other => other,
    }
}

#[derive(Default)]
struct AnchorSet {
    used: HashSet<String>,
}

impl AnchorSet {
    fn claim(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{base}-{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn html_attr_escape(s: &str) -> String {
    html_escape(s).replace('"', "&quot;")
}
