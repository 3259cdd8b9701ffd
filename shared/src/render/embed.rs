//! `{% embed <url> %}` directive expansion.
//!
//! Only a fixed set of providers is turned into an iframe. Any other URL is
//! rendered as a plain link; text that is not a URL at all is left as the
//! literal directive.

use once_cell::sync::Lazy;
use pulldown_cmark::{CowStr, Event};
use regex::{Captures, Regex};
use url::Url;

use super::{html_attr_escape, html_escape};

pub(crate) static EMBED_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{%\s*embed\s+(\S+?)\s*%\}").expect("embed directive pattern is valid")
});

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x{FFFC}(\d+)\x{FFFC}").expect("placeholder pattern is valid"));

/// Providers whose URLs are turned into iframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedProvider {
    /// `youtube.com` and `youtu.be`.
    YouTube,
    /// `vimeo.com`.
    Vimeo,
    /// `codepen.io` pens.
    CodePen,
    /// `codesandbox.io` sandboxes.
    CodeSandbox,
    /// `open.spotify.com` tracks, albums, playlists and shows.
    Spotify,
}

impl EmbedProvider {
    fn class_name(self) -> &'static str {
        match self {
            EmbedProvider::YouTube => "youtube",
            EmbedProvider::Vimeo => "vimeo",
            EmbedProvider::CodePen => "codepen",
            EmbedProvider::CodeSandbox => "codesandbox",
            EmbedProvider::Spotify => "spotify",
        }
    }

    fn frame_height(self) -> u32 {
        match self {
            EmbedProvider::YouTube | EmbedProvider::Vimeo => 315,
            EmbedProvider::CodePen | EmbedProvider::CodeSandbox => 500,
            EmbedProvider::Spotify => 152,
        }
    }
}

/// A URL resolved against the provider whitelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    /// Matched provider.
    pub provider: EmbedProvider,
    /// iframe `src`.
    pub src: String,
    /// Original URL, used for the fallback link.
    pub url: String,
}

/// Resolve `raw` to an embeddable iframe source, if its provider is known.
pub fn resolve_embed(raw: &str) -> Option<Embed> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.trim_start_matches("www.").to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default();

    let (provider, src) = match (host.as_str(), segments.as_slice()) {
        ("youtube.com" | "m.youtube.com", ["watch"]) => {
            let id = url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())?;
            (EmbedProvider::YouTube, youtube_src(&id)?)
        },
        ("youtube.com" | "m.youtube.com", ["embed" | "shorts", id]) | ("youtu.be", [id]) => {
            (EmbedProvider::YouTube, youtube_src(id)?)
        },
        ("vimeo.com", [id]) if id.chars().all(|ch| ch.is_ascii_digit()) => {
            (EmbedProvider::Vimeo, format!("https://player.vimeo.com/video/{id}"))
        },
        ("codepen.io", [user, "pen", id]) if is_token(user) && is_token(id) => (
            EmbedProvider::CodePen,
            format!("https://codepen.io/{user}/embed/{id}?default-tab=result"),
        ),
        ("codesandbox.io", ["s", id]) | ("codesandbox.io", ["p", "sandbox", id])
            if is_token(id) =>
        {
            (EmbedProvider::CodeSandbox, format!("https://codesandbox.io/embed/{id}"))
        },
        (
            "open.spotify.com",
            [kind @ ("track" | "album" | "playlist" | "episode" | "show"), id],
        ) if is_token(id) => {
            (EmbedProvider::Spotify, format!("https://open.spotify.com/embed/{kind}/{id}"))
        },
        _ => return None,
    };

    Some(Embed {
        provider,
        src,
        url: raw.to_string(),
    })
}

fn youtube_src(id: &str) -> Option<String> {
    is_token(id).then(|| format!("https://www.youtube-nocookie.com/embed/{id}"))
}

fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
}

/// HTML for one directive argument: iframe with fallback link, a plain link,
/// or the escaped literal directive.
pub fn render_embed(raw_url: &str) -> String {
    if let Some(embed) = resolve_embed(raw_url) {
        let url = html_attr_escape(&embed.url);
        return format!(
            r#"<div class="embed embed-{class}"><iframe src="{src}" width="100%" height="{height}" loading="lazy" frameborder="0" allowfullscreen></iframe><a class="embed-fallback" href="{url}" rel="noopener noreferrer">{text}</a></div>"#,
            class = embed.provider.class_name(),
            src = html_attr_escape(&embed.src),
            height = embed.provider.frame_height(),
            url = url,
            text = html_escape(&embed.url),
        );
    }

    match Url::parse(raw_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => format!(
            r#"<a href="{href}" rel="noopener noreferrer">{text}</a>"#,
            href = html_attr_escape(raw_url),
            text = html_escape(raw_url),
        ),
        _ => {
            tracing::debug!("embed directive argument is not a URL: {raw_url}");
            html_escape(&format!("{{% embed {raw_url} %}}"))
        },
    }
}

/// The directive URL when `text` consists of a single directive and nothing
/// else.
pub(crate) fn standalone_directive(text: &str) -> Option<&str> {
    let captures = EMBED_DIRECTIVE.captures(text.trim())?;
    let whole = captures.get(0)?;
    if whole.as_str().len() != text.trim().len() {
        return None;
    }
    captures.get(1).map(|url| url.as_str())
}

/// Replace every directive inside running text, escaping the rest.
pub(crate) fn expand_inline(text: &str) -> Option<String> {
    if !EMBED_DIRECTIVE.is_match(text) {
        return None;
    }
    let mut output = String::with_capacity(text.len() * 2);
    let mut last = 0;
    for captures in EMBED_DIRECTIVE.captures_iter(text) {
        let (Some(whole), Some(url)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        output.push_str(&html_escape(&text[last..whole.start()]));
        output.push_str(&render_embed(url.as_str()));
        last = whole.end();
    }
    output.push_str(&html_escape(&text[last..]));
    Some(output)
}

/// Directives lifted out of a body before it is parsed, so markdown
/// rules such as smart punctuation never touch their URLs.
#[derive(Debug, Default)]
pub(crate) struct Directives {
    originals: Vec<String>,
}

impl Directives {
    /// `body` with every directive replaced by an opaque placeholder.
    pub(crate) fn extract(body: &str) -> (String, Self) {
        let mut directives = Self::default();
        let prepared = EMBED_DIRECTIVE
            .replace_all(body, |captures: &Captures<'_>| {
                directives.originals.push(captures[0].to_string());
                format!("\u{FFFC}{}\u{FFFC}", directives.originals.len() - 1)
            })
            .into_owned();
        (prepared, directives)
    }

    fn restore(&self, text: &str) -> Option<String> {
        if self.originals.is_empty() || !PLACEHOLDER.is_match(text) {
            return None;
        }
        let restored = PLACEHOLDER.replace_all(text, |captures: &Captures<'_>| {
            captures[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.originals.get(index))
                .cloned()
                .unwrap_or_else(|| captures[0].to_string())
        });
        Some(restored.into_owned())
    }

    fn restore_str<'a>(&self, text: CowStr<'a>) -> CowStr<'a> {
        match self.restore(&text) {
            Some(restored) => restored.into(),
            None => text,
        }
    }

    /// Put the original directive text back into any text carrying event.
    pub(crate) fn restore_event<'a>(&self, event: Event<'a>) -> Event<'a> {
        match event {
            Event::Text(text) => Event::Text(self.restore_str(text)),
            Event::Code(text) => Event::Code(self.restore_str(text)),
            Event::Html(text) => Event::Html(self.restore_str(text)),
            Event::InlineHtml(text) => Event::InlineHtml(self.restore_str(text)),
            other => other,
        }
    }
}
