//! Server side syntax highlighting of fenced code.

use once_cell::sync::Lazy;
use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use super::html_escape;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Render a fenced code block. Highlighting is best effort: an unknown tag
/// falls back to first-line detection, and anything that still fails is
/// emitted as escaped plain code.
pub fn highlight_code_block(code: &str, language: Option<&str>, highlight: bool) -> String {
    let language = language.map(str::trim).filter(|lang| !lang.is_empty());
    if highlight {
        if let Some(syntax) = find_syntax(code, language) {
            match highlight_with(code, syntax) {
                Ok(highlighted) => return wrap_code(&highlighted, language, true),
                Err(err) => {
                    tracing::warn!(
                        "syntax highlighting failed (language={:?}), using plain code: {err}",
                        language
                    );
                },
            }
        }
    }
    wrap_code(&html_escape(code), language, false)
}

fn find_syntax(code: &str, language: Option<&str>) -> Option<&'static SyntaxReference> {
    let syntax_set: &'static SyntaxSet = &SYNTAX_SET;
    let by_token = language.and_then(|token| syntax_set.find_syntax_by_token(token));
    by_token
        .or_else(|| syntax_set.find_syntax_by_first_line(code))
        .filter(|syntax| syntax.name != "Plain Text")
}

fn highlight_with(code: &str, syntax: &SyntaxReference) -> Result<String, syntect::Error> {
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

fn wrap_code(inner: &str, language: Option<&str>, highlighted: bool) -> String {
    let mut classes = Vec::new();
    if let Some(language) = language {
        classes.push(format!("language-{}", super::html_attr_escape(language)));
    }
    if highlighted {
        classes.push("hl".to_string());
    }
    if classes.is_empty() {
        format!("<pre><code>{inner}</code></pre>\n")
    } else {
        format!("<pre><code class=\"{}\">{inner}</code></pre>\n", classes.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_is_highlighted() {
        let html = highlight_code_block("fn main() {}\n", Some("rust"), true);
        assert!(html.starts_with(r#"<pre><code class="language-rust hl">"#));
        assert!(html.contains("hl-"));
    }

    #[test]
    fn unsupported_language_falls_back_without_failing() {
        let html = highlight_code_block("x := <y>\n", Some("no-such-language"), true);
        assert!(html.starts_with(r#"<pre><code class="language-no-such-language">"#));
        assert!(html.contains("x := &lt;y&gt;"));
    }

    #[test]
    fn missing_language_uses_first_line_detection() {
        let html = highlight_code_block("#!/bin/bash\necho hi\n", None, true);
        assert!(html.contains("hl-"));
    }

    #[test]
    fn disabled_highlighting_escapes_code() {
        let html = highlight_code_block("<b>\n", Some("rust"), false);
        assert_eq!(html, "<pre><code class=\"language-rust\">&lt;b&gt;\n</code></pre>\n");
    }
}
