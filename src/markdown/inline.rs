//! Inline markup: links, `**bold**` and `*italic*`.
//!
//! Single pass, no nesting. URLs are cut out first so an asterisk inside a
//! link never starts emphasis.

use once_cell::sync::Lazy;
use regex::Regex;

/// Plain-text URLs.
pub(crate) static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("Invalid URL regex pattern"));

/// `**bold**` or `*italic*`; bold is tried first at each position.
pub(crate) static EMPHASIS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*[^*]+\*\*|\*[^*]+\*").expect("Invalid emphasis regex pattern")
});

/// A run of inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    Link(String),
}

impl Inline {
    /// The visible text without markers.
    pub fn text(&self) -> &str {
        match self {
            Inline::Text(s) | Inline::Bold(s) | Inline::Italic(s) | Inline::Link(s) => s,
        }
    }
}

/// Split a line into inline runs.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut last = 0;

    for url in URL_REGEX.find_iter(text) {
        parse_emphasis(&text[last..url.start()], &mut out);
        out.push(Inline::Link(url.as_str().to_string()));
        last = url.end();
    }
    parse_emphasis(&text[last..], &mut out);
    out
}

fn parse_emphasis(text: &str, out: &mut Vec<Inline>) {
    let mut last = 0;
    for m in EMPHASIS_REGEX.find_iter(text) {
        push_text(&text[last..m.start()], out);
        let marked = m.as_str();
        if marked.starts_with("**") && marked.ends_with("**") && marked.len() > 4 {
            out.push(Inline::Bold(marked[2..marked.len() - 2].to_string()));
        } else {
            out.push(Inline::Italic(marked[1..marked.len() - 1].to_string()));
        }
        last = m.end();
    }
    push_text(&text[last..], out);
}

/// Append plain text, merging with a preceding text run.
fn push_text(text: &str, out: &mut Vec<Inline>) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(prev)) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

/// Remove emphasis markers, keeping the emphasised text.
pub fn strip_emphasis(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for url in URL_REGEX.find_iter(text) {
        out.push_str(&EMPHASIS_REGEX.replace_all(&text[last..url.start()], unmark));
        out.push_str(url.as_str());
        last = url.end();
    }
    out.push_str(&EMPHASIS_REGEX.replace_all(&text[last..], unmark));
    out
}

fn unmark(caps: &regex::Captures<'_>) -> String {
    caps[0].trim_matches('*').to_string()
}
