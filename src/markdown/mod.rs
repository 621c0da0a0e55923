//! Rich text formatting for bot replies.
//!
//! Turns reply text into [`Segment`]s a front end can render:
//! - pipe tables
//! - fenced code blocks (language defaults to `text`)
//! - bullet lines (`1. `, `- `, `* `, `• `); list numbers are not kept
//! - inline links, `**bold**` and `*italic*`
//!
//! Formatting is pure and deterministic. [`FormatCache`] memoizes it for
//! transcripts that are re-rendered often.

mod cache;
mod inline;
mod table;

pub use cache::FormatCache;
pub use inline::{parse_inline, strip_emphasis, Inline};

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of entries in the format cache before eviction
pub const FORMAT_CACHE_MAX_ENTRIES: usize = 500;

/// Closed code fences: ```` ```lang\nbody``` ````.
static CODE_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(\w+)?\n(.*?)```").expect("Invalid code block regex pattern"));

static ORDERED_ITEM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s").expect("Invalid list regex pattern"));

static UNORDERED_ITEM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*•]\s").expect("Invalid list regex pattern"));

/// One line of prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextLine {
    Paragraph(Vec<Inline>),
    Bullet(Vec<Inline>),
}

impl TextLine {
    pub fn inlines(&self) -> &[Inline] {
        match self {
            TextLine::Paragraph(inlines) | TextLine::Bullet(inlines) => inlines,
        }
    }
}

/// A renderable block of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text {
        lines: Vec<TextLine>,
    },
    Code {
        language: String,
        content: String,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl Segment {
    fn empty_text() -> Self {
        Segment::Text { lines: Vec::new() }
    }
}

/// Format reply text into segments. Empty input gives one empty text
/// segment.
pub fn format_message(content: &str) -> Vec<Segment> {
    if content.trim().is_empty() {
        return vec![Segment::empty_text()];
    }

    if table::looks_like_table(content) {
        if let Some(parsed) = table::parse_table(content) {
            let mut segments = Vec::new();
            push_text_segment(&parsed.before, &mut segments);
            segments.push(Segment::Table {
                headers: parsed.headers,
                rows: parsed.rows,
            });
            push_text_segment(&parsed.after, &mut segments);
            return segments;
        }
        return vec![format_text(content)];
    }

    let mut segments = Vec::new();
    let mut last = 0;
    for caps in CODE_BLOCK_REGEX.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        push_text_segment(&content[last..whole.start()], &mut segments);
        segments.push(Segment::Code {
            language: caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "text".to_string()),
            content: caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        });
        last = whole.end();
    }
    push_text_segment(&content[last..], &mut segments);

    if segments.is_empty() {
        segments.push(Segment::empty_text());
    }
    segments
}

fn push_text_segment(text: &str, segments: &mut Vec<Segment>) {
    let text = text.trim_matches('\n');
    if !text.trim().is_empty() {
        segments.push(format_text(text));
    }
}

/// Line-level formatting of prose.
fn format_text(text: &str) -> Segment {
    let lines = text
        .trim_matches('\n')
        .lines()
        .map(|line| {
            if let Some(m) = ORDERED_ITEM_REGEX.find(line) {
                TextLine::Bullet(parse_inline(&line[m.end()..]))
            } else if let Some(m) = UNORDERED_ITEM_REGEX.find(line) {
                TextLine::Bullet(parse_inline(&line[m.end()..]))
            } else {
                TextLine::Paragraph(parse_inline(line))
            }
        })
        .collect();
    Segment::Text { lines }
}

/// Reply text with inline markup removed.
pub fn to_plain_text(content: &str) -> String {
    strip_emphasis(content)
}

/// Render segments back to unmarked text, one block per segment.
pub fn segments_to_plain(segments: &[Segment]) -> String {
    let blocks: Vec<String> = segments
        .iter()
        .map(|segment| match segment {
            Segment::Text { lines } => lines
                .iter()
                .map(|line| {
                    let text: String = line.inlines().iter().map(Inline::text).collect();
                    match line {
                        TextLine::Bullet(_) => format!("• {}", text),
                        TextLine::Paragraph(_) => text,
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Segment::Code { content, .. } => content.trim_end_matches('\n').to_string(),
            Segment::Table { headers, rows } => std::iter::once(headers)
                .chain(rows.iter())
                .map(|row| row.join(" | "))
                .collect::<Vec<_>>()
                .join("\n"),
        })
        .collect();
    blocks.join("\n\n")
}
