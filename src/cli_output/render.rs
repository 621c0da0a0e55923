//! Terminal rendering of formatted replies, transcripts and the
//! conversation list.
//!
//! Everything renders to a `String` first; the `print_*` wrappers only
//! write it out. ANSI styling is applied when the renderer is built with
//! `ansi = true`.

use std::io::IsTerminal;

use crate::markdown::{FormatCache, Inline, Segment, TextLine};
use crate::models::{agent_display_name, Conversation, Message};
use crate::state::{ConversationList, Transcript};

const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const UNDERLINE: &str = "\x1b[4m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Renders bot replies through the rich text formatter.
pub struct TerminalRenderer {
    cache: FormatCache,
    ansi: bool,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(std::io::stdout().is_terminal())
    }
}

impl TerminalRenderer {
    pub fn new(ansi: bool) -> Self {
        Self {
            cache: FormatCache::new(),
            ansi,
        }
    }

    /// Plain renderer, for pipes and tests.
    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn cache(&self) -> &FormatCache {
        &self.cache
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.ansi {
            format!("{}{}{}", style, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn render_inlines(&self, inlines: &[Inline]) -> String {
        inlines
            .iter()
            .map(|inline| match inline {
                Inline::Text(text) => text.clone(),
                Inline::Bold(text) => self.styled(BOLD, text),
                Inline::Italic(text) => self.styled(ITALIC, text),
                Inline::Link(url) => self.styled(UNDERLINE, url),
            })
            .collect()
    }

    fn render_table(&self, headers: &[String], rows: &[Vec<String>]) -> String {
        let columns = std::iter::once(headers.len())
            .chain(rows.iter().map(Vec::len))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let format_row = |row: &[String]| -> String {
            let cells: Vec<String> = (0..columns)
                .map(|i| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    let pad = widths[i] - cell.chars().count();
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect();
            format!("│ {} │", cells.join(" │ "))
        };

        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        let mut lines = vec![
            self.styled(BOLD, &format_row(headers)),
            format!("├{}┤", rule.join("┼")),
        ];
        lines.extend(rows.iter().map(|row| format_row(row)));
        lines.join("\n")
    }

    fn render_code(&self, language: &str, content: &str) -> String {
        let mut lines = vec![self.styled(DIM, &format!("┌─ {}", language))];
        lines.extend(
            content
                .trim_end_matches('\n')
                .lines()
                .map(|line| format!("│ {}", line)),
        );
        lines.push(self.styled(DIM, "└─"));
        lines.join("\n")
    }

    /// Render formatted segments, one block per segment.
    pub fn render_segments(&self, segments: &[Segment]) -> String {
        let blocks: Vec<String> = segments
            .iter()
            .map(|segment| match segment {
                Segment::Text { lines } => lines
                    .iter()
                    .map(|line| match line {
                        TextLine::Paragraph(inlines) => self.render_inlines(inlines),
                        TextLine::Bullet(inlines) => {
                            format!("  • {}", self.render_inlines(inlines))
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
                Segment::Code { language, content } => self.render_code(language, content),
                Segment::Table { headers, rows } => self.render_table(headers, rows),
            })
            .collect();
        blocks.join("\n\n")
    }

    /// Format and render reply text.
    pub fn render_reply(&mut self, content: &str) -> String {
        let segments = self.cache.format(content);
        self.render_segments(&segments)
    }

    /// One transcript message with its author line. User text is printed
    /// verbatim; bot text goes through the formatter.
    pub fn render_message(&mut self, message: &Message) -> String {
        if message.is_user() {
            let author = self.styled(BOLD, "You");
            return format!("{}\n{}", author, message.content);
        }
        let author = self.styled(BOLD, agent_display_name(message.agent.as_deref()));
        let body = self.render_reply(&message.content);
        format!("{}\n{}", author, body)
    }

    /// The visible part of a transcript, with a hint for hidden messages.
    pub fn render_transcript(&mut self, transcript: &Transcript) -> String {
        let mut blocks = Vec::new();
        let hidden = transcript.hidden_count();
        if hidden > 0 {
            blocks.push(self.styled(DIM, &format!("… {} earlier message(s)", hidden)));
        }
        for message in transcript.visible_messages() {
            blocks.push(self.render_message(message));
        }
        blocks.join("\n\n")
    }
}

/// One line per conversation; the selected one is marked with `>` and a
/// title not yet saved on the backend with `*`.
pub fn render_conversation_list(list: &ConversationList) -> String {
    if list.is_empty() {
        return "No conversations yet.".to_string();
    }
    let selected = list.selected_id();
    list.iter()
        .map(|conversation| render_conversation_line(conversation, selected == Some(&conversation.id)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_conversation_line(conversation: &Conversation, selected: bool) -> String {
    format!(
        "{} {}  {}{}  ({} messages, {})",
        if selected { ">" } else { " " },
        conversation.id,
        conversation.title,
        if conversation.title_sync_pending { " *" } else { "" },
        conversation.message_count,
        conversation.updated_at.format("%Y-%m-%d %H:%M"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServerConversation;

    #[test]
    fn test_plain_reply_with_bullets() {
        let mut renderer = TerminalRenderer::plain();
        let out = renderer.render_reply("Plan:\n- **read** notes\n- quiz");
        assert_eq!(out, "Plan:\n  • read notes\n  • quiz");
    }

    #[test]
    fn test_ansi_bold() {
        let mut renderer = TerminalRenderer::new(true);
        let out = renderer.render_reply("a **b**");
        assert_eq!(out, format!("a {}b{}", BOLD, RESET));
    }

    #[test]
    fn test_table_columns_are_aligned() {
        let mut renderer = TerminalRenderer::plain();
        let out = renderer.render_reply("| Day | Task |\n|---|---|\n| Monday | Read |\n| Tue | Quiz |");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "│ Day    │ Task │");
        assert_eq!(lines[1], "├────────┼──────┤");
        assert_eq!(lines[2], "│ Monday │ Read │");
        assert_eq!(lines[3], "│ Tue    │ Quiz │");
    }

    #[test]
    fn test_code_block() {
        let mut renderer = TerminalRenderer::plain();
        let out = renderer.render_reply("```rust\nfn main() {}\n```");
        assert_eq!(out, "┌─ rust\n│ fn main() {}\n└─");
    }

    #[test]
    fn test_reply_rendering_is_cached() {
        let mut renderer = TerminalRenderer::plain();
        renderer.render_reply("same");
        renderer.render_reply("same");
        assert_eq!(renderer.cache().stats(), (1, 1));
    }

    #[test]
    fn test_message_author_lines() {
        let mut renderer = TerminalRenderer::plain();
        let user = Message::user("*not italic*");
        assert_eq!(renderer.render_message(&user), "You\n*not italic*");

        let bot = Message::bot("Done", Some("schedule_agent".to_string()));
        assert_eq!(renderer.render_message(&bot), "Task management\nDone");
    }

    #[test]
    fn test_transcript_hidden_hint() {
        let mut transcript = Transcript::new(1);
        transcript.append_user_message("one");
        transcript.append_user_message("two");

        let mut renderer = TerminalRenderer::plain();
        let out = renderer.render_transcript(&transcript);
        assert_eq!(out, "… 1 earlier message(s)\n\nYou\ntwo");
    }

    #[test]
    fn test_conversation_list() {
        let mut list = ConversationList::new();
        assert_eq!(render_conversation_list(&list), "No conversations yet.");

        list.replace_from_server(vec![ServerConversation {
            id: "c1".to_string(),
            title: "Calculus".to_string(),
            message_count: Some(4),
            updated_at: None,
            started_at: None,
            last_message: "thanks".to_string(),
        }]);
        list.select("c1");
        list.mark_title_pending("c1");

        let out = render_conversation_list(&list);
        assert!(out.starts_with("> c1  Calculus *  (4 messages, "));
    }
}
