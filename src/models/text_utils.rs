//! Text helpers for conversation titles and agent labels.

/// Title of a conversation nobody has written in yet.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New conversation";

/// Greetings removed from the front of a first message, checked in order.
const GREETING_PREFIXES: &[&str] = &["xin chào", "hello", "hi", "chào", "hey"];

/// Longest title in characters before an ellipsis is appended.
const MAX_TITLE_CHARS: usize = 25;

/// Build a conversation title from the first user message.
///
/// The first matching greeting is removed (whole word, case-insensitive)
/// along with the punctuation that follows it. If less than three
/// characters survive, the trimmed original is used instead. Titles longer
/// than 25 characters are cut and get `...` appended.
pub fn generate_conversation_title(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return DEFAULT_CONVERSATION_TITLE.to_string();
    }

    let mut cleaned = trimmed;
    for prefix in GREETING_PREFIXES {
        if let Some(rest) = strip_greeting(trimmed, prefix) {
            cleaned = rest.trim_start_matches(|c: char| c.is_whitespace() || is_separator(c));
            break;
        }
    }

    if cleaned.chars().count() < 3 {
        cleaned = trimmed;
    }

    if cleaned.chars().count() > MAX_TITLE_CHARS {
        let cut: String = cleaned.chars().take(MAX_TITLE_CHARS).collect();
        return format!("{}...", cut);
    }

    cleaned.to_string()
}

/// `Some(rest)` when `text` starts with `prefix` as a whole word.
fn strip_greeting<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix_chars = prefix.chars().count();
    let split_at = text
        .char_indices()
        .nth(prefix_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let (head, rest) = text.split_at(split_at);

    if head.to_lowercase() != prefix {
        return None;
    }
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() => None,
        _ => Some(rest),
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | '!' | '.' | ';' | ':' | '-')
}

/// Human-readable label for a reply's agent tag.
pub fn agent_display_name(agent: Option<&str>) -> &'static str {
    match agent {
        Some("rag_agent") => "Education advice",
        Some("schedule_agent") => "Task management",
        Some("analytic_agent") => "Performance analysis",
        Some("generic_agent") => "Information search",
        _ => "FBot AI",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_stripped_and_truncated() {
        assert_eq!(
            generate_conversation_title("Xin chào, can you help with calculus"),
            "can you help with calculu..."
        );
    }

    #[test]
    fn test_truncation_keeps_trailing_space() {
        let title = generate_conversation_title("list all of my exams for next month");
        assert_eq!(title, "list all of my exams for ...");
        assert_eq!(title.trim_end_matches("...").chars().count(), 25);
    }

    #[test]
    fn test_short_title_kept_verbatim() {
        assert_eq!(generate_conversation_title("  Derivatives  "), "Derivatives");
    }

    #[test]
    fn test_exactly_25_chars_has_no_ellipsis() {
        let text = "abcdefghijklmnopqrstuvwxy";
        assert_eq!(text.chars().count(), 25);
        assert_eq!(generate_conversation_title(text), text);
    }

    #[test]
    fn test_empty_input_uses_default() {
        assert_eq!(generate_conversation_title(""), DEFAULT_CONVERSATION_TITLE);
        assert_eq!(generate_conversation_title("   \n"), DEFAULT_CONVERSATION_TITLE);
    }

    #[test]
    fn test_bare_greeting_falls_back_to_original() {
        assert_eq!(generate_conversation_title("Hello!"), "Hello!");
        assert_eq!(generate_conversation_title("hi"), "hi");
    }

    #[test]
    fn test_greeting_must_be_whole_word() {
        assert_eq!(
            generate_conversation_title("history of Vietnam"),
            "history of Vietnam"
        );
        assert_eq!(generate_conversation_title("Heyday stories"), "Heyday stories");
    }

    #[test]
    fn test_first_matching_prefix_wins() {
        assert_eq!(generate_conversation_title("Hey there, todo list"), "there, todo list");
        assert_eq!(generate_conversation_title("chào bạn ơi"), "bạn ơi");
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "Lịch học tuần này của tôi là gì vậy";
        let title = generate_conversation_title(text);
        assert!(title.ends_with("..."));
        assert_eq!(title.trim_end_matches("...").chars().count(), 25);
    }

    #[test]
    fn test_agent_display_names() {
        assert_eq!(agent_display_name(Some("rag_agent")), "Education advice");
        assert_eq!(agent_display_name(Some("schedule_agent")), "Task management");
        assert_eq!(agent_display_name(Some("error")), "FBot AI");
        assert_eq!(agent_display_name(None), "FBot AI");
    }
}
