//! Pipe table detection and parsing.

use once_cell::sync::Lazy;
use regex::Regex;

/// A line with text between two pipes.
static TABLE_LINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|(.+)\|").expect("Invalid table regex pattern"));

/// A table is attempted once more than this many lines look like rows.
const TABLE_LINE_THRESHOLD: usize = 2;

/// A parsed table plus the prose around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedTable {
    pub before: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub after: String,
}

pub(crate) fn looks_like_table(content: &str) -> bool {
    TABLE_LINE_REGEX.find_iter(content).count() > TABLE_LINE_THRESHOLD
}

/// Parse the pipe lines of `content` into a table.
///
/// Cells are trimmed and empty cells dropped; separator rows (only dashes,
/// colons and pipes) are discarded. Returns `None` when fewer than two rows
/// survive. Lines before the first pipe line and after the last one are
/// kept as surrounding prose; anything in between that has no pipe is
/// dropped.
pub(crate) fn parse_table(content: &str) -> Option<ParsedTable> {
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let first = lines.iter().position(|l| l.contains('|'))?;
    let last = lines.iter().rposition(|l| l.contains('|'))?;

    let mut rows: Vec<Vec<String>> = lines[first..=last]
        .iter()
        .filter(|l| l.contains('|'))
        .map(|l| split_cells(l))
        .filter(|cells| !is_separator_row(cells))
        .collect();

    if rows.len() < 2 {
        return None;
    }
    let headers = rows.remove(0);

    Some(ParsedTable {
        before: lines[..first].join("\n"),
        headers,
        rows,
        after: lines[last + 1..].join("\n"),
    })
}

fn split_cells(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

/// True for `|---|:---:|` style rows, and for rows with no cells at all.
fn is_separator_row(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|cell| cell.contains('-') && cell.chars().all(|c| matches!(c, '-' | ':' | '|')))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "| Subject | Score |\n|---------|-------|\n| Math | 8.5 |\n| Physics | 7 |";

    #[test]
    fn test_detection_threshold() {
        assert!(looks_like_table(TABLE));
        assert!(!looks_like_table("| a |\n| b |"));
        assert!(!looks_like_table("no pipes here"));
    }

    #[test]
    fn test_parse_shape() {
        let table = parse_table(TABLE).unwrap();
        assert_eq!(table.headers, vec!["Subject", "Score"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["Physics", "7"]);
        assert!(table.before.is_empty());
        assert!(table.after.is_empty());
    }

    #[test]
    fn test_alignment_separator_is_dropped() {
        let table = parse_table("| a | b |\n|:---|---:|\n| 1 | 2 |").unwrap();
        assert_eq!(table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_only_header_and_separator_is_not_a_table() {
        assert!(parse_table("| a | b |\n|---|---|\n").is_none());
    }

    #[test]
    fn test_surrounding_prose_is_kept() {
        let table = parse_table(&format!("Your scores:\n\n{}\n\nKeep it up!", TABLE)).unwrap();
        assert_eq!(table.before, "Your scores:");
        assert_eq!(table.after, "Keep it up!");
    }
}
