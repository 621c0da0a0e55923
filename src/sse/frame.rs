//! Reply frame types and record parsing.
//!
//! The chat endpoint answers with records of the form
//! `data: {"type": "chunk" | "final" | "error", "content": "..."}`.

use serde::Deserialize;
use thiserror::Error;

/// Prefix every payload record starts with.
pub const DATA_PREFIX: &str = "data: ";

/// One decoded record of a reply stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    /// Partial reply text. Observed, never stored.
    Chunk { content: String },
    /// The complete reply.
    Final {
        content: String,
        agent: Option<String>,
    },
    /// The backend gave up on this reply.
    Error { content: String },
}

impl StreamFrame {
    /// `final` and `error` frames end an exchange.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamFrame::Chunk { .. })
    }

    pub fn content(&self) -> &str {
        match self {
            StreamFrame::Chunk { content }
            | StreamFrame::Final { content, .. }
            | StreamFrame::Error { content } => content,
        }
    }

    /// Short name used in logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            StreamFrame::Chunk { .. } => "chunk",
            StreamFrame::Final { .. } => "final",
            StreamFrame::Error { .. } => "error",
        }
    }
}

/// A record that could not be turned into a [`StreamFrame`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameParseError {
    #[error("frame is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid frame JSON: {message}")]
    InvalidJson { message: String },

    #[error("unknown frame type '{0}'")]
    UnknownType(String),
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    agent: Option<String>,
}

/// Parse the JSON payload of a record (the part after `data: `).
pub fn parse_frame(payload: &str) -> Result<StreamFrame, FrameParseError> {
    let raw: RawFrame =
        serde_json::from_str(payload.trim()).map_err(|e| FrameParseError::InvalidJson {
            message: e.to_string(),
        })?;
    let content = raw.content.unwrap_or_default();

    match raw.kind.as_str() {
        "chunk" => Ok(StreamFrame::Chunk { content }),
        "final" => Ok(StreamFrame::Final {
            content,
            agent: raw.agent.filter(|a| !a.is_empty()),
        }),
        "error" => Ok(StreamFrame::Error { content }),
        other => Err(FrameParseError::UnknownType(other.to_string())),
    }
}

/// Parse one delimited record.
///
/// Returns `None` for records that carry no `data: ` payload (comments,
/// keep-alives, stray blank text).
pub fn parse_record(record: &str) -> Option<Result<StreamFrame, FrameParseError>> {
    let record = record.trim_start_matches('\n');
    if record.trim().is_empty() {
        return None;
    }
    record.strip_prefix(DATA_PREFIX).map(parse_frame)
}
