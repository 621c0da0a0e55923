//! fbot - streaming chat client for the FBot student assistant
//!
//! The library holds the chat core (stream frame decoding, transcript and
//! conversation state, rich text formatting) and the typed API client; the
//! `fbot` binary is a thin command-line front end over it.

pub mod adapters;
pub mod chat;
pub mod cli;
pub mod cli_output;
pub mod client;
pub mod config;
pub mod error;
pub mod markdown;
pub mod models;
pub mod session;
pub mod sse;
pub mod state;
pub mod traits;

pub use adapters::ReqwestHttpClient;
pub use chat::{ChatSession, SendError, SendOutcome};
pub use client::{ChatApiClient, DeleteOutcome};
pub use config::ClientConfig;
pub use error::{FbotError, FbotResult};
pub use markdown::{format_message, FormatCache, Segment};
pub use session::SessionContext;
pub use sse::{FrameDecoder, StreamFrame};
