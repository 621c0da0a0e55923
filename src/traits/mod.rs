//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP operations used by the chat API client

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
