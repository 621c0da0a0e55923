//! Common test utilities for integration tests.
//!
//! ```ignore
//! let backend = MockBackend::new().with_created("c1").with_reply(&[...]);
//! let mut chat = chat_session(&backend.build());
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use fbot::adapters::MockHttpClient;
use fbot::{ChatSession, ClientConfig};

/// Base URL every mocked endpoint lives under.
pub const BASE_URL: &str = "http://fbot.test/api";

/// Full URL of an API path.
pub fn url(path: &str) -> String {
    format!("{}{}", BASE_URL, path)
}

/// Configuration pointing at [`BASE_URL`] with a test token.
pub fn test_config() -> ClientConfig {
    ClientConfig::default()
        .with_api_url(BASE_URL)
        .with_access_token("test-access-token-12345")
        .with_user_name("Lan")
}

/// A chat session over the given mock.
pub fn chat_session(mock: &MockHttpClient) -> ChatSession<MockHttpClient> {
    ChatSession::new(mock.clone(), &test_config())
}
