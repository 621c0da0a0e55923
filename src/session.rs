//! Authenticated session context.
//!
//! Replaces ambient "current user" globals: whoever needs the token or the
//! user's name gets it from the [`SessionContext`] they were handed.

use tracing::info;

use crate::config::ClientConfig;
use crate::traits::Headers;

/// Who is talking to the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    access_token: Option<String>,
    user_name: Option<String>,
}

impl SessionContext {
    pub fn new(access_token: Option<String>, user_name: Option<String>) -> Self {
        Self {
            access_token,
            user_name,
        }
    }

    /// Session for the credentials carried by `config`.
    pub fn init(config: &ClientConfig) -> Self {
        let session = Self::new(config.access_token.clone(), config.user_name.clone());
        info!(
            authenticated = session.is_authenticated(),
            "session initialized"
        );
        session
    }

    /// Forget the credentials. Requests made afterwards are anonymous.
    pub fn logout(&mut self) {
        self.access_token = None;
        self.user_name = None;
        info!("session cleared");
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Headers every request carries.
    pub fn auth_headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let Some(token) = &self.access_token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }
}
