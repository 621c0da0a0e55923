//! Unified error handling for the chat client.
//!
//! - **Error Categories**: high-level classification for handling decisions
//! - **Domain errors**: network, stream, API envelope, configuration
//! - **Unified type**: [`FbotError`] consolidates all of them
//! - **Context**: [`ErrorContext`] records the failing operation
//!
//! Nothing in the chat layer propagates these to the caller as a crash;
//! they are turned into notices or an apology message. The CLI is the only
//! place an `FbotError` reaches the top level.
//!
//! | Category | Example | Retryable |
//! |----------|---------|-----------|
//! | Network | connection refused, timeout | Yes |
//! | Server | 5xx, `success: false`, error frame | Yes |
//! | Protocol | malformed JSON, missing terminal frame | No |
//! | User | 401/403 | No |
//! | Configuration | bad `FBOT_HISTORY_WINDOW` | No |
//! | Cancelled | stream abandoned on navigation | No |

mod api;
mod category;
mod config;
mod context;
mod fbot_error;
mod network;
mod result;
mod stream;

pub use api::ApiError;
pub use category::ErrorCategory;
pub use config::ConfigError;
pub use context::ErrorContext;
pub use fbot_error::FbotError;
pub use network::{classify_http_error, NetworkError};
pub use result::{FbotResult, ResultExt};
pub use stream::StreamError;
