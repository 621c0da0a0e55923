//! Client-side chat state.
//!
//! - [`Transcript`]: messages of the selected conversation
//! - [`ConversationList`]: the sidebar list and its selection
//! - [`Notices`]: toasts for recoverable failures

pub mod conversations;
pub mod notices;
pub mod transcript;

pub use conversations::{ConversationList, ConversationPhase};
pub use notices::{Notice, NoticeLevel, Notices};
pub use transcript::Transcript;
