//! CLI output: status lines, notices and rich rendering of replies.

mod boxes;
mod render;

pub use boxes::*;
pub use render::*;
