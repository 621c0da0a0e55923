//! Reply stream parsing.
//!
//! A reply arrives as blank-line delimited `data: {json}` records:
//! zero or more `chunk` frames followed by one `final` or `error` frame.

mod decoder;
mod frame;
mod stream;

pub use decoder::{DecodedFrame, FrameDecoder};
pub use frame::{parse_frame, parse_record, FrameParseError, StreamFrame, DATA_PREFIX};
pub use stream::{frame_stream, FrameStream, DEFAULT_MALFORMED_FRAME_LIMIT};
