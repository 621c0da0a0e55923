//! Incremental record decoder.
//!
//! Network chunks can split a record anywhere, including inside a
//! multi-byte character. Bytes are buffered until a blank-line delimiter
//! arrives, so only complete records are ever decoded as UTF-8.

use super::frame::{parse_record, FrameParseError, StreamFrame};

const DELIMITER: &[u8] = b"\n\n";

pub type DecodedFrame = Result<StreamFrame, FrameParseError>;

/// Turns raw body chunks into frames.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk, returning every record it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<DecodedFrame> {
        // `\r\n\r\n` delimiters become `\n\n`; JSON escapes any CR inside content.
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut frames = Vec::new();
        while let Some(pos) = find_delimiter(&self.buffer) {
            let record: Vec<u8> = self.buffer.drain(..pos + DELIMITER.len()).collect();
            if let Some(frame) = decode_record(&record[..pos]) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush a trailing record that never got its delimiter.
    pub fn finish(&mut self) -> Vec<DecodedFrame> {
        let rest = std::mem::take(&mut self.buffer);
        decode_record(&rest).into_iter().collect()
    }

    /// Bytes waiting for a delimiter.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}

fn find_delimiter(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(DELIMITER.len())
        .position(|window| window == DELIMITER)
}

fn decode_record(bytes: &[u8]) -> Option<DecodedFrame> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse_record(text),
        Err(_) => Some(Err(FrameParseError::InvalidUtf8)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(frames: Vec<DecodedFrame>) -> Vec<String> {
        frames
            .into_iter()
            .map(|f| f.unwrap().content().to_string())
            .collect()
    }

    #[test]
    fn test_two_records_in_one_chunk() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(
            b"data: {\"type\":\"chunk\",\"content\":\"He\"}\n\ndata: {\"type\":\"final\",\"content\":\"Hello back\"}\n\n",
        );
        assert_eq!(contents(frames), vec!["He", "Hello back"]);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_record_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: {\"type\":\"chu").is_empty());
        assert!(decoder.feed(b"nk\",\"content\":\"x\"}\n").is_empty());
        let frames = decoder.feed(b"\n");
        assert_eq!(contents(frames), vec!["x"]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let record = "data: {\"type\":\"final\",\"content\":\"chào\"}\n\n".as_bytes();
        // Split inside the two-byte 'à'.
        let split = record.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(&record[..split]).is_empty());
        let frames = decoder.feed(&record[split..]);
        assert_eq!(contents(frames), vec!["chào"]);
    }

    #[test]
    fn test_crlf_delimiters() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"data: {\"type\":\"chunk\",\"content\":\"a\"}\r\n\r\n");
        assert_eq!(contents(frames), vec!["a"]);
    }

    #[test]
    fn test_malformed_record_does_not_stop_decoding() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(
            b"data: {oops\n\ndata: {\"type\":\"final\",\"content\":\"ok\"}\n\n",
        );
        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[0], Err(FrameParseError::InvalidJson { .. })));
        assert_eq!(frames[1].as_ref().unwrap().content(), "ok");
    }

    #[test]
    fn test_invalid_utf8_record() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"data: \xFF\xFE\n\n");
        assert_eq!(frames, vec![Err(FrameParseError::InvalidUtf8)]);
    }

    #[test]
    fn test_finish_flushes_trailing_record() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder
            .feed(b"data: {\"type\":\"final\",\"content\":\"tail\"}")
            .is_empty());
        assert_eq!(contents(decoder.finish()), vec!["tail"]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_non_data_records_are_skipped() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b": ping\n\n\n\ndata: {\"type\":\"chunk\",\"content\":\"c\"}\n\n");
        assert_eq!(contents(frames), vec!["c"]);
    }
}
