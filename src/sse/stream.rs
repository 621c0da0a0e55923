//! Frame stream over an HTTP body.

use std::collections::VecDeque;
use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::decoder::{DecodedFrame, FrameDecoder};
use super::frame::StreamFrame;
use crate::error::StreamError;
use crate::traits::ByteStream;

/// Consecutive malformed records tolerated before a stream is abandoned.
pub const DEFAULT_MALFORMED_FRAME_LIMIT: usize = 5;

/// Decoded frames of one reply.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<StreamFrame, StreamError>> + Send>>;

/// Wrap an HTTP body into a stream of frames.
///
/// The stream ends right after the first terminal frame; whatever the body
/// still holds is dropped unread. It ends with an error when:
/// - the body fails ([`StreamError::ConnectionLost`])
/// - the body ends before a terminal frame ([`StreamError::MissingTerminalFrame`])
/// - `malformed_limit` records in a row fail to parse
/// - `cancel` fires ([`StreamError::Cancelled`])
pub fn frame_stream(
    body: ByteStream,
    cancel: CancellationToken,
    malformed_limit: usize,
) -> FrameStream {
    let reader = FrameReader {
        body,
        decoder: FrameDecoder::new(),
        pending: VecDeque::new(),
        cancel,
        malformed_limit: malformed_limit.max(1),
        consecutive_failures: 0,
        body_ended: false,
        done: false,
    };

    Box::pin(stream::unfold(reader, |mut reader| async move {
        let item = reader.next_frame().await?;
        Some((item, reader))
    }))
}

struct FrameReader {
    body: ByteStream,
    decoder: FrameDecoder,
    pending: VecDeque<DecodedFrame>,
    cancel: CancellationToken,
    malformed_limit: usize,
    consecutive_failures: usize,
    body_ended: bool,
    done: bool,
}

impl FrameReader {
    async fn next_frame(&mut self) -> Option<Result<StreamFrame, StreamError>> {
        if self.done {
            return None;
        }

        loop {
            if self.cancel.is_cancelled() {
                return self.fail(StreamError::Cancelled);
            }

            while let Some(decoded) = self.pending.pop_front() {
                match decoded {
                    Ok(frame) => {
                        self.consecutive_failures = 0;
                        if frame.is_terminal() {
                            debug!(frame = frame.type_name(), "terminal frame received");
                            self.done = true;
                        }
                        return Some(Ok(frame));
                    }
                    Err(err) => {
                        self.consecutive_failures += 1;
                        warn!(
                            error = %err,
                            consecutive = self.consecutive_failures,
                            "skipping malformed frame"
                        );
                        if self.consecutive_failures >= self.malformed_limit {
                            return self.fail(StreamError::TooManyMalformedFrames {
                                count: self.consecutive_failures,
                                last_error: err.to_string(),
                            });
                        }
                    }
                }
            }

            if self.body_ended {
                return self.fail(StreamError::MissingTerminalFrame);
            }

            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                next = self.body.next() => Some(next),
            };
            let Some(next) = next else {
                return self.fail(StreamError::Cancelled);
            };

            match next {
                Some(Ok(bytes)) => {
                    let frames = self.decoder.feed(&bytes);
                    self.pending.extend(frames);
                }
                Some(Err(err)) => {
                    warn!(error = %err, "reply body failed");
                    return self.fail(StreamError::ConnectionLost {
                        message: err.to_string(),
                    });
                }
                None => {
                    self.body_ended = true;
                    let frames = self.decoder.finish();
                    self.pending.extend(frames);
                }
            }
        }
    }

    fn fail(&mut self, err: StreamError) -> Option<Result<StreamFrame, StreamError>> {
        self.done = true;
        Some(Err(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::HttpError;
    use bytes::Bytes;
    use futures::TryStreamExt;

    fn body(chunks: Vec<&'static str>) -> ByteStream {
        Box::pin(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, HttpError>(Bytes::from_static(c.as_bytes()))),
        ))
    }

    async fn collect(stream: FrameStream) -> Vec<Result<StreamFrame, StreamError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_chunks_then_final() {
        let frames: Vec<StreamFrame> = frame_stream(
            body(vec![
                "data: {\"type\":\"chunk\",\"content\":\"He\"}\n\n",
                "data: {\"type\":\"final\",\"content\":\"Hello back\"}\n\n",
            ]),
            CancellationToken::new(),
            DEFAULT_MALFORMED_FRAME_LIMIT,
        )
        .try_collect()
        .await
        .unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].content(), "Hello back");
    }

    #[tokio::test]
    async fn test_stops_after_first_terminal_frame() {
        let items = collect(frame_stream(
            body(vec![
                "data: {\"type\":\"final\",\"content\":\"one\"}\n\n\
                 data: {\"type\":\"final\",\"content\":\"two\"}\n\n",
            ]),
            CancellationToken::new(),
            DEFAULT_MALFORMED_FRAME_LIMIT,
        ))
        .await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap().content(), "one");
    }

    #[tokio::test]
    async fn test_missing_terminal_frame() {
        let items = collect(frame_stream(
            body(vec!["data: {\"type\":\"chunk\",\"content\":\"He\"}\n\n"]),
            CancellationToken::new(),
            DEFAULT_MALFORMED_FRAME_LIMIT,
        ))
        .await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[1], Err(StreamError::MissingTerminalFrame));
    }

    #[tokio::test]
    async fn test_trailing_final_without_delimiter() {
        let items = collect(frame_stream(
            body(vec!["data: {\"type\":\"final\",\"content\":\"end\"}"]),
            CancellationToken::new(),
            DEFAULT_MALFORMED_FRAME_LIMIT,
        ))
        .await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap().content(), "end");
    }

    #[tokio::test]
    async fn test_malformed_frames_are_skipped_below_limit() {
        let items = collect(frame_stream(
            body(vec![
                "data: {bad\n\ndata: nope\n\n",
                "data: {\"type\":\"final\",\"content\":\"ok\"}\n\n",
            ]),
            CancellationToken::new(),
            3,
        ))
        .await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap().content(), "ok");
    }

    #[tokio::test]
    async fn test_too_many_malformed_frames() {
        let items = collect(frame_stream(
            body(vec![
                "data: {bad\n\ndata: {bad\n\ndata: {\"type\":\"final\",\"content\":\"late\"}\n\n",
            ]),
            CancellationToken::new(),
            2,
        ))
        .await;

        assert_eq!(items.len(), 1);
        assert!(matches!(
            items[0],
            Err(StreamError::TooManyMalformedFrames { count: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_body_error_is_connection_lost() {
        let failing: ByteStream = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"data: {\"type\":\"chunk\",\"content\":\"a\"}\n\n")),
            Err(HttpError::Io("reset by peer".to_string())),
        ]));
        let items = collect(frame_stream(
            failing,
            CancellationToken::new(),
            DEFAULT_MALFORMED_FRAME_LIMIT,
        ))
        .await;

        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(StreamError::ConnectionLost { .. })));
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_body() {
        let hanging: ByteStream = Box::pin(
            stream::iter(vec![Ok::<_, HttpError>(Bytes::from_static(
                b"data: {\"type\":\"chunk\",\"content\":\"a\"}\n\n",
            ))])
            .chain(stream::pending()),
        );
        let token = CancellationToken::new();
        let mut frames = frame_stream(hanging, token.clone(), DEFAULT_MALFORMED_FRAME_LIMIT);

        assert!(frames.next().await.unwrap().is_ok());
        token.cancel();
        assert_eq!(frames.next().await, Some(Err(StreamError::Cancelled)));
        assert!(frames.next().await.is_none());
    }
}
