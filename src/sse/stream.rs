//! Lazy payload stream over a chunked response body.

use std::collections::VecDeque;

use futures_util::stream::{self, Stream};
use futures_util::StreamExt;

use super::events::StreamPayload;
use super::frame::FrameParser;
use crate::traits::{ByteStream, HttpError};

struct DecodeState {
    body: ByteStream,
    parser: FrameParser,
    ready: VecDeque<StreamPayload>,
    done: bool,
}

/// Turn a response body into a lazy, finite stream of decoded payloads.
///
/// Each poll reads at most one chunk from the body, so a consumer that stops
/// polling stops reading. A transport error is yielded once and ends the
/// stream; the buffered remainder is flushed only on a clean end of body.
pub fn decode_stream(body: ByteStream) -> impl Stream<Item = Result<StreamPayload, HttpError>> + Send {
    let state = DecodeState {
        body,
        parser: FrameParser::new(),
        ready: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(payload) = state.ready.pop_front() {
                return Some((Ok(payload), state));
            }
            if state.done {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    let payloads = state.parser.push(&chunk);
                    state.ready.extend(payloads);
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.done = true;
                    let payloads = state.parser.finish();
                    state.ready.extend(payloads);
                }
            }
        }
    })
}
