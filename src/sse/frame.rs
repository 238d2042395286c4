//! Incremental SSE frame parser.
//!
//! Bytes arrive in arbitrary-sized chunks. They are appended to an internal
//! buffer which is split on the blank-line block separator; the trailing
//! incomplete fragment stays buffered until the next chunk. Each complete
//! block is scanned for `data:` lines, whose contents are rejoined with
//! newlines and decoded into a [`StreamPayload`].
//!
//! Carriage returns are dropped on input, so `\r\n` framing behaves exactly
//! like `\n` framing regardless of where chunk boundaries fall. Apart from the
//! single optional space after `data:`, payload text is passed on unchanged.

use super::events::StreamPayload;

const BLOCK_SEPARATOR: &[u8] = b"\n\n";

/// Stateful parser that turns SSE bytes into decoded payloads.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: Vec<u8>,
    /// Offset before which `buffer` is known to hold no separator
    scanned: usize,
}

impl FrameParser {
    /// Create a new frame parser with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every payload completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamPayload> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut payloads = Vec::new();
        while let Some(pos) = find_separator(&self.buffer, self.scanned) {
            let block: Vec<u8> = self.buffer.drain(..pos + BLOCK_SEPARATOR.len()).collect();
            self.scanned = 0;
            if let Some(payload) = parse_block(&block[..pos]) {
                payloads.push(payload);
            }
        }
        // A separator may straddle this chunk and the next one.
        self.scanned = self
            .buffer
            .len()
            .saturating_sub(BLOCK_SEPARATOR.len() - 1);
        payloads
    }

    /// Flush whatever remains buffered once the stream has ended.
    ///
    /// The remainder goes through the same block parsing exactly once.
    pub fn finish(&mut self) -> Vec<StreamPayload> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        if rest.is_empty() {
            return Vec::new();
        }
        parse_block(&rest).into_iter().collect()
    }

    /// Number of bytes waiting for a block separator.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Discard any buffered partial block.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }
}

fn find_separator(buffer: &[u8], from: usize) -> Option<usize> {
    buffer
        .get(from..)?
        .windows(BLOCK_SEPARATOR.len())
        .position(|window| window == BLOCK_SEPARATOR)
        .map(|pos| from + pos)
}

/// Extract the payload of one SSE block.
///
/// Returns `None` only when the block has no `data:` line. Comment (`:`),
/// `event:`, `id:` and `retry:` lines are ignored. An empty `data:` line still
/// yields a (raw, empty) payload.
pub fn parse_block(block: &[u8]) -> Option<StreamPayload> {
    let text = String::from_utf8_lossy(block);
    let data_lines: Vec<&str> = text
        .split('\n')
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();

    if data_lines.is_empty() {
        return None;
    }

    Some(StreamPayload::from_text(&data_lines.join("\n")))
}
