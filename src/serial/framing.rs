//! # Line Framing
//!
//! Splits the raw serial byte stream into delimiter-terminated lines.
//! Chunks may cut a line anywhere, so partial data is carried over between
//! reads.

use bytes::{Bytes, BytesMut};
use tracing::warn;

/// Accumulates serial chunks and yields complete lines without the delimiter
#[derive(Debug)]
pub struct LineFramer {
    delimiter: Vec<u8>,
    buffer: BytesMut,
    max_line_length: usize,
}

impl LineFramer {
    /// # Arguments
    ///
    /// * `delimiter` - Non-empty line terminator (e.g. `"\n"`)
    /// * `max_line_length` - Longest partial line kept while waiting for a delimiter
    pub fn new(delimiter: &str, max_line_length: usize) -> Self {
        Self {
            delimiter: delimiter.as_bytes().to_vec(),
            buffer: BytesMut::with_capacity(max_line_length),
            max_line_length,
        }
    }

    /// Feed a chunk read from the port and collect every line it completes
    pub fn push(&mut self, data: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(data);

        let mut lines = Vec::new();
        while let Some(pos) = self.find_delimiter() {
            let mut line = self.buffer.split_to(pos + self.delimiter.len());
            line.truncate(pos);
            lines.push(line.freeze());
        }

        if self.buffer.len() > self.max_line_length {
            warn!(
                "Discarding {} bytes of telemetry without a line delimiter",
                self.buffer.len()
            );
            self.buffer.clear();
        }

        lines
    }

    /// Drop any partial line (used when the connection is lost)
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Number of buffered bytes still waiting for a delimiter
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn find_delimiter(&self) -> Option<usize> {
        if self.delimiter.is_empty() {
            return None;
        }
        self.buffer
            .windows(self.delimiter.len())
            .position(|window| window == self.delimiter.as_slice())
    }
}
