//! Reassembles complete lines from arbitrary stdout fragments

use tracing::debug;

/// Accumulates raw byte chunks and yields complete, newline-stripped lines
///
/// Process pipes deliver fragments of any size: a chunk may end in the
/// middle of a line (or of a UTF-8 sequence) and may carry several lines at
/// once. Bytes after the last `\n` are kept until a later chunk completes
/// them. A trailing `\r` is stripped along with the `\n`.
///
/// # Examples
///
/// ```
/// use tubetools::progress::LineBuffer;
///
/// let mut buffer = LineBuffer::new();
/// assert!(buffer.push(b"[download]  45.2").is_empty());
/// assert_eq!(buffer.push(b"%\nnext"), vec!["[download]  45.2%".to_string()]);
/// assert_eq!(buffer.pending_len(), 4);
/// ```
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every line it completes, in order
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete[..last_newline]
            .split(|&b| b == b'\n')
            .map(|line| {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                String::from_utf8_lossy(line).into_owned()
            })
            .collect()
    }

    /// Number of buffered bytes not yet terminated by a newline
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// End of stream: an unterminated trailing line is discarded
    ///
    /// Returns the number of bytes that were dropped.
    pub fn finish(self) -> usize {
        let dropped = self.pending.len();
        if dropped > 0 {
            debug!(
                bytes = dropped,
                partial = %String::from_utf8_lossy(&self.pending),
                "discarding unterminated trailing output"
            );
        }
        dropped
    }
}
