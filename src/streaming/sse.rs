use bytes::{Buf, BytesMut};

/// Event name used when a frame carries no `event` field
pub const DEFAULT_EVENT: &str = "message";

/// One dispatched Server-Sent-Events message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Incremental SSE line decoder
///
/// Bytes may arrive split at any point, including between `\r` and `\n` or
/// inside a multi-byte character; only complete lines are interpreted.
pub struct SseDecoder {
    buffer: BytesMut,
    /// Bytes of `buffer` already known to hold no line terminator
    scanned: usize,
    event: Option<String>,
    data: Vec<String>,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            scanned: 0,
            event: None,
            data: Vec::new(),
        }
    }

    /// Feed new bytes and extract every frame completed by them
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        self.drain_lines(false)
    }

    /// Flush at end of stream.
    ///
    /// A trailing `\r` still counts as a line end, but a frame that was never
    /// terminated by a blank line is discarded.
    pub fn finish(&mut self) -> Vec<SseFrame> {
        let frames = self.drain_lines(true);
        if !self.buffer.is_empty() || !self.data.is_empty() {
            tracing::debug!(
                pending_bytes = self.buffer.len(),
                pending_data_lines = self.data.len(),
                "Discarding unterminated SSE frame"
            );
        }
        self.buffer.clear();
        self.scanned = 0;
        self.event = None;
        self.data.clear();
        frames
    }

    fn drain_lines(&mut self, at_eof: bool) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        while let Some(line) = self.next_line(at_eof) {
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn next_line(&mut self, at_eof: bool) -> Option<String> {
        let Some(offset) = self.buffer[self.scanned..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
        else {
            self.scanned = self.buffer.len();
            return None;
        };
        let pos = self.scanned + offset;

        let terminator_len = if self.buffer[pos] == b'\r' {
            match self.buffer.get(pos + 1) {
                Some(b'\n') => 2,
                Some(_) => 1,
                None if at_eof => 1,
                // wait for the next chunk to see whether `\n` follows
                None => {
                    self.scanned = pos;
                    return None;
                }
            }
        } else {
            1
        };

        let line = self.buffer.split_to(pos);
        self.buffer.advance(terminator_len);
        self.scanned = 0;
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.find(':') {
            Some(i) => {
                let value = &line[i + 1..];
                (&line[..i], value.strip_prefix(' ').unwrap_or(value))
            }
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry only matter for reconnection, which is not performed
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }

        let data = std::mem::take(&mut self.data).join("\n");
        let event = event
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT.to_string());
        Some(SseFrame { event, data })
    }
}
