//! Server-Sent Events (SSE) parsing
//!
//! Two views of the same wire format:
//! - [`SseLineDecoder`] yields the payload of every `data: ` line on its own,
//!   which is all the Google stream needs.
//! - [`SseParser`] assembles full events (`event:` and `data:` fields
//!   terminated by a blank line) as described in the HTML standard:
//!   https://html.spec.whatwg.org/multipage/server-sent-events.html
//!
//! Both buffer raw bytes so a multi-byte character split across network
//! chunks is decoded intact.

/// Prefix of a data line
pub const DATA_PREFIX: &str = "data: ";

/// Sentinel marking the end of a stream
pub const DONE_MARKER: &str = "[DONE]";

/// Splits a byte stream into complete lines
#[derive(Debug, Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append bytes and drain every complete line, newline included
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // Bytes already held contain no newline
        let mut start = self.pending.len();
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(offset) = self.pending[start..].iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=start + offset).collect();
            lines.push(String::from_utf8_lossy(&line).into_owned());
            start = 0;
        }
        lines
    }

    /// Remaining bytes without a trailing newline
    fn take_rest(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// A `data: ` line from a line-oriented SSE stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Payload after the prefix, line terminator removed
    Data(String),
    /// The `[DONE]` sentinel
    Done,
}

/// Line-oriented SSE decoder
///
/// Lines that do not start with `data: ` are ignored.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: LineBuffer,
}

impl SseLineDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a network chunk, returning the data lines it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseLine> {
        self.buffer
            .push(chunk)
            .iter()
            .filter_map(|line| Self::decode_line(line))
            .collect()
    }

    /// Decode a final line that arrived without a newline
    pub fn finish(&mut self) -> Option<SseLine> {
        self.buffer
            .take_rest()
            .and_then(|line| Self::decode_line(&line))
    }

    /// Classify one raw line
    #[must_use]
    pub fn decode_line(line: &str) -> Option<SseLine> {
        let data = line.strip_prefix(DATA_PREFIX)?;
        let data = data.strip_suffix('\n').unwrap_or(data);
        let data = data.strip_suffix('\r').unwrap_or(data);

        if data.trim() == DONE_MARKER {
            Some(SseLine::Done)
        } else {
            Some(SseLine::Data(data.to_string()))
        }
    }
}

/// SSE event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type (e.g., "response.output_text.delta")
    pub event_type: Option<String>,

    /// Event data (JSON payload)
    pub data: String,
}

impl SseEvent {
    /// Check if event is complete (has data)
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.data.is_empty()
    }

    /// Check if this is the done marker
    #[must_use]
    pub fn is_done_marker(&self) -> bool {
        self.data.trim() == DONE_MARKER
    }
}

/// Event-oriented SSE parser
#[derive(Debug, Default)]
pub struct SseParser {
    /// Current event being assembled
    current_event: SseEvent,

    /// Bytes of an incomplete line
    buffer: LineBuffer,
}

impl SseParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a chunk of SSE data
    ///
    /// Returns completed events. Incomplete events are buffered until next call.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer
            .push(chunk)
            .iter()
            .filter_map(|line| {
                let line = line.trim_end_matches('\n').trim_end_matches('\r');
                self.process_line(line)
            })
            .collect()
    }

    /// Process a single line from the SSE stream
    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        // Empty line signals end of event
        if line.is_empty() {
            if self.current_event.is_complete() {
                return Some(std::mem::take(&mut self.current_event));
            }
            self.current_event = SseEvent::default();
            return None;
        }

        // Comments
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = Self::parse_field(line);
        match field {
            "event" => self.current_event.event_type = Some(value.to_string()),
            "data" => {
                if !self.current_event.data.is_empty() {
                    self.current_event.data.push('\n');
                }
                self.current_event.data.push_str(value);
            }
            // `id` and `retry` only matter for reconnection
            _ => {}
        }

        None
    }

    /// Parse a field line into (field_name, value)
    fn parse_field(line: &str) -> (&str, &str) {
        match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        }
    }

    /// Flush any remaining buffered event
    pub fn flush(&mut self) -> Option<SseEvent> {
        if let Some(rest) = self.buffer.take_rest() {
            let line = rest.trim_end_matches('\r').to_string();
            self.process_line(&line);
        }

        if self.current_event.is_complete() {
            Some(std::mem::take(&mut self.current_event))
        } else {
            None
        }
    }
}
