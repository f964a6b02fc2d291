//! Server-sent event framing
//!
//! Events are separated by a blank line. Only `data:` fields are kept;
//! multiple data lines in one event are joined with `\n`. Comment lines
//! (`:`) and other fields are ignored. Framing works on bytes; text is
//! decoded one complete event at a time.

/// Incremental SSE decoder fed with raw byte chunks.
///
/// Bytes are buffered undecoded until an event is complete, so a UTF-8
/// character split across network chunks is decoded whole.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return the data payloads of every completed event
    pub fn push(&mut self, chunk: impl AsRef<[u8]>) -> Vec<String> {
        // CRLF framing is normalized so a boundary split across chunks still matches.
        // 0x0D never occurs inside a multi-byte UTF-8 sequence.
        self.buffer
            .extend(chunk.as_ref().iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(pos) = find_boundary(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            if let Some(data) = event_data(&String::from_utf8_lossy(&block)) {
                events.push(data);
            }
        }
        events
    }

    /// Flush a trailing event that was not terminated by a blank line
    pub fn finish(&mut self) -> Option<String> {
        let block = std::mem::take(&mut self.buffer);
        event_data(&String::from_utf8_lossy(&block))
    }
}

fn find_boundary(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn event_data(block: &str) -> Option<String> {
    let data_lines: Vec<&str> = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}
