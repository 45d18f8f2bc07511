//! Incremental decoder for the `data: <json>\n\n` event stream.
//!
//! Network chunks can end anywhere, including inside a record or inside a
//! multi-byte character, so bytes are buffered until a full record separator
//! arrives and only complete records are decoded.

use tracing::{debug, warn};

use crate::events::StreamEvent;

const SEPARATOR: &[u8] = b"\n\n";
const DATA_FIELD: &str = "data:";

#[derive(Debug, Default)]
pub struct RecordDecoder {
    buffer: Vec<u8>,
    /// Bytes already searched for a separator.
    scanned: usize,
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns every event completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        loop {
            // A separator may straddle the previous scan boundary.
            let from = self.scanned.saturating_sub(SEPARATOR.len() - 1);
            let Some(offset) = find(&self.buffer[from..], SEPARATOR) else {
                self.scanned = self.buffer.len();
                break;
            };
            let end = from + offset;
            let record: Vec<u8> = self.buffer.drain(..end + SEPARATOR.len()).collect();
            self.scanned = 0;
            if let Some(event) = decode_record(&record[..end]) {
                events.push(event);
            }
        }

        events
    }

    /// Decode whatever is left once the stream has closed. A trailing record
    /// without its separator is accepted if it parses.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        if rest.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        decode_record(&rest)
    }

    /// Bytes held back waiting for a separator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Join the record's `data:` lines and parse the payload. Comment lines and
/// other fields are ignored; unparseable payloads are logged and dropped.
fn decode_record(raw: &[u8]) -> Option<StreamEvent> {
    let text = String::from_utf8_lossy(raw);
    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix(DATA_FIELD))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();

    if data.is_empty() {
        debug!("Skipping stream record without data field: {:?}", text);
        return None;
    }
    let payload = data.join("\n");
    if payload.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<StreamEvent>(&payload) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Failed to decode stream record: {}", e);
            debug!("Problematic record: {}", payload);
            None
        }
    }
}
