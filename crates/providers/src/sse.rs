/// SSE (Server-Sent Events) parser for streaming provider responses.
///
/// SSE format: events separated by a blank line, each containing optional `event:`
/// and `data:` lines. Bytes are buffered undecoded so a multi-byte character split
/// across two network chunks is decoded intact.

/// A single parsed SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The `event:` field, if present.
    pub event: Option<String>,
    /// The `data:` field content, multiple lines joined with `\n`.
    pub data: String,
}

/// Incremental SSE parser that buffers incomplete events across chunk boundaries.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    /// Bytes already searched for a separator
    scanned: usize,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes from the HTTP response. Returns any complete SSE events found.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some((end, consumed)) = find_boundary(&self.buffer, self.scanned) {
            let block: Vec<u8> = self.buffer.drain(..consumed).take(end).collect();
            self.scanned = 0;
            if let Some(event) = parse_block(&String::from_utf8_lossy(&block)) {
                events.push(event);
            }
        }
        // A separator can straddle the next chunk by at most two bytes
        self.scanned = self.buffer.len().saturating_sub(2);
        events
    }

    /// Flush a trailing event the server did not terminate with a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        parse_block(&String::from_utf8_lossy(&rest))
    }
}

/// End of the first event block at or after `from`, and how many bytes the block
/// plus its blank-line separator occupy. Line endings may be `\n` or `\r\n`, mixed.
fn find_boundary(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let start = from.min(buf.len());
    buf[start..]
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'\n')
        .find_map(|(offset, _)| {
            let i = start + offset;
            let rest = &buf[i + 1..];
            if rest.starts_with(b"\n") {
                Some((i, i + 2))
            } else if rest.starts_with(b"\r\n") {
                Some((i, i + 3))
            } else {
                None
            }
        })
}

fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event_type: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in block.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(val) = line.strip_prefix("event:") {
            event_type = Some(val.trim().to_string());
        } else if let Some(val) = line.strip_prefix("data:") {
            data_lines.push(val.strip_prefix(' ').unwrap_or(val));
        }
        // id:, retry: and `:` comments are ignored
    }

    if data_lines.is_empty() {
        return None;
    }
    Some(SseEvent {
        event: event_type,
        data: data_lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sse() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: hello\n\ndata: world\n\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "hello");
        assert_eq!(events[1].data, "world");
    }

    #[test]
    fn test_crlf_separators() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"event: chunk\r\ndata: {\"a\":1}\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.as_deref(), Some("chunk"));
        assert_eq!(events[0].data, "{\"a\":1}");
    }

    #[test]
    fn test_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: hel").is_empty());
        let events = parser.feed(b"lo\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "hello");
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let payload = "data: 你好\n\n".as_bytes();
        // Cut inside the three-byte encoding of '你'
        let (head, tail) = payload.split_at(7);

        let mut parser = SseParser::new();
        assert!(parser.feed(head).is_empty());
        let events = parser.feed(tail);
        assert_eq!(events[0].data, "你好");
    }

    #[test]
    fn test_mixed_line_endings() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: a\r\n\ndata: b\n\r\ndata: c\n\n");
        let data: Vec<_> = events.into_iter().map(|e| e.data).collect();
        assert_eq!(data, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_separator_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: x\r\n").is_empty());
        assert!(parser.feed(b"\r").is_empty());
        let events = parser.feed(b"\ndata: y");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "x");
        assert_eq!(parser.finish().map(|e| e.data), Some("y".to_string()));
    }

    #[test]
    fn test_large_event_in_small_chunks() {
        let payload = format!("data: {}\n\n", "x".repeat(10_000));
        let mut parser = SseParser::new();
        let mut events = Vec::new();
        for chunk in payload.as_bytes().chunks(7) {
            events.extend(parser.feed(chunk));
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data.len(), 10_000);
    }

    #[test]
    fn test_comments_only_block_is_skipped() {
        let mut parser = SseParser::new();
        let events = parser.feed(b": keep-alive\n\ndata: x\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "x");
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: tail").is_empty());
        assert_eq!(parser.finish().map(|e| e.data), Some("tail".to_string()));
        assert_eq!(parser.finish(), None);
    }
}
