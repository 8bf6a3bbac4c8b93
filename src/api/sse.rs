//! Minimal `text/event-stream` reader.
//!
//! Only `event:` and `data:` fields matter to the burner server; `id:`,
//! `retry:` and comment lines are skipped. An event is emitted on the blank
//! line that terminates it, so a frame cut off by a dropped connection is
//! never surfaced.

use std::io::{self, BufRead};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event name; `message` when the frame had no `event:` line.
    pub event: String,
    pub data: String,
}

pub struct SseReader<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> SseReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for SseReader<R> {
    type Item = io::Result<SseEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut event: Option<String> = None;
        let mut data: Vec<String> = Vec::new();

        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }

            let line = self.line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                if event.is_none() && data.is_empty() {
                    continue;
                }
                return Some(Ok(SseEvent {
                    event: event.unwrap_or_else(|| "message".to_string()),
                    data: data.join("\n"),
                }));
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
                None => (line, ""),
            };
            match field {
                "event" => event = Some(value.to_string()),
                "data" => data.push(value.to_string()),
                _ => {}
            }
        }
    }
}
