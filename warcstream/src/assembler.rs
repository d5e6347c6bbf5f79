// Copyright 2025 Janek Bevendorff
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Line-driven WARC record assembly.
//!
//! The assembler receives `CRLF` terminated lines from a
//! [`LineSplitter`](crate::splitter::LineSplitter) and sorts them into three
//! buckets: the WARC header, the first content section (HTTP header block or
//! plain content) and the second content section (HTTP body). A line starting
//! with `WARC/<digit>` always starts a new record, whatever state the previous
//! record was left in.

use std::mem;

use crate::header::parse_warc_header;
use crate::record::Record;
use crate::splitter::CRLF;

/// End of record marker that follows every record block.
const RECORD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    #[default]
    Header,
    ConsumeSepAfterHeader,
    Content1,
    ConsumeSepAfterContent1,
    Content2,
    ConsumeSepAfterContent2,
}

/// Raw lines of a single record, sorted into sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecordParts {
    pub header: Vec<Vec<u8>>,
    pub content1: Vec<Vec<u8>>,
    pub content2: Vec<Vec<u8>>,
    // Whether an empty line ended the first content section.
    content1_closed: bool,
    // Empty lines seen after the second content section, not yet known to be
    // part of it.
    pending: usize,
}

impl RawRecordParts {
    fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    fn segments(&self) -> impl DoubleEndedIterator<Item = &[u8]> {
        let sep: &[u8] = if self.content1_closed { CRLF } else { b"" };
        self.content1
            .iter()
            .map(Vec::as_slice)
            .chain(std::iter::once(sep))
            .chain(self.body_segments())
    }

    fn body_segments(&self) -> impl DoubleEndedIterator<Item = &[u8]> {
        self.content2
            .iter()
            .map(Vec::as_slice)
            .chain(std::iter::repeat_n(CRLF, self.pending))
    }

    /// Whether the record block is followed by a complete record terminator.
    pub fn is_terminated(&self) -> bool {
        ends_with(self.segments(), RECORD_TERMINATOR)
    }

    /// The whole record block as one buffer, without the record terminator.
    pub fn block(&self) -> Vec<u8> {
        concat_without_terminator(self.segments())
    }

    /// The second content section as one buffer, without the record terminator.
    pub fn body(&self) -> Vec<u8> {
        concat_without_terminator(self.body_segments())
    }

    /// Both content sections line by line, including the empty lines between them.
    ///
    /// The empty line closing the first section stays in `content1`, trailing
    /// empty lines go to `content2`. Concatenating both yields the record block
    /// followed by whatever part of the record terminator was read.
    pub fn into_content(mut self) -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
        if self.content1_closed {
            self.content1.push(CRLF.to_vec());
        }
        self.content2.extend(std::iter::repeat_n(CRLF.to_vec(), self.pending));
        (self.content1, self.content2)
    }
}

fn ends_with<'a>(segments: impl DoubleEndedIterator<Item = &'a [u8]>, suffix: &[u8]) -> bool {
    let mut need = suffix.len();
    for seg in segments.rev() {
        let take = seg.len().min(need);
        if seg[seg.len() - take..] != suffix[need - take..need] {
            return false;
        }
        need -= take;
        if need == 0 {
            return true;
        }
    }
    need == 0
}

fn concat_without_terminator<'a>(segments: impl Iterator<Item = &'a [u8]>) -> Vec<u8> {
    let mut buf = segments.collect::<Vec<_>>().concat();
    if buf.ends_with(RECORD_TERMINATOR) {
        buf.truncate(buf.len() - RECORD_TERMINATOR.len());
    }
    buf
}

/// Check whether a line begins a new WARC record (`WARC/` followed by a digit).
pub fn is_record_begin(line: &[u8]) -> bool {
    line.strip_prefix(b"WARC/")
        .and_then(|rest| rest.first())
        .is_some_and(u8::is_ascii_digit)
}

/// Record assembly state machine.
#[derive(Debug, Default)]
pub struct RecordAssembler {
    state: ParseState,
    parts: RawRecordParts,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current parser state.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Consume one line.
    ///
    /// Returns the previous record once the begin line of the next record is
    /// seen. Never returns a record for any other line.
    ///
    /// # Arguments
    ///
    /// * `line` - Line including its trailing `CRLF`
    pub fn consume_line(&mut self, line: Vec<u8>) -> Option<Record> {
        if is_record_begin(&line) {
            let record = self.take_record();
            self.parts.header.push(line);
            return record;
        }

        if self.parts.is_empty() {
            if line.as_slice() != CRLF {
                tracing::debug!(len = line.len(), "skipping data outside of a WARC record");
            }
            return None;
        }

        let is_empty_line = line.as_slice() == CRLF;
        let parts = &mut self.parts;

        self.state = match (self.state, is_empty_line) {
            (ParseState::Header, true) => ParseState::ConsumeSepAfterHeader,
            (ParseState::Header, false) => {
                parts.header.push(line);
                ParseState::Header
            }

            (ParseState::ConsumeSepAfterHeader | ParseState::Content1, true) => {
                parts.content1_closed = true;
                ParseState::ConsumeSepAfterContent1
            }
            (ParseState::ConsumeSepAfterHeader | ParseState::Content1, false) => {
                parts.content1.push(line);
                ParseState::Content1
            }

            (ParseState::ConsumeSepAfterContent1 | ParseState::Content2, true) => {
                parts.pending = 1;
                ParseState::ConsumeSepAfterContent2
            }
            (ParseState::ConsumeSepAfterContent1 | ParseState::Content2, false) => {
                parts.content2.push(line);
                ParseState::Content2
            }

            (ParseState::ConsumeSepAfterContent2, true) => {
                parts.pending += 1;
                ParseState::ConsumeSepAfterContent2
            }
            (ParseState::ConsumeSepAfterContent2, false) => {
                // The empty lines were part of the body after all.
                for _ in 0..mem::take(&mut parts.pending) {
                    parts.content2.push(CRLF.to_vec());
                }
                parts.content2.push(line);
                ParseState::Content2
            }
        };
        None
    }

    /// Signal end of stream.
    ///
    /// Returns the last record, which may be incomplete if the stream was
    /// truncated.
    pub fn finish(&mut self) -> Option<Record> {
        self.take_record()
    }

    fn take_record(&mut self) -> Option<Record> {
        let state = mem::take(&mut self.state);
        let mut parts = mem::take(&mut self.parts);
        if parts.is_empty() {
            return None;
        }

        let header = parse_warc_header(&parts.header);
        if !parts.is_terminated() {
            tracing::warn!(
                record_id = ?header.record_id(),
                ?state,
                "WARC record is truncated"
            );
        }
        tracing::debug!(warc_type = ?header.warc_type(), record_id = ?header.record_id(), "record complete");

        parts.header.clear();
        Some(Record::build(header, parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(assembler: &mut RecordAssembler, raw: &[u8]) -> Vec<Record> {
        let mut records = Vec::new();
        for line in raw.split_inclusive(|&b| b == b'\n') {
            records.extend(assembler.consume_line(line.to_vec()));
        }
        records
    }

    #[test]
    fn test_is_record_begin() {
        assert!(is_record_begin(b"WARC/1.0\r\n"));
        assert!(is_record_begin(b"WARC/1.1\r\n"));
        assert!(is_record_begin(b"WARC/0.17\r\n"));
        assert!(!is_record_begin(b"WARC/\r\n"));
        assert!(!is_record_begin(b"WARC-Type: response\r\n"));
        assert!(!is_record_begin(b"HTTP/1.1 200 OK\r\n"));
    }

    #[test]
    fn test_state_transitions() {
        let mut a = RecordAssembler::new();
        assert_eq!(a.state(), ParseState::Header);
        feed(&mut a, b"WARC/1.0\r\nWARC-Type: response\r\n");
        assert_eq!(a.state(), ParseState::Header);
        feed(&mut a, b"\r\n");
        assert_eq!(a.state(), ParseState::ConsumeSepAfterHeader);
        feed(&mut a, b"HTTP/1.1 200 OK\r\n");
        assert_eq!(a.state(), ParseState::Content1);
        feed(&mut a, b"\r\n");
        assert_eq!(a.state(), ParseState::ConsumeSepAfterContent1);
        feed(&mut a, b"body\r\n");
        assert_eq!(a.state(), ParseState::Content2);
        feed(&mut a, b"\r\n");
        assert_eq!(a.state(), ParseState::ConsumeSepAfterContent2);
        let records = feed(&mut a, b"WARC/1.0\r\n");
        assert_eq!(records.len(), 1);
        assert_eq!(a.state(), ParseState::Header);
    }

    #[test]
    fn test_record_emitted_on_next_begin_line() {
        let mut a = RecordAssembler::new();
        let raw = b"WARC/1.0\r\nWARC-Type: resource\r\nContent-Length: 3\r\n\r\nabc\r\n\r\n";
        assert!(feed(&mut a, raw).is_empty());
        let records = feed(&mut a, b"WARC/1.0\r\nWARC-Type: resource\r\n\r\nxyz\r\n\r\n");
        assert_eq!(records.len(), 1);
        match &records[0] {
            Record::Resource { content, .. } => assert_eq!(content, b"abc"),
            other => panic!("unexpected record {:?}", other),
        }
        match a.finish() {
            Some(Record::Resource { content, .. }) => assert_eq!(content, b"xyz"),
            other => panic!("unexpected record {:?}", other),
        }
        assert!(a.finish().is_none());
    }

    #[test]
    fn test_body_with_empty_lines_is_exact() {
        let body = b"line1\r\n\r\n\r\nline2\r\n";
        let mut raw = b"WARC/1.0\r\nWARC-Type: response\r\n\r\nHTTP/1.1 200 OK\r\n\r\n".to_vec();
        raw.extend_from_slice(body);
        raw.extend_from_slice(b"\r\n\r\n");
        let mut a = RecordAssembler::new();
        feed(&mut a, &raw);
        match a.finish() {
            Some(Record::Response { body: parsed, .. }) => assert_eq!(parsed, body),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_empty_block() {
        let mut a = RecordAssembler::new();
        feed(&mut a, b"WARC/1.0\r\nWARC-Type: resource\r\nContent-Length: 0\r\n\r\n\r\n\r\n");
        match a.finish() {
            Some(Record::Resource { content, .. }) => assert!(content.is_empty()),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_truncated_record_still_emitted() {
        let mut a = RecordAssembler::new();
        feed(&mut a, b"WARC/1.0\r\nWARC-Type: resource\r\n\r\npartial con");
        match a.finish() {
            Some(Record::Resource { content, .. }) => assert_eq!(content, b"partial con"),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_truncated_header_preempted() {
        let mut a = RecordAssembler::new();
        let records = feed(
            &mut a,
            b"WARC/1.0\r\nWARC-Type: request\r\nWARC/1.0\r\nWARC-Type: resource\r\n\r\nok\r\n\r\n",
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type(), crate::WarcRecordType::Request);
        assert_eq!(a.finish().map(|r| r.record_type()), Some(crate::WarcRecordType::Resource));
    }

    #[test]
    fn test_leading_garbage_skipped() {
        let mut a = RecordAssembler::new();
        let records = feed(&mut a, b"\r\ngarbage\r\nWARC/1.0\r\nWARC-Type: resource\r\n\r\n");
        assert!(records.is_empty());
        let record = a.finish().unwrap();
        assert_eq!(record.header().version(), "1.0");
    }

    #[test]
    fn test_parts_block_and_body() {
        let parts = RawRecordParts {
            header: Vec::new(),
            content1: vec![b"GET / HTTP/1.1\r\n".to_vec()],
            content2: vec![b"a=1\r\n".to_vec()],
            content1_closed: true,
            pending: 1,
        };
        assert!(parts.is_terminated());
        assert_eq!(parts.block(), b"GET / HTTP/1.1\r\n\r\na=1");
        assert_eq!(parts.body(), b"a=1");
    }

    #[test]
    fn test_into_content_is_lossless() {
        let mut a = RecordAssembler::new();
        feed(&mut a, b"WARC/1.0\r\nWARC-Type: x-custom\r\n\r\nfirst\r\n\r\nsecond\r\n\r\n\r\n");
        let Some(Record::Unknown { content1, content2, .. }) = a.finish() else {
            panic!("expected unknown record");
        };
        assert_eq!(content1, vec![b"first\r\n".to_vec(), b"\r\n".to_vec()]);
        assert_eq!(content2, vec![b"second\r\n".to_vec(), b"\r\n".to_vec(), b"\r\n".to_vec()]);
        let joined = [content1.concat(), content2.concat()].concat();
        assert_eq!(joined, b"first\r\n\r\nsecond\r\n\r\n\r\n");
        assert_eq!(&joined[..joined.len() - RECORD_TERMINATOR.len()], b"first\r\n\r\nsecond");
    }
}
