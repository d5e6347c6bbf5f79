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

//! Chunk-boundary safe `CRLF` line splitting.

/// WARC line separator.
pub const CRLF: &[u8] = b"\r\n";

/// Splits an arbitrarily chunked byte stream into `CRLF` terminated lines.
///
/// Lines are yielded including their trailing separator, so every line except
/// a final unterminated fragment (see [`LineSplitter::flush`]) ends in `CRLF`.
/// A separator split across two chunks is found just like one that arrives in
/// a single chunk.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buf: Vec<u8>,
    // Start of the first unconsumed byte in `buf`.
    start: usize,
    // Position up to which `buf` is known not to contain a separator start.
    scanned: usize,
}

impl LineSplitter {
    /// Create a new, empty line splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return a lazy iterator over all lines completed so far.
    ///
    /// Dropping the iterator early is fine, remaining lines stay buffered and
    /// are returned by later calls to [`LineSplitter::next_line`] or `feed`.
    ///
    /// # Arguments
    ///
    /// * `chunk` - Next chunk of input bytes
    pub fn feed(&mut self, chunk: &[u8]) -> Lines<'_> {
        self.push(chunk);
        Lines { splitter: self }
    }

    /// Append a chunk without consuming any lines.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.start > 0 && self.start >= self.buf.len() / 2 {
            self.buf.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// Pop the next complete line from the buffer.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        // A separator may begin on the last byte scanned previously.
        let from = self.scanned.max(self.start);
        let haystack = &self.buf[from..];
        match haystack.windows(CRLF.len()).position(|w| w == CRLF) {
            Some(pos) => {
                let end = from + pos + CRLF.len();
                let line = self.buf[self.start..end].to_vec();
                self.start = end;
                self.scanned = end;
                Some(line)
            }
            None => {
                self.scanned = self.buf.len().saturating_sub(CRLF.len() - 1).max(self.start);
                None
            }
        }
    }

    /// Take the trailing unterminated fragment at end of stream.
    ///
    /// Returns `None` if no bytes are left over.
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        let rest = self.buf.split_off(self.start);
        self.buf.clear();
        self.start = 0;
        self.scanned = 0;
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    /// Number of buffered bytes not yet returned as a line.
    pub fn residual_len(&self) -> usize {
        self.buf.len() - self.start
    }
}

/// Lazy iterator over the lines completed by [`LineSplitter::feed`].
#[derive(Debug)]
pub struct Lines<'a> {
    splitter: &'a mut LineSplitter,
}

impl Iterator for Lines<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.splitter.next_line()
    }
}
