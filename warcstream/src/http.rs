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

//! HTTP messages embedded in `request`, `response` and `revisit` records.

use std::io;

use encoding::all::WINDOWS_1252;
use encoding::{DecoderTrap, Encoding};

use crate::header::{split_field, trim_crlf};

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum HeaderEncoding {
    Unicode,
    Latin1,
}

/// Insertion-ordered HTTP header block.
///
/// Lookups are case-insensitive. Setting an existing header replaces the
/// value of its first occurrence, so duplicate names end up last-wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    encoding: HeaderEncoding,
    status_line: Vec<u8>,
    headers: Vec<(Vec<u8>, Vec<u8>)>,
    // Index of the most recently set header, target of continuation lines.
    last_set: Option<usize>,
}

impl Default for HeaderMap {
    fn default() -> Self {
        Self::new(HeaderEncoding::Latin1)
    }
}

impl HeaderMap {
    /// Create a new header map with the specified encoding.
    ///
    /// # Arguments
    ///
    /// * `encoding` - Header source encoding
    pub fn new(encoding: HeaderEncoding) -> Self {
        HeaderMap {
            encoding,
            status_line: Vec::new(),
            headers: Vec::new(),
            last_set: None,
        }
    }

    /// Get the header encoding.
    pub fn encoding(&self) -> HeaderEncoding {
        self.encoding
    }

    /// Get the raw request or status line as bytes.
    pub fn status_line_bytes(&self) -> &[u8] {
        &self.status_line
    }

    /// Set request or status line contents.
    pub fn set_status_line(&mut self, status_line: impl AsRef<[u8]>) {
        self.status_line = status_line.as_ref().to_vec();
    }

    fn decode(&self, byte_str: &[u8]) -> String {
        match &self.encoding {
            HeaderEncoding::Unicode => String::from_utf8_lossy(byte_str).to_string(),
            HeaderEncoding::Latin1 => WINDOWS_1252
                .decode(byte_str, DecoderTrap::Replace)
                .unwrap_or_else(|_| String::from_utf8_lossy(byte_str).to_string()),
        }
    }

    /// Get value for (case-insensitive) header key as a string.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_bytes(key.as_bytes()).map(|v| self.decode(v))
    }

    /// Get value for (case-insensitive) header key as bytes.
    pub fn get_bytes(&self, key: &[u8]) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_slice())
    }

    /// Check if a (case-insensitive) header key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get_bytes(key.as_bytes()).is_some()
    }

    /// Insert new header and overwrite an existing header with the same key.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) {
        self.set_bytes(key.as_ref().as_bytes(), value.as_ref().as_bytes());
    }

    /// Insert new header and overwrite an existing header with the same key.
    ///
    /// If a header already exists, its first occurrence will be updated and
    /// all following occurrences will be dropped.
    pub fn set_bytes(&mut self, key: &[u8], value: &[u8]) {
        let key = key.trim_ascii();
        let entry = (key.to_vec(), value.trim_ascii().to_vec());
        let Some(pos) = self.headers.iter().position(|(k, _)| k.eq_ignore_ascii_case(key)) else {
            self.headers.push(entry);
            self.last_set = Some(self.headers.len() - 1);
            return;
        };

        self.headers[pos] = entry;
        let mut idx = 0;
        self.headers.retain(|(k, _)| {
            let keep = idx <= pos || !k.eq_ignore_ascii_case(key);
            idx += 1;
            keep
        });
        self.last_set = Some(pos);
    }

    /// Iterator of keys and values.
    pub fn items(&self) -> impl Iterator<Item = (String, String)> + use<'_> {
        self.headers
            .iter()
            .map(|(k, v)| (self.decode(k), self.decode(v)))
    }

    /// Iterator of header keys.
    pub fn keys(&self) -> impl Iterator<Item = String> + use<'_> {
        self.headers.iter().map(|(k, _)| self.decode(k))
    }

    /// Get the number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Check if the header map is empty.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Write header block into stream.
    ///
    /// The block is terminated by an empty line, so the output can be passed
    /// to the record writer as HTTP header text.
    pub fn write<W: io::Write>(&self, writer: &mut W) -> io::Result<usize> {
        let mut bytes_written = 0usize;
        if !self.status_line.is_empty() {
            writer.write_all(&self.status_line)?;
            writer.write_all(b"\r\n")?;
            bytes_written += self.status_line.len() + 2;
        }
        for (key, value) in &self.headers {
            writer.write_all(key)?;
            writer.write_all(b": ")?;
            writer.write_all(value)?;
            writer.write_all(b"\r\n")?;
            bytes_written += key.len() + value.len() + 4;
        }
        writer.write_all(b"\r\n")?;
        Ok(bytes_written + 2)
    }

    fn add_continuation(&mut self, value: &[u8]) {
        let value = value.trim_ascii();
        if let Some(last) = self.last_set.and_then(|i| self.headers.get_mut(i)) {
            if !last.1.is_empty() {
                last.1.push(b' ');
            }
            last.1.extend_from_slice(value);
        } else {
            tracing::warn!(
                line = %String::from_utf8_lossy(value),
                "HTTP header continuation without preceding header"
            );
        }
    }
}

/// HTTP request line and headers of a `request` record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHttp {
    pub method: Option<String>,
    pub path: Option<String>,
    pub http_version: Option<String>,
    pub headers: HeaderMap,
}

/// HTTP status line and headers of a `response` or `revisit` record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHttp {
    pub http_version: Option<String>,
    /// Status code as it appears on the wire, e.g. `"200"`.
    pub status_code: Option<String>,
    pub status_reason: Option<String>,
    pub headers: HeaderMap,
}

impl ResponseHttp {
    /// Numeric status code, if it is a valid number.
    pub fn status(&self) -> Option<u16> {
        self.status_code.as_deref()?.parse().ok()
    }
}

/// Split a request or status line into its three space separated parts.
///
/// The third part keeps any further spaces (reason phrases contain them).
fn split_first_line(line: &[u8]) -> [Option<String>; 3] {
    let line = trim_crlf(line);
    let mut parts = line.splitn(3, |&b| b == b' ');
    let mut next = || parts.next().map(|p| String::from_utf8_lossy(p).to_string());
    [next(), next(), next()]
}

fn parse_headers<L: AsRef<[u8]>>(lines: &[L]) -> HeaderMap {
    let mut headers = HeaderMap::new(HeaderEncoding::Latin1);
    if let Some(first) = lines.first() {
        headers.set_status_line(trim_crlf(first.as_ref()));
    }
    for line in lines.iter().skip(1) {
        let line = trim_crlf(line.as_ref());
        if line.is_empty() {
            continue;
        }
        match split_field(line) {
            Some((key, value)) => headers.set_bytes(key, value),
            None => headers.add_continuation(line),
        }
    }
    headers
}

/// Parse an HTTP request block.
///
/// # Arguments
///
/// * `lines` - Request line followed by header lines
pub fn parse_request<L: AsRef<[u8]>>(lines: &[L]) -> RequestHttp {
    let Some(first) = lines.first() else {
        return RequestHttp::default();
    };
    let [method, path, http_version] = split_first_line(first.as_ref());
    RequestHttp {
        method,
        path,
        http_version,
        headers: parse_headers(lines),
    }
}

/// Parse an HTTP response block.
///
/// # Arguments
///
/// * `lines` - Status line followed by header lines
pub fn parse_response<L: AsRef<[u8]>>(lines: &[L]) -> ResponseHttp {
    let Some(first) = lines.first() else {
        return ResponseHttp::default();
    };
    let [http_version, status_code, status_reason] = split_first_line(first.as_ref());
    ResponseHttp {
        http_version,
        status_code,
        status_reason,
        headers: parse_headers(lines),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let req = parse_request(&[
            b"GET /index.html?q=a HTTP/1.1\r\n".as_slice(),
            b"Host: example.com\r\n",
            b"Accept: */*\r\n",
        ]);
        assert_eq!(req.method.as_deref(), Some("GET"));
        assert_eq!(req.path.as_deref(), Some("/index.html?q=a"));
        assert_eq!(req.http_version.as_deref(), Some("HTTP/1.1"));
        assert_eq!(req.headers.get("host").as_deref(), Some("example.com"));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn test_parse_response() {
        let res = parse_response(&[
            b"HTTP/1.1 404 Not Found\r\n".as_slice(),
            b"Content-Type: text/html\r\n",
        ]);
        assert_eq!(res.http_version.as_deref(), Some("HTTP/1.1"));
        assert_eq!(res.status_code.as_deref(), Some("404"));
        assert_eq!(res.status(), Some(404));
        assert_eq!(res.status_reason.as_deref(), Some("Not Found"));
        assert_eq!(res.headers.status_line_bytes(), b"HTTP/1.1 404 Not Found");
    }

    #[test]
    fn test_empty_input() {
        let empty: [&[u8]; 0] = [];
        assert_eq!(parse_request(&empty), RequestHttp::default());
        let res = parse_response(&empty);
        assert!(res.status_code.is_none());
        assert!(res.headers.is_empty());
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let res = parse_response(&[
            b"HTTP/1.1 200 OK\r\n".as_slice(),
            b"Set-Cookie: a=1\r\n",
            b"Content-Type: text/plain\r\n",
            b"set-cookie: b=2\r\n",
        ]);
        assert_eq!(res.headers.get("Set-Cookie").as_deref(), Some("b=2"));
        let keys: Vec<_> = res.headers.keys().collect();
        assert_eq!(keys, vec!["set-cookie", "Content-Type"]);
    }

    #[test]
    fn test_continuation_line() {
        let res = parse_response(&[
            b"HTTP/1.1 200 OK\r\n".as_slice(),
            b"X-Long: first part\r\n",
            b"  second part\r\n",
            b"Server: test\r\n",
        ]);
        assert_eq!(res.headers.get("X-Long").as_deref(), Some("first part second part"));
        assert_eq!(res.headers.get("Server").as_deref(), Some("test"));
    }

    #[test]
    fn test_continuation_after_duplicate() {
        let res = parse_response(&[
            b"HTTP/1.1 200 OK\r\n".as_slice(),
            b"X-A: 1\r\n",
            b"X-B: 2\r\n",
            b"x-a: 3\r\n",
            b" wrapped\r\n",
        ]);
        assert_eq!(res.headers.get("X-A").as_deref(), Some("3 wrapped"));
        assert_eq!(res.headers.get("X-B").as_deref(), Some("2"));
        let keys: Vec<_> = res.headers.keys().collect();
        assert_eq!(keys, vec!["x-a", "X-B"]);
    }

    #[test]
    fn test_latin1_header_value() {
        let res = parse_response(&[b"HTTP/1.1 200 OK\r\n".as_slice(), b"X-Name: caf\xe9\r\n"]);
        assert_eq!(res.headers.get("X-Name").as_deref(), Some("café"));
    }

    #[test]
    fn test_write_header_block() {
        let mut headers = HeaderMap::default();
        headers.set_status_line("HTTP/1.1 200 OK");
        headers.set("Content-Type", "text/plain");
        let mut out = Vec::new();
        let n = headers.write(&mut out).unwrap();
        assert_eq!(out, b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n");
        assert_eq!(n, out.len());
    }
}
