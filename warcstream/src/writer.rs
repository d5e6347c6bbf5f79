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

//! WARC record serialization.
//!
//! Every record is assembled completely in memory before it is handed to the
//! sink, so a record is either written as a whole (and optionally compressed
//! into its own gzip member) or the write fails with the sink's error.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use base64::prelude::{Engine, BASE64_STANDARD};
use chrono::{DateTime, Utc};
use sha1::{Digest, Sha1};
use uuid::Uuid;

use crate::error::{Result, WarcError};
use crate::gzip::gzip_member;
use crate::header::FieldValue;
use crate::http::{HeaderEncoding, HeaderMap};
use crate::record::{render_warc_fields, WarcFields, OUTLINK};
use crate::splitter::CRLF;
use crate::WarcRecordType;

const HTTP_HEADER_END: &[u8] = b"\r\n\r\n";
const RECORD_END: &[u8] = b"\r\n\r\n";

/// Record writer configuration.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Append to an existing file instead of truncating it.
    pub appending: bool,
    /// Compress every record into its own gzip member.
    pub gzip: bool,
    /// Version written on the record begin line.
    pub warc_version: String,
    /// Value of the `software` field of warcinfo records.
    pub software: String,
    /// Add `WARC-Block-Digest` and `WARC-Payload-Digest` fields.
    pub digests: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            appending: false,
            gzip: false,
            warc_version: "1.0".to_string(),
            software: concat!("warcstream/", env!("CARGO_PKG_VERSION")).to_string(),
            digests: true,
        }
    }
}

impl WriterOptions {
    pub fn with_appending(mut self, appending: bool) -> Self {
        self.appending = appending;
        self
    }

    pub fn with_warc_version(mut self, warc_version: impl Into<String>) -> Self {
        self.warc_version = warc_version.into();
        self
    }

    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    pub fn with_software(mut self, software: impl Into<String>) -> Self {
        self.software = software.into();
        self
    }

    pub fn with_digests(mut self, digests: bool) -> Self {
        self.digests = digests;
        self
    }
}

/// Descriptive fields for a warcinfo record.
#[derive(Debug, Clone, Default)]
pub struct WarcInfo {
    pub is_part_of: Option<String>,
    pub description: Option<String>,
    pub user_agent: Option<String>,
    /// Additional fields appended after the standard ones.
    pub extra: Vec<(String, String)>,
}

/// One side of a captured HTTP exchange.
#[derive(Debug, Clone, Copy)]
pub struct HttpMessage<'a> {
    /// Request/status line and headers, ideally ending in an empty line.
    pub header_text: &'a str,
    pub body: Option<&'a [u8]>,
}

impl<'a> HttpMessage<'a> {
    pub fn new(header_text: &'a str, body: Option<&'a [u8]>) -> Self {
        HttpMessage { header_text, body }
    }
}

/// Append the missing `.warc` / `.warc.gz` suffix to a path.
pub fn warc_path(path: impl AsRef<Path>, gzip: bool) -> Result<PathBuf> {
    let path = path.as_ref();
    let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Err(WarcError::invalid_path(path, "path has no file name"));
    };
    let suffix = match (gzip, name.ends_with(".warc.gz"), name.ends_with(".warc")) {
        (true, true, _) | (false, _, true) => "",
        (true, false, true) => ".gz",
        (true, false, false) => ".warc.gz",
        (false, _, false) => ".warc",
    };
    if suffix.is_empty() {
        return Ok(path.to_path_buf());
    }
    Ok(path.with_file_name(format!("{}{}", name, suffix)))
}

fn urn(id: &Uuid) -> String {
    format!("<urn:uuid:{}>", id)
}

fn sha1_digest(data: &[u8]) -> String {
    format!("sha1:{}", BASE64_STANDARD.encode(Sha1::digest(data)))
}

/// Normalize HTTP header text to end in an empty line and append the body.
///
/// Leading empty lines are dropped. Empty header text becomes a single empty
/// line, so the body still starts after a section separator.
///
/// Returns the content block and the offset at which the payload starts.
fn http_block(header_text: &str, body: Option<&[u8]>) -> (Vec<u8>, usize) {
    let body = body.unwrap_or_default();
    let header_text = header_text.trim_start_matches("\r\n");
    let mut block = Vec::with_capacity(header_text.len() + HTTP_HEADER_END.len() + body.len());
    block.extend_from_slice(header_text.as_bytes());
    if block.is_empty() {
        block.extend_from_slice(CRLF);
    } else if !block.ends_with(HTTP_HEADER_END) {
        if block.ends_with(CRLF) {
            block.extend_from_slice(CRLF);
        } else {
            block.extend_from_slice(HTTP_HEADER_END);
        }
    }
    let payload_offset = block.len();
    block.extend_from_slice(body);
    (block, payload_offset)
}

/// Per-file writer state and record serialization.
///
/// The record date is fixed when the context is created and reused for every
/// record. The ID of the first warcinfo record becomes the `WARC-Warcinfo-ID`
/// of all records written after it.
#[derive(Debug, Clone)]
pub struct WriterContext {
    options: WriterOptions,
    now: String,
    filename: Option<String>,
    warcinfo_id: Option<Uuid>,
    last_response_id: Option<Uuid>,
}

impl WriterContext {
    pub fn new(options: WriterOptions, filename: Option<String>) -> Self {
        WriterContext {
            options,
            now: Self::format_date(Utc::now()),
            filename,
            warcinfo_id: None,
            last_response_id: None,
        }
    }

    /// Override the record date.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.now = Self::format_date(date);
        self
    }

    fn format_date(date: DateTime<Utc>) -> String {
        date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// `WARC-Date` used for all records.
    pub fn date(&self) -> &str {
        &self.now
    }

    /// ID of the warcinfo record all other records link to.
    pub fn warcinfo_id(&self) -> Option<Uuid> {
        self.warcinfo_id
    }

    /// Initialize the mandatory leading fields of a record header.
    fn init_headers(&self, record_type: WarcRecordType, record_id: &Uuid, target_uri: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new(HeaderEncoding::Unicode);
        headers.set_status_line(format!("WARC/{}", self.options.warc_version));
        headers.set("WARC-Type", record_type.as_str());
        if let Some(uri) = target_uri {
            headers.set("WARC-Target-URI", uri);
        }
        headers.set("WARC-Date", &self.now);
        headers.set("WARC-Record-ID", urn(record_id));
        headers
    }

    fn link_warcinfo(&self, headers: &mut HeaderMap) {
        if let Some(id) = &self.warcinfo_id {
            headers.set("WARC-Warcinfo-ID", urn(id));
        }
    }

    /// Serialize header and content block, compressing if configured.
    fn finish_record(&self, headers: &mut HeaderMap, block: &[u8]) -> io::Result<Vec<u8>> {
        if self.options.digests {
            headers.set("WARC-Block-Digest", sha1_digest(block));
        }
        headers.set("Content-Length", block.len().to_string());

        let mut record = Vec::with_capacity(block.len() + 512);
        headers.write(&mut record)?;
        record.extend_from_slice(block);
        record.extend_from_slice(RECORD_END);

        if self.options.gzip {
            gzip_member(&record)
        } else {
            Ok(record)
        }
    }

    /// Build a warcinfo record.
    ///
    /// The first warcinfo record defines the `WARC-Warcinfo-ID` for all later records.
    pub fn warcinfo_record(&mut self, info: &WarcInfo) -> io::Result<(Uuid, Vec<u8>)> {
        let id = Uuid::new_v4();
        let mut headers = self.init_headers(WarcRecordType::WarcInfo, &id, None);
        if let Some(filename) = &self.filename {
            headers.set("WARC-Filename", filename);
        }
        headers.set("Content-Type", "application/warc-fields");

        let mut fields = WarcFields::new();
        if let Some(v) = &info.is_part_of {
            fields.append("isPartOf", v.as_str());
        }
        if let Some(v) = &info.description {
            fields.append("description", v.as_str());
        }
        if let Some(v) = &info.user_agent {
            fields.append("http-header-user-agent", v.as_str());
        }
        fields.append("software", self.options.software.as_str());
        fields.append("format", format!("WARC File Format {}", self.options.warc_version));
        fields.append(
            "conformsTo",
            "http://bibnum.bnf.fr/WARC/WARC_ISO_28500_version1_latestdraft.pdf",
        );
        for (key, value) in &info.extra {
            fields.append(key.as_str(), value.as_str());
        }

        let record = self.finish_record(&mut headers, &render_warc_fields(fields.iter()))?;
        if self.warcinfo_id.is_none() {
            self.warcinfo_id = Some(id);
        }
        Ok((id, record))
    }

    fn http_record(
        &self,
        record_type: WarcRecordType,
        id: &Uuid,
        target_uri: &str,
        message: HttpMessage<'_>,
        concurrent_to: Option<&Uuid>,
    ) -> io::Result<Vec<u8>> {
        let mut headers = self.init_headers(record_type, id, Some(target_uri));
        if let Some(other) = concurrent_to {
            headers.set("WARC-Concurrent-To", urn(other));
        }
        self.link_warcinfo(&mut headers);
        headers.set(
            "Content-Type",
            match record_type {
                WarcRecordType::Request => "application/http; msgtype=request",
                _ => "application/http; msgtype=response",
            },
        );

        let (block, payload_offset) = http_block(message.header_text, message.body);
        if self.options.digests {
            headers.set("WARC-Payload-Digest", sha1_digest(&block[payload_offset..]));
        }
        self.finish_record(&mut headers, &block)
    }

    /// Build a request record.
    pub fn request_record(
        &mut self,
        target_uri: &str,
        message: HttpMessage<'_>,
        concurrent_to: Option<&Uuid>,
    ) -> io::Result<(Uuid, Vec<u8>)> {
        let id = Uuid::new_v4();
        let record = self.http_record(WarcRecordType::Request, &id, target_uri, message, concurrent_to)?;
        Ok((id, record))
    }

    /// Build a response record.
    pub fn response_record(&mut self, target_uri: &str, message: HttpMessage<'_>) -> io::Result<(Uuid, Vec<u8>)> {
        let id = Uuid::new_v4();
        let record = self.http_record(WarcRecordType::Response, &id, target_uri, message, None)?;
        self.last_response_id = Some(id);
        Ok((id, record))
    }

    /// Build a request and a response record linked by `WARC-Concurrent-To`.
    ///
    /// The response ID is generated first so that the request can refer to it.
    /// Returns the request record followed by the response record.
    pub fn request_response_records(
        &mut self,
        target_uri: &str,
        request: HttpMessage<'_>,
        response: HttpMessage<'_>,
    ) -> io::Result<[(Uuid, Vec<u8>); 2]> {
        let response = self.response_record(target_uri, response)?;
        let request = self.request_record(target_uri, request, Some(&response.0))?;
        Ok([request, response])
    }

    /// Build a metadata record with `application/warc-fields` content.
    ///
    /// The record is linked to the last response record, if any.
    pub fn metadata_record(&mut self, target_uri: &str, content: &[u8]) -> io::Result<(Uuid, Vec<u8>)> {
        let id = Uuid::new_v4();
        let mut headers = self.init_headers(WarcRecordType::Metadata, &id, Some(target_uri));
        if let Some(other) = &self.last_response_id {
            headers.set("WARC-Concurrent-To", urn(other));
        }
        self.link_warcinfo(&mut headers);
        headers.set("Content-Type", "application/warc-fields");
        let record = self.finish_record(&mut headers, content)?;
        Ok((id, record))
    }
}

/// Render `outlink` fields for a metadata record.
pub fn outlinks_content<S: AsRef<str>>(outlinks: &[S]) -> Vec<u8> {
    let values = FieldValue::List(outlinks.iter().map(|s| s.as_ref().to_string()).collect());
    render_warc_fields([(OUTLINK, &values)])
}

/// WARC writer over a blocking sink.
pub struct WarcWriter<W: Write> {
    sink: W,
    context: WriterContext,
}

impl WarcWriter<BufWriter<File>> {
    /// Create or append to a WARC file.
    ///
    /// A missing `.warc` (or `.warc.gz` for gzip output) suffix is appended
    /// to the path.
    pub fn create(path: impl AsRef<Path>, options: WriterOptions) -> Result<Self> {
        let path = warc_path(path, options.gzip)?;
        tracing::debug!(path = %path.display(), appending = options.appending, gzip = options.gzip, "opening WARC file");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(options.appending)
            .truncate(!options.appending)
            .open(&path)?;
        let filename = path.file_name().map(|n| n.to_string_lossy().into_owned());
        Ok(WarcWriter {
            sink: BufWriter::new(file),
            context: WriterContext::new(options, filename),
        })
    }
}

impl<W: Write> WarcWriter<W> {
    pub fn new(sink: W, options: WriterOptions) -> Self {
        Self::with_context(sink, WriterContext::new(options, None))
    }

    pub fn with_context(sink: W, context: WriterContext) -> Self {
        WarcWriter { sink, context }
    }

    pub fn context(&self) -> &WriterContext {
        &self.context
    }

    /// Write an already serialized record.
    pub fn write_record_block(&mut self, record: &[u8]) -> Result<()> {
        self.sink.write_all(record)?;
        Ok(())
    }

    /// Write a warcinfo record and return its ID.
    pub fn write_warcinfo_record(&mut self, info: &WarcInfo) -> Result<Uuid> {
        let (id, record) = self.context.warcinfo_record(info)?;
        self.write_record_block(&record)?;
        Ok(id)
    }

    /// Write a request record and return its ID.
    pub fn write_request_record(&mut self, target_uri: &str, header_text: &str, body: Option<&[u8]>) -> Result<Uuid> {
        let (id, record) = self.context.request_record(target_uri, HttpMessage::new(header_text, body), None)?;
        self.write_record_block(&record)?;
        Ok(id)
    }

    /// Write a response record and return its ID.
    pub fn write_response_record(&mut self, target_uri: &str, header_text: &str, body: Option<&[u8]>) -> Result<Uuid> {
        let (id, record) = self.context.response_record(target_uri, HttpMessage::new(header_text, body))?;
        self.write_record_block(&record)?;
        Ok(id)
    }

    /// Write a request record followed by its response record.
    ///
    /// Returns the request and response IDs.
    pub fn write_request_response_records(
        &mut self,
        target_uri: &str,
        request: HttpMessage<'_>,
        response: HttpMessage<'_>,
    ) -> Result<(Uuid, Uuid)> {
        let [(req_id, req), (res_id, res)] = self.context.request_response_records(target_uri, request, response)?;
        self.write_record_block(&req)?;
        self.write_record_block(&res)?;
        Ok((req_id, res_id))
    }

    /// Write a metadata record with `application/warc-fields` content.
    pub fn write_warc_metadata(&mut self, target_uri: &str, content: impl AsRef<[u8]>) -> Result<Uuid> {
        let (id, record) = self.context.metadata_record(target_uri, content.as_ref())?;
        self.write_record_block(&record)?;
        Ok(id)
    }

    /// Write a metadata record listing outlinks of a page.
    pub fn write_metadata_outlinks<S: AsRef<str>>(&mut self, target_uri: &str, outlinks: &[S]) -> Result<Uuid> {
        self.write_warc_metadata(target_uri, outlinks_content(outlinks))
    }

    /// Flush all records and return the sink.
    pub fn end(mut self) -> Result<W> {
        self.sink.flush()?;
        tracing::debug!("WARC writer finished");
        Ok(self.sink)
    }
}

#[cfg(feature = "async")]
pub use self::async_writer::AsyncWarcWriter;

#[cfg(feature = "async")]
mod async_writer {
    use std::path::Path;

    use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
    use uuid::Uuid;

    use super::{outlinks_content, warc_path, HttpMessage, WarcInfo, WriterContext, WriterOptions};
    use crate::error::Result;

    /// WARC writer over a tokio [`AsyncWrite`] sink.
    ///
    /// Each write waits until the sink has accepted the whole record.
    pub struct AsyncWarcWriter<W> {
        sink: W,
        context: WriterContext,
    }

    impl AsyncWarcWriter<BufWriter<tokio::fs::File>> {
        /// Create or append to a WARC file.
        pub async fn create(path: impl AsRef<Path>, options: WriterOptions) -> Result<Self> {
            let path = warc_path(path, options.gzip)?;
            let file = tokio::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .append(options.appending)
                .truncate(!options.appending)
                .open(&path)
                .await?;
            let filename = path.file_name().map(|n| n.to_string_lossy().into_owned());
            Ok(AsyncWarcWriter {
                sink: BufWriter::new(file),
                context: WriterContext::new(options, filename),
            })
        }
    }

    impl<W: AsyncWrite + Unpin> AsyncWarcWriter<W> {
        pub fn new(sink: W, options: WriterOptions) -> Self {
            Self::with_context(sink, WriterContext::new(options, None))
        }

        pub fn with_context(sink: W, context: WriterContext) -> Self {
            AsyncWarcWriter { sink, context }
        }

        pub fn context(&self) -> &WriterContext {
            &self.context
        }

        pub async fn write_record_block(&mut self, record: &[u8]) -> Result<()> {
            self.sink.write_all(record).await?;
            Ok(())
        }

        pub async fn write_warcinfo_record(&mut self, info: &WarcInfo) -> Result<Uuid> {
            let (id, record) = self.context.warcinfo_record(info)?;
            self.write_record_block(&record).await?;
            Ok(id)
        }

        pub async fn write_request_record(
            &mut self,
            target_uri: &str,
            header_text: &str,
            body: Option<&[u8]>,
        ) -> Result<Uuid> {
            let (id, record) = self.context.request_record(target_uri, HttpMessage::new(header_text, body), None)?;
            self.write_record_block(&record).await?;
            Ok(id)
        }

        pub async fn write_response_record(
            &mut self,
            target_uri: &str,
            header_text: &str,
            body: Option<&[u8]>,
        ) -> Result<Uuid> {
            let (id, record) = self.context.response_record(target_uri, HttpMessage::new(header_text, body))?;
            self.write_record_block(&record).await?;
            Ok(id)
        }

        pub async fn write_request_response_records(
            &mut self,
            target_uri: &str,
            request: HttpMessage<'_>,
            response: HttpMessage<'_>,
        ) -> Result<(Uuid, Uuid)> {
            let [(req_id, req), (res_id, res)] =
                self.context.request_response_records(target_uri, request, response)?;
            self.write_record_block(&req).await?;
            self.write_record_block(&res).await?;
            Ok((req_id, res_id))
        }

        pub async fn write_warc_metadata(&mut self, target_uri: &str, content: impl AsRef<[u8]>) -> Result<Uuid> {
            let (id, record) = self.context.metadata_record(target_uri, content.as_ref())?;
            self.write_record_block(&record).await?;
            Ok(id)
        }

        pub async fn write_metadata_outlinks<S: AsRef<str>>(&mut self, target_uri: &str, outlinks: &[S]) -> Result<Uuid> {
            self.write_warc_metadata(target_uri, outlinks_content(outlinks)).await
        }

        /// Flush all records and return the sink.
        pub async fn end(mut self) -> Result<W> {
            self.sink.flush().await?;
            Ok(self.sink)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn context(options: WriterOptions) -> WriterContext {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        WriterContext::new(options, None).with_date(date)
    }

    #[test]
    fn test_warc_path() {
        assert_eq!(warc_path("out", false).unwrap(), PathBuf::from("out.warc"));
        assert_eq!(warc_path("out.warc", false).unwrap(), PathBuf::from("out.warc"));
        assert_eq!(warc_path("out", true).unwrap(), PathBuf::from("out.warc.gz"));
        assert_eq!(warc_path("dir/out.warc", true).unwrap(), PathBuf::from("dir/out.warc.gz"));
        assert_eq!(warc_path("out.warc.gz", true).unwrap(), PathBuf::from("out.warc.gz"));
        assert!(matches!(warc_path("/", false), Err(WarcError::InvalidPath { .. })));
    }

    #[test]
    fn test_http_block_normalization() {
        assert_eq!(http_block("GET / HTTP/1.1\r\n\r\n", None).0, b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(http_block("GET / HTTP/1.1\r\n", None).0, b"GET / HTTP/1.1\r\n\r\n");
        let (block, offset) = http_block("GET / HTTP/1.1", Some(b"a=1"));
        assert_eq!(block, b"GET / HTTP/1.1\r\n\r\na=1");
        assert_eq!(&block[offset..], b"a=1");
        let (block, offset) = http_block("", Some(b"abc"));
        assert_eq!(block, b"\r\nabc");
        assert_eq!(offset, 2);
        assert_eq!(http_block("\r\n", None).0, b"\r\n");
    }

    #[test]
    fn test_response_record_bytes() {
        let mut ctx = context(WriterOptions::default().with_digests(false));
        let (id, record) = ctx
            .response_record(
                "http://example.com/",
                HttpMessage::new("HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n", Some(b"hi")),
            )
            .unwrap();
        let expected = format!(
            "WARC/1.0\r\n\
             WARC-Type: response\r\n\
             WARC-Target-URI: http://example.com/\r\n\
             WARC-Date: 2024-03-01T12:30:45Z\r\n\
             WARC-Record-ID: <urn:uuid:{}>\r\n\
             Content-Type: application/http; msgtype=response\r\n\
             Content-Length: 47\r\n\
             \r\n\
             HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhi\
             \r\n\r\n",
            id
        );
        assert_eq!(String::from_utf8(record).unwrap(), expected);
    }

    #[test]
    fn test_warc_version() {
        let mut ctx = context(WriterOptions::default().with_warc_version("1.1"));
        let (_, record) = ctx.warcinfo_record(&WarcInfo::default()).unwrap();
        let record = String::from_utf8(record).unwrap();
        assert!(record.starts_with("WARC/1.1\r\nWARC-Type: warcinfo\r\n"));
        assert!(record.contains("format: WARC File Format 1.1\r\n"));
    }

    #[test]
    fn test_warcinfo_id_set_once() {
        let mut ctx = context(WriterOptions::default());
        assert!(ctx.warcinfo_id().is_none());
        let (first, _) = ctx.warcinfo_record(&WarcInfo::default()).unwrap();
        let (second, _) = ctx.warcinfo_record(&WarcInfo::default()).unwrap();
        assert_ne!(first, second);
        assert_eq!(ctx.warcinfo_id(), Some(first));
    }

    #[test]
    fn test_request_links_to_response() {
        let mut ctx = context(WriterOptions::default());
        let [(_, request), (response_id, _)] = ctx
            .request_response_records(
                "http://example.com/",
                HttpMessage::new("GET / HTTP/1.1\r\n\r\n", None),
                HttpMessage::new("HTTP/1.1 204 No Content\r\n\r\n", None),
            )
            .unwrap();
        let request = String::from_utf8(request).unwrap();
        assert!(request.contains(&format!("WARC-Concurrent-To: <urn:uuid:{}>\r\n", response_id)));
    }

    #[test]
    fn test_digests() {
        let mut ctx = context(WriterOptions::default());
        let (_, record) = ctx
            .response_record("http://example.com/", HttpMessage::new("HTTP/1.1 200 OK\r\n\r\n", Some(b"")))
            .unwrap();
        let record = String::from_utf8(record).unwrap();
        // SHA-1 of the empty payload
        assert!(record.contains("WARC-Payload-Digest: sha1:2jmj7l5rSw0yVb/vlWAYkK/YBwk=\r\n"));
        assert!(record.contains("WARC-Block-Digest: sha1:"));
    }

    #[test]
    fn test_gzip_members() {
        let mut ctx = context(WriterOptions::default().with_gzip(true));
        let (_, record) = ctx.metadata_record("http://example.com/", b"a: b\r\n").unwrap();
        assert!(crate::gzip::is_gzip(&record));
        let mut plain = Vec::new();
        io::Read::read_to_end(&mut flate2::read::GzDecoder::new(record.as_slice()), &mut plain).unwrap();
        assert!(plain.starts_with(b"WARC/1.0\r\nWARC-Type: metadata\r\n"));
        assert!(plain.ends_with(b"\r\n\r\na: b\r\n\r\n\r\n"));
    }

    #[test]
    fn test_outlinks_content() {
        assert_eq!(
            outlinks_content(&["http://a/", "http://b/"]),
            b"outlink: http://a/\r\noutlink: http://b/\r\n"
        );
    }
}
