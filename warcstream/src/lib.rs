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

//! Streaming WARC reader and writer.
//!
//! Input is consumed chunk by chunk. Chunks are split into CRLF-terminated
//! lines, lines are grouped into records by [`RecordAssembler`], and every
//! completed record is turned into a typed [`Record`]. Plain and gzip
//! compressed input are detected from the first three bytes.
//!
//! ```no_run
//! use warcstream::{Record, WarcReader};
//!
//! # fn main() -> warcstream::Result<()> {
//! for record in WarcReader::open("crawl.warc.gz")? {
//!     if let Record::Response { header, http, body } = record? {
//!         println!("{:?} {:?} {}", header.target_uri(), http.status(), body.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`WarcWriter`] produces records with correct `Content-Length`, linked
//! record IDs and optional per-record gzip compression.

pub mod assembler;
pub mod error;
pub mod gzip;
pub mod header;
pub mod http;
pub mod reader;
pub mod record;
pub mod splitter;
pub mod writer;

pub use assembler::{ParseState, RawRecordParts, RecordAssembler};
pub use error::{Result, WarcError};
pub use header::{parse_warc_header, FieldValue, Fields, WarcHeader};
pub use http::{HeaderEncoding, HeaderMap, RequestHttp, ResponseHttp};
pub use reader::{ReaderOptions, RecordStream, WarcReader};
pub use record::{parse_warc_fields, Record, WarcFields};
pub use splitter::LineSplitter;
pub use writer::{warc_path, HttpMessage, WarcInfo, WarcWriter, WriterContext, WriterOptions};

#[cfg(feature = "async")]
pub use reader::AsyncWarcReader;
#[cfg(feature = "async")]
pub use writer::AsyncWarcWriter;

/// WARC record type enum.
///
/// Discriminants are bit flags, so several types can be combined into a
/// filter mask for [`ReaderOptions::with_record_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarcRecordType {
    WarcInfo = 2,
    Response = 4,
    Resource = 8,
    Request = 16,
    Metadata = 32,
    Revisit = 64,
    Conversion = 128,
    Continuation = 256,
    Unknown = 512,
    AnyType = 65535,
    NoType = 0,
}

impl WarcRecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarcRecordType::WarcInfo => "warcinfo",
            WarcRecordType::Response => "response",
            WarcRecordType::Resource => "resource",
            WarcRecordType::Request => "request",
            WarcRecordType::Metadata => "metadata",
            WarcRecordType::Revisit => "revisit",
            WarcRecordType::Conversion => "conversion",
            WarcRecordType::Continuation => "continuation",
            _ => "unknown",
        }
    }

    pub fn matches_bitmask(&self, bitmask: u16) -> bool {
        (*self as u16) & bitmask != 0
    }
}

impl TryFrom<u16> for WarcRecordType {
    type Error = &'static str;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        match value {
            2 => Ok(WarcRecordType::WarcInfo),
            4 => Ok(WarcRecordType::Response),
            8 => Ok(WarcRecordType::Resource),
            16 => Ok(WarcRecordType::Request),
            32 => Ok(WarcRecordType::Metadata),
            64 => Ok(WarcRecordType::Revisit),
            128 => Ok(WarcRecordType::Conversion),
            256 => Ok(WarcRecordType::Continuation),
            512 => Ok(WarcRecordType::Unknown),
            65535 => Ok(WarcRecordType::AnyType),
            0 => Ok(WarcRecordType::NoType),
            _ => Err("invalid record type value"),
        }
    }
}

impl TryFrom<&str> for WarcRecordType {
    type Error = &'static str;

    /// Parse a `WARC-Type` value (case-insensitive).
    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "warcinfo" => Ok(WarcRecordType::WarcInfo),
            "response" => Ok(WarcRecordType::Response),
            "resource" => Ok(WarcRecordType::Resource),
            "request" => Ok(WarcRecordType::Request),
            "metadata" => Ok(WarcRecordType::Metadata),
            "revisit" => Ok(WarcRecordType::Revisit),
            "conversion" => Ok(WarcRecordType::Conversion),
            "continuation" => Ok(WarcRecordType::Continuation),
            _ => Err("unrecognized record type"),
        }
    }
}

impl From<WarcRecordType> for &'static str {
    fn from(value: WarcRecordType) -> Self {
        value.as_str()
    }
}
