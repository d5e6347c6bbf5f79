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

//! Typed WARC records and the record factory.

use crate::assembler::RawRecordParts;
use crate::header::{split_field, trim_crlf, FieldValue, Fields, WarcHeader};
use crate::http::{parse_request, parse_response, RequestHttp, ResponseHttp};
use crate::splitter::CRLF;
use crate::WarcRecordType;

/// Key collecting `application/warc-fields` lines without a `": "` separator.
pub const UNKEYED: &str = "unkeyed";

/// Key whose values are always collected into a list.
pub const OUTLINK: &str = "outlink";

/// Parsed `application/warc-fields` content of `warcinfo` and `metadata` records.
pub type WarcFields = Fields;

/// A parsed WARC record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    WarcInfo {
        header: WarcHeader,
        content: WarcFields,
    },
    Metadata {
        header: WarcHeader,
        content: WarcFields,
    },
    Request {
        header: WarcHeader,
        http: RequestHttp,
        /// Request body, only retained for `POST` requests.
        post_body: Option<Vec<u8>>,
    },
    Response {
        header: WarcHeader,
        /// Empty for `text/dns` records.
        http: ResponseHttp,
        body: Vec<u8>,
    },
    Revisit {
        header: WarcHeader,
        http: ResponseHttp,
    },
    Resource {
        header: WarcHeader,
        content: Vec<u8>,
    },
    Conversion {
        header: WarcHeader,
        content: Vec<u8>,
    },
    Continuation {
        header: WarcHeader,
        content: Vec<u8>,
    },
    /// Record with a missing or unrecognized `WARC-Type`.
    ///
    /// The content sections are kept line by line exactly as read, including
    /// the empty lines that separate them.
    Unknown {
        header: WarcHeader,
        content1: Vec<Vec<u8>>,
        content2: Vec<Vec<u8>>,
    },
}

impl Record {
    /// WARC header shared by all record types.
    pub fn header(&self) -> &WarcHeader {
        match self {
            Record::WarcInfo { header, .. }
            | Record::Metadata { header, .. }
            | Record::Request { header, .. }
            | Record::Response { header, .. }
            | Record::Revisit { header, .. }
            | Record::Resource { header, .. }
            | Record::Conversion { header, .. }
            | Record::Continuation { header, .. }
            | Record::Unknown { header, .. } => header,
        }
    }

    /// Record type of this variant.
    pub fn record_type(&self) -> WarcRecordType {
        match self {
            Record::WarcInfo { .. } => WarcRecordType::WarcInfo,
            Record::Metadata { .. } => WarcRecordType::Metadata,
            Record::Request { .. } => WarcRecordType::Request,
            Record::Response { .. } => WarcRecordType::Response,
            Record::Revisit { .. } => WarcRecordType::Revisit,
            Record::Resource { .. } => WarcRecordType::Resource,
            Record::Conversion { .. } => WarcRecordType::Conversion,
            Record::Continuation { .. } => WarcRecordType::Continuation,
            Record::Unknown { .. } => WarcRecordType::Unknown,
        }
    }

    /// Bare record ID (same as `header().record_id()`).
    pub fn record_id(&self) -> Option<&str> {
        self.header().record_id()
    }

    /// Target URI (same as `header().target_uri()`).
    pub fn target_uri(&self) -> Option<&str> {
        self.header().target_uri()
    }

    /// Build a typed record from a parsed header and the raw content sections.
    ///
    /// Dispatches on `WARC-Type`. Unknown or missing types produce
    /// [`Record::Unknown`] so that no content is lost.
    pub fn build(header: WarcHeader, parts: RawRecordParts) -> Record {
        let record_type = header
            .warc_type()
            .and_then(|t| WarcRecordType::try_from(t).ok())
            .unwrap_or(WarcRecordType::Unknown);

        match record_type {
            WarcRecordType::WarcInfo => Record::WarcInfo {
                content: parse_warc_fields(&parts.block()),
                header,
            },
            WarcRecordType::Metadata => Record::Metadata {
                content: parse_warc_fields(&parts.block()),
                header,
            },
            WarcRecordType::Request => {
                let http = parse_request(&parts.content1);
                let post_body = http
                    .method
                    .as_deref()
                    .filter(|m| m.eq_ignore_ascii_case("POST"))
                    .map(|_| parts.body());
                Record::Request {
                    header,
                    http,
                    post_body,
                }
            }
            WarcRecordType::Response => {
                if is_dns(&header) {
                    Record::Response {
                        http: ResponseHttp::default(),
                        body: parts.block(),
                        header,
                    }
                } else {
                    Record::Response {
                        http: parse_response(&parts.content1),
                        body: parts.body(),
                        header,
                    }
                }
            }
            WarcRecordType::Revisit => Record::Revisit {
                http: parse_response(&parts.content1),
                header,
            },
            WarcRecordType::Resource => Record::Resource {
                content: parts.block(),
                header,
            },
            WarcRecordType::Conversion => Record::Conversion {
                content: parts.block(),
                header,
            },
            WarcRecordType::Continuation => Record::Continuation {
                content: parts.block(),
                header,
            },
            _ => {
                tracing::debug!(warc_type = ?header.warc_type(), "unrecognized WARC-Type");
                let (content1, content2) = parts.into_content();
                Record::Unknown {
                    header,
                    content1,
                    content2,
                }
            }
        }
    }
}

fn is_dns(header: &WarcHeader) -> bool {
    header
        .content_type()
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|ct| ct.trim().eq_ignore_ascii_case("text/dns"))
}

/// Parse `application/warc-fields` content.
///
/// Each line is split on the first `": "`. Lines without a separator are
/// collected under [`UNKEYED`], and [`OUTLINK`] values always form a list.
pub fn parse_warc_fields(content: &[u8]) -> WarcFields {
    let mut fields = WarcFields::new();
    for line in content.split_inclusive(|&b| b == b'\n') {
        let line = trim_crlf(line);
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        match split_field(line) {
            Some((key, value)) => {
                let key = String::from_utf8_lossy(key).trim().to_string();
                let value = String::from_utf8_lossy(value).trim().to_string();
                if key == OUTLINK {
                    fields.append_list(key, value);
                } else {
                    fields.append(key, value);
                }
            }
            None => fields.append_list(UNKEYED, String::from_utf8_lossy(line).to_string()),
        }
    }
    fields
}

/// Render fields as `application/warc-fields` content.
pub(crate) fn render_warc_fields<'a>(
    fields: impl IntoIterator<Item = (&'a str, &'a FieldValue)>,
) -> Vec<u8> {
    let mut out = Vec::new();
    for (key, value) in fields {
        for v in value.values() {
            out.extend_from_slice(key.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(v.as_bytes());
            out.extend_from_slice(CRLF);
        }
    }
    out
}
