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

//! Gzip transport framing.
//!
//! WARC files are either plain or gzip compressed, usually with one gzip
//! member per record so that single records can be decompressed from an
//! offset. Compression itself is handled by `flate2`.

use std::io::{self, Write};

use flate2::write::{GzEncoder, MultiGzDecoder};
use flate2::Compression;

/// Gzip magic number including the deflate method byte.
pub const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Check whether a buffer starts with the gzip magic number.
pub fn is_gzip(magic: &[u8]) -> bool {
    magic.starts_with(&GZIP_MAGIC)
}

/// Compress a fully assembled record into a single gzip member.
pub fn gzip_member(record: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(record.len() / 2 + 64), Compression::default());
    encoder.write_all(record)?;
    encoder.finish()
}

/// Turns chunks of a possibly compressed stream into plain chunks.
///
/// Gzip input may consist of any number of concatenated members.
pub enum ChunkDecoder {
    Plain,
    Gzip(MultiGzDecoder<Vec<u8>>),
}

impl ChunkDecoder {
    /// Pick a decoder based on the first bytes of the stream.
    pub fn detect(magic: &[u8]) -> Self {
        if is_gzip(magic) {
            tracing::debug!("gzip compressed input detected");
            ChunkDecoder::Gzip(MultiGzDecoder::new(Vec::new()))
        } else {
            ChunkDecoder::Plain
        }
    }

    pub fn is_gzip(&self) -> bool {
        matches!(self, ChunkDecoder::Gzip(_))
    }

    /// Decode a chunk and pass the plain bytes on to `sink`.
    pub fn decode<F: FnMut(&[u8])>(&mut self, chunk: &[u8], mut sink: F) -> io::Result<()> {
        match self {
            ChunkDecoder::Plain => sink(chunk),
            ChunkDecoder::Gzip(decoder) => {
                decoder.write_all(chunk)?;
                let out = decoder.get_mut();
                if !out.is_empty() {
                    sink(out.as_slice());
                    out.clear();
                }
            }
        }
        Ok(())
    }

    /// Flush remaining plain bytes at end of input.
    pub fn finish<F: FnMut(&[u8])>(&mut self, mut sink: F) -> io::Result<()> {
        if let ChunkDecoder::Gzip(decoder) = self {
            decoder.try_finish()?;
            let out = decoder.get_mut();
            if !out.is_empty() {
                sink(out.as_slice());
                out.clear();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_gzip() {
        assert!(is_gzip(&[0x1f, 0x8b, 0x08, 0x00]));
        assert!(!is_gzip(b"WARC/1.0"));
        assert!(!is_gzip(&[0x1f, 0x8b]));
    }

    #[test]
    fn test_members_decode_as_one_stream() {
        let mut compressed = gzip_member(b"first record\r\n").unwrap();
        compressed.extend(gzip_member(b"second record\r\n").unwrap());
        assert!(is_gzip(&compressed));

        let mut decoder = ChunkDecoder::detect(&compressed[..3]);
        assert!(decoder.is_gzip());
        let mut plain = Vec::new();
        for chunk in compressed.chunks(7) {
            decoder.decode(chunk, |b| plain.extend_from_slice(b)).unwrap();
        }
        decoder.finish(|b| plain.extend_from_slice(b)).unwrap();
        assert_eq!(plain, b"first record\r\nsecond record\r\n");
    }

    #[test]
    fn test_plain_passthrough() {
        let mut decoder = ChunkDecoder::detect(b"WAR");
        let mut plain = Vec::new();
        decoder.decode(b"WARC/1.0\r\n", |b| plain.extend_from_slice(b)).unwrap();
        decoder.finish(|b| plain.extend_from_slice(b)).unwrap();
        assert_eq!(plain, b"WARC/1.0\r\n");
    }
}
