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

//! Forward-only WARC record readers.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::assembler::RecordAssembler;
use crate::error::{Result, WarcError};
use crate::gzip::{ChunkDecoder, GZIP_MAGIC};
use crate::record::Record;
use crate::splitter::LineSplitter;
use crate::WarcRecordType;

/// Record reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Number of bytes requested from the source per read.
    pub chunk_size: usize,
    /// Bitmask of record types to return (others will be skipped).
    pub record_types: u16,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            chunk_size: 64 * 1024,
            record_types: WarcRecordType::AnyType as u16,
        }
    }
}

impl ReaderOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Only return records whose type matches the bitmask.
    pub fn with_record_types(mut self, record_types: u16) -> Self {
        self.record_types = record_types;
        self
    }
}

/// Push-based parser pipeline.
///
/// Input chunks go in through [`RecordStream::push`], complete records come
/// out of [`RecordStream::next_record`]. Gzip input is detected from the first
/// three bytes and decompressed on the fly. At most one record is built per
/// call, any remaining lines stay buffered as raw bytes.
pub struct RecordStream {
    decoder: Option<ChunkDecoder>,
    magic: Vec<u8>,
    splitter: LineSplitter,
    assembler: RecordAssembler,
    record_types: u16,
    finished: bool,
}

impl RecordStream {
    pub fn new(options: &ReaderOptions) -> Self {
        RecordStream {
            decoder: None,
            magic: Vec::with_capacity(GZIP_MAGIC.len()),
            splitter: LineSplitter::new(),
            assembler: RecordAssembler::new(),
            record_types: options.record_types,
            finished: false,
        }
    }

    /// Whether enough bytes were pushed to detect the stream compression.
    pub fn magic_detected(&self) -> bool {
        self.decoder.is_some()
    }

    /// Whether the input is gzip compressed (`false` until detected).
    pub fn is_gzip(&self) -> bool {
        self.decoder.as_ref().is_some_and(ChunkDecoder::is_gzip)
    }

    /// Push the next chunk of raw input.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.decode(chunk, |b| self.splitter.push(b))?;
            return Ok(());
        }

        self.magic.extend_from_slice(chunk);
        if self.magic.len() >= GZIP_MAGIC.len() {
            let magic = std::mem::take(&mut self.magic);
            let mut decoder = ChunkDecoder::detect(&magic[..GZIP_MAGIC.len()]);
            decoder.decode(&magic, |b| self.splitter.push(b))?;
            self.decoder = Some(decoder);
        }
        Ok(())
    }

    /// Signal end of input.
    ///
    /// Fails if the input was too short to contain a magic number.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        let Some(decoder) = self.decoder.as_mut() else {
            return Err(WarcError::MagicNumberTooShort {
                read: self.magic.len(),
            });
        };
        decoder.finish(|b| self.splitter.push(b))?;
        self.finished = true;
        Ok(())
    }

    /// Get the next complete record, if one is available.
    ///
    /// Returns `None` if more input is needed, or when the stream is exhausted
    /// after [`RecordStream::finish`].
    pub fn next_record(&mut self) -> Option<Record> {
        loop {
            let record = if let Some(line) = self.splitter.next_line() {
                self.assembler.consume_line(line)
            } else if !self.finished {
                return None;
            } else if let Some(tail) = self.splitter.flush() {
                // Unterminated last line
                self.assembler.consume_line(tail)
            } else {
                Some(self.assembler.finish()?)
            };

            match record {
                Some(record) if record.record_type().matches_bitmask(self.record_types) => {
                    return Some(record)
                }
                Some(record) => {
                    tracing::trace!(record_type = record.record_type().as_str(), "skipping filtered record");
                }
                None => {}
            }
        }
    }
}

/// WARC record iterator over a blocking byte source.
///
/// The source may be plain or gzip compressed (whole stream or one member per
/// record).
pub struct WarcReader<R> {
    source: R,
    stream: RecordStream,
    buf: Vec<u8>,
    eof: bool,
    failed: bool,
}

impl WarcReader<File> {
    /// Open a WARC file.
    ///
    /// Fails immediately if the file cannot be opened or is shorter than the
    /// gzip magic number.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening WARC file");
        let mut reader = Self::with_options(File::open(path)?, options);
        reader.read_magic()?;
        Ok(reader)
    }
}

impl<R: Read> WarcReader<R> {
    /// Create a reader with default options.
    pub fn new(source: R) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(source: R, options: ReaderOptions) -> Self {
        WarcReader {
            source,
            stream: RecordStream::new(&options),
            buf: vec![0; options.chunk_size.max(1)],
            eof: false,
            failed: false,
        }
    }

    /// Whether the source is gzip compressed.
    ///
    /// Only meaningful after the first record was read.
    pub fn is_gzip(&self) -> bool {
        self.stream.is_gzip()
    }

    /// Returns the wrapped source.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn read_magic(&mut self) -> Result<()> {
        while !self.stream.magic_detected() && !self.eof {
            self.fill()?;
        }
        Ok(())
    }

    fn fill(&mut self) -> Result<()> {
        let n = loop {
            match self.source.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        if n == 0 {
            self.eof = true;
            self.stream.finish()
        } else {
            self.stream.push(&self.buf[..n])
        }
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at the end of the stream.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(record) = self.stream.next_record() {
                return Ok(Some(record));
            }
            if self.eof {
                return Ok(None);
            }
            self.fill()?;
        }
    }
}

impl<R: Read> Iterator for WarcReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                // Source errors are not recoverable, stop after reporting one.
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(feature = "async")]
pub use self::async_reader::AsyncWarcReader;

#[cfg(feature = "async")]
mod async_reader {
    use std::path::Path;

    use tokio::io::{AsyncRead, AsyncReadExt};

    use super::{ReaderOptions, RecordStream};
    use crate::error::Result;
    use crate::record::Record;

    /// WARC record reader over a tokio [`AsyncRead`] source.
    pub struct AsyncWarcReader<R> {
        source: R,
        stream: RecordStream,
        buf: Vec<u8>,
        eof: bool,
    }

    impl AsyncWarcReader<tokio::fs::File> {
        /// Open a WARC file.
        pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
            Self::open_with_options(path, ReaderOptions::default()).await
        }

        pub async fn open_with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
            let path = path.as_ref();
            tracing::debug!(path = %path.display(), "opening WARC file");
            let file = tokio::fs::File::open(path).await?;
            let mut reader = Self::with_options(file, options);
            while !reader.stream.magic_detected() && !reader.eof {
                reader.fill().await?;
            }
            Ok(reader)
        }
    }

    impl<R: AsyncRead + Unpin> AsyncWarcReader<R> {
        pub fn new(source: R) -> Self {
            Self::with_options(source, ReaderOptions::default())
        }

        pub fn with_options(source: R, options: ReaderOptions) -> Self {
            AsyncWarcReader {
                source,
                stream: RecordStream::new(&options),
                buf: vec![0; options.chunk_size.max(1)],
                eof: false,
            }
        }

        async fn fill(&mut self) -> Result<()> {
            let n = self.source.read(&mut self.buf).await?;
            if n == 0 {
                self.eof = true;
                self.stream.finish()
            } else {
                self.stream.push(&self.buf[..n])
            }
        }

        /// Read the next record, `Ok(None)` at the end of the stream.
        pub async fn next_record(&mut self) -> Result<Option<Record>> {
            loop {
                if let Some(record) = self.stream.next_record() {
                    return Ok(Some(record));
                }
                if self.eof {
                    return Ok(None);
                }
                self.fill().await?;
            }
        }

        pub fn into_inner(self) -> R {
            self.source
        }
    }
}
