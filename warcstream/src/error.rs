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

//! Error types for reading and writing WARC streams.
//!
//! Malformed record contents never produce an error. The parser recovers
//! locally and reports anomalies through `tracing`, so only I/O failures and
//! problems detected before parsing starts are surfaced here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for WARC operations.
pub type Result<T> = std::result::Result<T, WarcError>;

/// Errors that can occur while reading or writing WARC streams.
#[derive(Error, Debug)]
pub enum WarcError {
    /// The source ended before the gzip magic number could be read.
    #[error("magic number read returned {read} of 3 bytes")]
    MagicNumberTooShort {
        /// Number of bytes available.
        read: usize,
    },

    /// The path cannot be used as a WARC file.
    #[error("invalid WARC path {}: {reason}", path.display())]
    InvalidPath {
        /// Offending path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: String,
    },

    /// Underlying I/O error from the source or sink.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl WarcError {
    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
