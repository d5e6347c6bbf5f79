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

use proptest::prelude::*;
use warcstream::{
    HttpMessage, LineSplitter, ReaderOptions, Record, RecordStream, WarcInfo, WarcReader, WarcWriter,
    WriterOptions,
};

fn archive(bodies: &[Vec<u8>], gzip: bool) -> Vec<u8> {
    let options = WriterOptions::default().with_gzip(gzip);
    let mut writer = WarcWriter::new(Vec::new(), options);
    writer.write_warcinfo_record(&WarcInfo::default()).unwrap();
    for (i, body) in bodies.iter().enumerate() {
        let uri = format!("http://example.com/{}", i);
        writer
            .write_request_response_records(
                &uri,
                HttpMessage::new("GET / HTTP/1.1\r\n\r\n", None),
                HttpMessage::new("HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n", Some(body)),
            )
            .unwrap();
    }
    writer.end().unwrap()
}

/// Push the input through a record stream using the given chunk sizes.
fn parse_chunked(data: &[u8], sizes: &[usize]) -> Vec<Record> {
    let mut stream = RecordStream::new(&ReaderOptions::default());
    let mut records = Vec::new();
    let mut rest = data;
    let mut sizes = sizes.iter().cycle();
    while !rest.is_empty() {
        let n = (*sizes.next().unwrap()).min(rest.len());
        stream.push(&rest[..n]).unwrap();
        rest = &rest[n..];
        while let Some(record) = stream.next_record() {
            records.push(record);
        }
    }
    stream.finish().unwrap();
    records.extend(std::iter::from_fn(|| stream.next_record()));
    records
}

fn body_strategy() -> impl Strategy<Value = Vec<u8>> {
    // Bias towards separator bytes so that CRLF and empty lines are frequent.
    prop::collection::vec(
        prop_oneof![
            4 => Just(b'\r'),
            4 => Just(b'\n'),
            1 => Just(b'W'),
            6 => any::<u8>(),
        ],
        0..200,
    )
}

proptest! {
    #[test]
    fn chunk_boundaries_do_not_matter(
        bodies in prop::collection::vec(body_strategy(), 1..4),
        sizes in prop::collection::vec(1usize..64, 1..8),
        gzip in any::<bool>(),
    ) {
        let data = archive(&bodies, gzip);
        let whole = parse_chunked(&data, &[data.len()]);
        let chunked = parse_chunked(&data, &sizes);
        prop_assert_eq!(&chunked, &whole);
    }

    #[test]
    fn splitter_reassembles_input(
        data in prop::collection::vec(prop_oneof![Just(b'\r'), Just(b'\n'), any::<u8>()], 0..300),
        sizes in prop::collection::vec(1usize..16, 1..6),
    ) {
        let mut splitter = LineSplitter::new();
        let mut out = Vec::new();
        let mut rest = data.as_slice();
        let mut sizes = sizes.iter().cycle();
        while !rest.is_empty() {
            let n = (*sizes.next().unwrap()).min(rest.len());
            for line in splitter.feed(&rest[..n]) {
                prop_assert!(line.ends_with(b"\r\n"));
                prop_assert!(!line[..line.len() - 2].windows(2).any(|w| w == b"\r\n"));
                out.extend_from_slice(&line);
            }
            rest = &rest[n..];
        }
        out.extend(splitter.flush().unwrap_or_default());
        prop_assert_eq!(out, data);
    }
}

#[test]
fn bodies_survive_round_trip() {
    let bodies = vec![
        b"".to_vec(),
        b"\r\n".to_vec(),
        b"\r\n\r\n".to_vec(),
        b"line\r\n\r\n\r\nWARC/\r\n".to_vec(),
        b"no trailing newline".to_vec(),
        b"\n\r\r\n\n".to_vec(),
    ];
    let data = archive(&bodies, false);
    let records: Vec<_> = WarcReader::new(data.as_slice()).collect::<Result<_, _>>().unwrap();
    let read_bodies: Vec<_> = records
        .into_iter()
        .filter_map(|r| match r {
            Record::Response { body, .. } => Some(body),
            _ => None,
        })
        .collect();
    assert_eq!(read_bodies, bodies);
}

#[test]
fn small_read_buffer() {
    let bodies = vec![b"hello\r\nworld\r\n".to_vec(); 3];
    let data = archive(&bodies, true);
    let options = ReaderOptions::default().with_chunk_size(5);
    let records: Vec<_> = WarcReader::with_options(data.as_slice(), options)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records.len(), 7);
}
