//! Serial JSONL decoding for heap-dump traces.
//!
//! The iterator *owns* its underlying reader and yields
//! `Result<HeapRecord>` so callers can surface per-line errors without the
//! stream dying. (No borrowed iterators that outlive their buffers.)

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::record::HeapRecord;

/// Parse one dump line (1-based `line_no` for error context).
///
/// A blank line is surfaced as a parse error rather than skipped, so the
/// error channel sees exactly what the decoder dropped.
pub(crate) fn parse_line(line_no: usize, line: &str) -> Result<HeapRecord> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.is_empty() {
        anyhow::bail!("parse dump line {line_no}: empty line");
    }
    serde_json::from_str(line).with_context(|| format!("parse dump line {line_no}"))
}

/// Owning JSONL iterator over [`HeapRecord`]s.
pub struct RecordIter<R> {
    rdr: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> Iterator for RecordIter<R> {
    type Item = Result<HeapRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.rdr.read_line(&mut self.buf) {
            Ok(0) => None, // EOF
            Ok(_) => {
                self.line_no += 1;
                Some(parse_line(self.line_no, &self.buf))
            }
            Err(e) => Some(Err(e).with_context(|| format!("read line {}", self.line_no + 1))),
        }
    }
}

/// Decode records from any reader (wraps it in a `BufReader`).
pub fn decode_records<R: Read>(rdr: R) -> RecordIter<BufReader<R>> {
    RecordIter {
        rdr: BufReader::new(rdr),
        buf: String::with_capacity(8 << 10),
        line_no: 0,
    }
}

/// Stream records from a heap-dump file, one JSON object per line.
///
/// Only one record is materialized at a time; each line is parsed
/// independently, and a malformed line yields an `Err` item carrying its
/// line number.
pub fn stream_records<P: AsRef<Path>>(path: P) -> Result<RecordIter<BufReader<File>>> {
    let f = File::open(path.as_ref())
        .with_context(|| format!("open {}", path.as_ref().display()))?;
    Ok(decode_records(f))
}
