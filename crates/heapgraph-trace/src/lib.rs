//! heapgraph-trace — Ruby `ObjectSpace.dump_all` record model and decoding.
//!
//! This crate is the input side of the heapgraph pipeline:
//! - `record`: the [`HeapRecord`] line model (hex addresses, GC flags,
//!   optional allocation-site metadata) and the [`ObjectType`] tag enum.
//! - `decode`: a serial, owning JSONL iterator yielding
//!   `Result<HeapRecord>` so callers can surface per-line errors.
//! - `parallel`: a multi-worker decoder that fans lines out across parse
//!   threads and delivers records and decode errors on separate channels.
//!
//! Decoding is deliberately lenient: a malformed line is an error *item*,
//! never a failure of the whole stream, and unrecognized object-type tags
//! decode to [`ObjectType::Unknown`] rather than erroring.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Serial JSONL decoding (owning iterator, per-line errors).
pub mod decode;
/// Parallel JSONL decoding (worker pool, record + error channels).
pub mod parallel;
/// Heap-dump record model and the object-type tag enum.
pub mod record;

pub use decode::{decode_records, stream_records, RecordIter};
pub use parallel::{default_workers, parallel_decode, parallel_decode_file, DecodeStreams};
pub use record::{Address, GcFlags, HeapRecord, ObjectType};
