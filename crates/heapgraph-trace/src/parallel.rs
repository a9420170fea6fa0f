//! Parallel JSONL decoding.
//!
//! `parallel_decode` fans dump lines out across a pool of parse workers and
//! fans the results back in over two independent channels: decoded records
//! on one, per-line decode errors on the other. Arrival order across workers
//! is unspecified; consumers must not assume it matches input order.
//!
//! Shutdown is driven entirely by channel disconnection: the reader thread
//! closes the line channel at EOF, each worker exits once the line channel
//! drains, and both output channels disconnect once the last worker drops
//! its senders. No thread outlives the streams it feeds.

use anyhow::{Context, Error};
use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::decode::parse_line;
use crate::record::HeapRecord;

/// Output channels of a parallel decode run.
///
/// Both receivers disconnect once every worker has finished; the error
/// receiver must be drained (or dropped) independently of the record
/// receiver so neither path can block the other.
pub struct DecodeStreams {
    /// Successfully decoded records, in unspecified arrival order.
    pub records: Receiver<HeapRecord>,
    /// Per-line decode errors (purely observational, never fatal).
    pub errors: Receiver<Error>,
}

/// Default worker count: one per available processing unit.
#[must_use]
pub fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, usize::from)
}

/// Decode a heap-dump stream with `workers` parse threads (clamped to ≥ 1).
///
/// A dedicated reader thread splits the input into lines; workers pull lines
/// from a shared queue, parse each one independently, and send the outcome
/// to the matching channel. An I/O error while reading stops the stream
/// after surfacing the error.
#[must_use]
pub fn parallel_decode<R: Read + Send + 'static>(input: R, workers: usize) -> DecodeStreams {
    let workers = workers.max(1);

    let (line_tx, line_rx) = mpsc::channel::<(usize, String)>();
    let line_rx = Arc::new(Mutex::new(line_rx));
    let (record_tx, records) = mpsc::channel::<HeapRecord>();
    let (error_tx, errors) = mpsc::channel::<Error>();

    let reader_error_tx = error_tx.clone();
    thread::spawn(move || {
        let rdr = BufReader::new(input);
        for (idx, line) in rdr.lines().enumerate() {
            let line_no = idx + 1;
            match line {
                Ok(line) => {
                    // Receivers gone ⇒ the consumer hung up; stop reading.
                    if line_tx.send((line_no, line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    let _ = reader_error_tx
                        .send(Error::new(e).context(format!("read line {line_no}")));
                    return;
                }
            }
        }
    });

    for _ in 0..workers {
        let line_rx = Arc::clone(&line_rx);
        let record_tx = record_tx.clone();
        let error_tx = error_tx.clone();
        thread::spawn(move || loop {
            let next = {
                let Ok(guard) = line_rx.lock() else { return };
                guard.recv()
            };
            let Ok((line_no, line)) = next else { return };
            match parse_line(line_no, &line) {
                Ok(record) => {
                    if record_tx.send(record).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    if error_tx.send(e).is_err() {
                        return;
                    }
                }
            }
        });
    }

    // Only the worker clones keep the output channels open.
    drop(record_tx);
    drop(error_tx);

    DecodeStreams { records, errors }
}

/// Convenience wrapper: open `path` and decode it with `workers` threads.
pub fn parallel_decode_file<P: AsRef<std::path::Path>>(
    path: P,
    workers: usize,
) -> anyhow::Result<DecodeStreams> {
    let f = std::fs::File::open(path.as_ref())
        .with_context(|| format!("open {}", path.as_ref().display()))?;
    Ok(parallel_decode(f, workers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump_of(n: usize) -> String {
        (0..n)
            .map(|i| format!(r#"{{"address":"0x{:x}","type":"OBJECT","memsize":{i}}}"#, i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn delivers_every_record_exactly_once() {
        for workers in [1, 4] {
            let streams = parallel_decode(std::io::Cursor::new(dump_of(100)), workers);
            let mut addrs: Vec<_> = streams.records.iter().map(|r| r.address).collect();
            addrs.sort_unstable();
            assert_eq!(addrs, (1..=100).collect::<Vec<u64>>(), "workers={workers}");
            assert_eq!(streams.errors.iter().count(), 0);
        }
    }

    #[test]
    fn errors_travel_on_their_own_channel() {
        let dump = format!("{}\nnot json at all\n{}\n", dump_of(1), dump_of(1));
        let streams = parallel_decode(std::io::Cursor::new(dump), 2);
        let records: Vec<_> = streams.records.iter().collect();
        let errors: Vec<_> = streams.errors.iter().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn zero_workers_is_clamped() {
        let streams = parallel_decode(std::io::Cursor::new(dump_of(3)), 0);
        assert_eq!(streams.records.iter().count(), 3);
    }
}
