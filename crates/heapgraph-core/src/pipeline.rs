//! End-to-end convert pipeline.
//!
//! Wiring: decode workers feed a record channel consumed by exactly one assembly
//! loop, decode errors drain on their own logging thread, and the encoder
//! runs once against the finished graph. The destination file is created
//! before the pipeline starts so an unwritable output aborts the run
//! up front, and the drain thread is joined before encoding so nothing
//! outlives the conversion.

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::thread;
use tracing::{info, warn};

use heapgraph_gexf::encode;
use heapgraph_trace::{default_workers, parallel_decode_file, DecodeStreams};

use crate::assemble::Assembler;

/// Outcome counters for one conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertStats {
    /// Records successfully decoded and assembled.
    pub records: usize,
    /// Defined nodes in the output graph.
    pub nodes: usize,
    /// Edges in the output graph (multi-edges counted individually).
    pub edges: usize,
    /// Per-line decode errors (logged, not fatal).
    pub decode_errors: usize,
}

/// Convert a heap-dump trace at `src` into a GEXF file at `dst`, decoding
/// with one worker per available processing unit.
pub fn convert(src: &Path, dst: &Path) -> Result<ConvertStats> {
    convert_with_workers(src, dst, default_workers())
}

/// [`convert`] with an explicit decode worker count (tests pin this down).
pub fn convert_with_workers(src: &Path, dst: &Path, workers: usize) -> Result<ConvertStats> {
    // Fatal/startup failures happen here, before any pipeline thread spawns.
    let out = File::create(dst).with_context(|| format!("create {}", dst.display()))?;
    let DecodeStreams { records, errors } = parallel_decode_file(src, workers)?;

    // Independent error consumer: logs and counts, never blocks assembly.
    let drain = thread::spawn(move || {
        let mut n = 0usize;
        for err in errors {
            warn!("decode error: {err:#}");
            n += 1;
        }
        n
    });

    // Exactly one consumer mutates the graph.
    let mut asm = Assembler::new();
    let mut n_records = 0usize;
    for rec in records {
        asm.ingest(&rec);
        n_records += 1;
    }

    // The record channel is exhausted, so the workers are done and the
    // error channel is closing; let it finish before the final encode.
    let decode_errors = drain
        .join()
        .map_err(|_| anyhow!("decode error drain thread panicked"))?;

    let graph = asm.finish();
    info!(
        records = n_records,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        decode_errors,
        "assembled object graph"
    );

    encode(BufWriter::new(out), &graph)
        .with_context(|| format!("encode GEXF to {}", dst.display()))?;

    Ok(ConvertStats {
        records: n_records,
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        decode_errors,
    })
}
