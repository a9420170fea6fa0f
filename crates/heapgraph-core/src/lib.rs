//! heapgraph-core — the decode-to-graph assembly core.
//!
//! This crate owns the **stable boundary** between the heap-dump decoder and
//! the GEXF encoder:
//! - `ids`: the identifier allocator (address → hex id lookup-or-create,
//!   plus synthetic ids for address-less records),
//! - `project`: the attribute projector and the declared-once node
//!   attribute schema,
//! - `assemble`: the single-owner graph assembler,
//! - `pipeline`: the end-to-end convert driver (parallel decode → assembly
//!   → encode) with its independent error-drain path.
//!
//! ```no_run
//! use heapgraph_core::pipeline::convert;
//! # use std::path::Path;
//! let stats = convert(Path::new("heap.jsonl"), Path::new("heap.gexf"))?;
//! println!("{} nodes, {} edges", stats.nodes, stats.edges);
//! # Ok::<(), anyhow::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Single-owner graph assembly from decoded records.
pub mod assemble;
/// Identifier allocation (hex addresses + synthetic counter).
pub mod ids;
/// End-to-end convert pipeline.
pub mod pipeline;
/// Attribute projection and the shared node attribute schema.
pub mod project;

pub use assemble::Assembler;
pub use ids::IdTable;
pub use pipeline::{convert, ConvertStats};
pub use project::{node_attr_schema, project, Projection};
