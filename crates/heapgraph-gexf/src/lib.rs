//! heapgraph-gexf — GEXF 1.2draft document model and XML encoder.
//!
//! - `graph`: the in-memory document (declared-once node attribute schema,
//!   insertion-ordered nodes with last-write-wins identity, an edge list
//!   that permits multi-edges and self-loops).
//! - `encode`: serialize a [`Graph`] as GEXF 1.2draft XML.
//!
//! The crate provides a *pure* document API: callers decide where the bytes
//! go (file, buffer, network). Edge targets are plain identifiers, so an
//! edge may point at an identifier no node ever defines — Gephi renders
//! such targets as bare nodes, which is exactly the placeholder behavior
//! heap-dump conversion wants.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// GEXF XML serialization.
pub mod encode;
/// Graph document model (schema, nodes, edges).
pub mod graph;

pub use encode::{encode, encode_to_file};
pub use graph::{Attr, AttrKind, AttrValue, Edge, Graph, Node, Value};
