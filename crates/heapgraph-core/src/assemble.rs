//! Graph assembly.
//!
//! The assembler is the single owner of the growing graph: exactly one
//! consumer feeds it records, so the node set, edge set, and identifier
//! table need no synchronization. Assembly is order-independent — a
//! reference may arrive before (or without) its target's defining record,
//! and both orders produce the same graph.

use heapgraph_gexf::Graph;
use heapgraph_trace::HeapRecord;

use crate::ids::IdTable;
use crate::project::{node_attr_schema, project};

/// Incremental graph assembler.
#[derive(Debug)]
pub struct Assembler {
    graph: Graph,
    ids: IdTable,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    /// Empty graph with the node attribute schema already registered
    /// (the schema must be declared before any node is added).
    #[must_use]
    pub fn new() -> Self {
        let mut graph = Graph::new();
        graph.set_node_attrs(node_attr_schema());
        Self { graph, ids: IdTable::new() }
    }

    /// Fold one record into the graph.
    ///
    /// Never fails; structural anomalies resolve by policy instead:
    /// - a record whose identifier already exists (a forward reference's
    ///   placeholder being defined, or a genuinely duplicate record — the
    ///   two are indistinguishable here) replaces that node's label and
    ///   attributes, last write wins,
    /// - a reference to an address never seen as a record leaves a dangling
    ///   edge to an attribute-less placeholder identifier,
    /// - repeated references produce one edge per occurrence.
    pub fn ingest(&mut self, rec: &HeapRecord) {
        let projection = project(rec);
        let id = self.ids.id_for(rec.address);
        self.graph.add_node(id.clone(), projection.label, projection.values);
        for &target in &rec.references {
            let target_id = self.ids.resolve(target);
            self.graph.add_edge(id.clone(), target_id);
        }
    }

    /// Consume the assembler, yielding the finished graph.
    #[must_use]
    pub fn finish(self) -> Graph {
        self.graph
    }

    /// Drain an entire record stream into a finished graph.
    #[must_use]
    pub fn assemble<I: IntoIterator<Item = HeapRecord>>(records: I) -> Graph {
        let mut asm = Self::new();
        for rec in records {
            asm.ingest(&rec);
        }
        asm.finish()
    }
}
