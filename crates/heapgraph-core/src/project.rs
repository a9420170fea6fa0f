//! Attribute projection.
//!
//! Flattens a [`HeapRecord`] into the label and typed attribute values a
//! graph node carries. Numeric and boolean fields are always emitted —
//! zero and `false` are meaningful runtime state. String-like descriptive
//! fields are emitted only when actually known, which keeps each node's
//! payload proportional to what the dump recorded while the one shared
//! schema ([`node_attr_schema`]) stays valid for every node.

use heapgraph_gexf::{Attr, AttrKind, AttrValue};
use heapgraph_trace::HeapRecord;

/// Projection of one record: raw address string, node label, attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    /// Lowercase-hex form of the record's address (`"0"` for the sentinel).
    pub address: String,
    /// Node label (the object type's display name).
    pub label: String,
    /// Typed attribute values, schema titles only.
    pub values: Vec<AttrValue>,
}

/// The declared-once node attribute schema shared by every node.
///
/// Registered with the graph before any node is added; the encoder writes
/// it once as the document header.
#[must_use]
pub fn node_attr_schema() -> Vec<Attr> {
    use AttrKind::{Boolean, Long, String};
    vec![
        Attr::new("type", String),
        Attr::new("value", String),
        Attr::new("name", String),
        Attr::new("nodeType", String),
        Attr::new("address", String),
        Attr::new("class", String),
        Attr::new("default", Long),
        Attr::new("generation", Long),
        Attr::new("bytesize", Long),
        Attr::new("fd", Long),
        Attr::new("file", String),
        Attr::new("encoding", String),
        Attr::new("method", String),
        Attr::new("ivars", Long),
        Attr::new("length", Long),
        Attr::new("line", Long),
        Attr::new("memsize", Long),
        Attr::new("capacity", Long),
        Attr::new("size", Long),
        Attr::new("struct", String),
        Attr::new("wbProtected", Boolean),
        Attr::new("old", Boolean),
        Attr::new("marked", Boolean),
        Attr::new("broken", Boolean),
        Attr::new("frozen", Boolean),
        Attr::new("fstring", Boolean),
        Attr::new("shared", Boolean),
        Attr::new("embedded", Boolean),
    ]
}

/// Project a record into its node label and attribute values.
///
/// Pure and total: no input produces an error.
#[must_use]
pub fn project(rec: &HeapRecord) -> Projection {
    let address = format!("{:x}", rec.address);
    let label = rec.kind.name().to_owned();

    // Runtime-state flags and numeric descriptors are always meaningful.
    let mut values = vec![
        AttrValue::new("broken", rec.broken),
        AttrValue::new("bytesize", rec.bytesize),
        AttrValue::new("capacity", rec.capacity),
        AttrValue::new("default", i64::try_from(rec.default).unwrap_or(i64::MAX)),
        AttrValue::new("embedded", rec.embedded),
        AttrValue::new("fd", rec.fd),
        AttrValue::new("frozen", rec.frozen),
        AttrValue::new("fstring", rec.fstring),
        AttrValue::new("generation", rec.generation),
        AttrValue::new("ivars", rec.ivars),
        AttrValue::new("length", rec.length),
        AttrValue::new("line", rec.line),
        AttrValue::new("marked", rec.flags.marked),
        AttrValue::new("memsize", rec.memsize),
        AttrValue::new("old", rec.flags.old),
        AttrValue::new("shared", rec.shared),
        AttrValue::new("size", rec.size),
        AttrValue::new("wbProtected", rec.flags.wb_protected),
    ];

    let mut push_str = |title: &str, text: &str| {
        if !text.is_empty() {
            values.push(AttrValue::new(title, text));
        }
    };

    if rec.address != 0 {
        push_str("address", &address);
    }
    if rec.class != 0 {
        push_str("class", &format!("{:x}", rec.class));
    }
    push_str("encoding", rec.encoding.as_deref().unwrap_or(""));
    push_str("file", rec.file.as_deref().unwrap_or(""));
    push_str("method", rec.method.as_deref().unwrap_or(""));
    push_str("name", rec.name.as_deref().unwrap_or(""));
    push_str("nodeType", rec.node_type.as_deref().unwrap_or(""));
    push_str("struct", rec.struct_name.as_deref().unwrap_or(""));
    push_str("type", &label);

    // The generic value is suppressed only on true absence: an empty string
    // or empty composite is still a present value.
    if let Some(v) = &rec.value {
        values.push(AttrValue::new("value", render_value(v)));
    }

    Projection { address, label, values }
}

/// Render a generic JSON value the way the output format displays it.
fn render_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
