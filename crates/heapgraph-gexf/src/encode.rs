//! GEXF 1.2draft XML serialization.
//!
//! Layout follows the format's reference documents: the node-attribute
//! schema is written once as a `<attributes>` header before any node, each
//! populated attribute becomes an `<attvalue>` referencing the declared
//! attribute's id, and edges get sequential numeric ids. All text content
//! is XML-escaped.

use anyhow::{anyhow, Context, Result};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::graph::Graph;

/// Serialize `graph` as GEXF 1.2draft XML into `w`.
///
/// Fails if a node carries an attribute title missing from the declared
/// schema — the schema is the single source of truth for the header, so an
/// undeclared title would produce a document readers reject.
pub fn encode<W: Write>(mut w: W, graph: &Graph) -> Result<()> {
    let attr_ids: HashMap<&str, usize> = graph
        .node_attrs()
        .iter()
        .enumerate()
        .map(|(idx, attr)| (attr.title.as_str(), idx))
        .collect();

    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(w, r#"<gexf xmlns="http://www.gexf.net/1.2draft" version="1.2">"#)?;
    writeln!(w, r#"  <graph mode="static" defaultedgetype="directed">"#)?;

    writeln!(w, r#"    <attributes class="node">"#)?;
    for (idx, attr) in graph.node_attrs().iter().enumerate() {
        writeln!(
            w,
            r#"      <attribute id="{idx}" title="{}" type="{}"/>"#,
            escape(&attr.title),
            attr.kind.xml_name(),
        )?;
    }
    writeln!(w, "    </attributes>")?;

    writeln!(w, "    <nodes>")?;
    for node in graph.nodes() {
        if node.values.is_empty() {
            writeln!(
                w,
                r#"      <node id="{}" label="{}"/>"#,
                escape(&node.id),
                escape(&node.label),
            )?;
            continue;
        }
        writeln!(
            w,
            r#"      <node id="{}" label="{}">"#,
            escape(&node.id),
            escape(&node.label),
        )?;
        writeln!(w, "        <attvalues>")?;
        for value in &node.values {
            let idx = attr_ids.get(value.title.as_str()).ok_or_else(|| {
                anyhow!(
                    "attribute {:?} on node {:?} is not declared in the schema",
                    value.title,
                    node.id
                )
            })?;
            writeln!(
                w,
                r#"          <attvalue for="{idx}" value="{}"/>"#,
                escape(&value.value.render()),
            )?;
        }
        writeln!(w, "        </attvalues>")?;
        writeln!(w, "      </node>")?;
    }
    writeln!(w, "    </nodes>")?;

    writeln!(w, "    <edges>")?;
    for (idx, edge) in graph.edges().iter().enumerate() {
        writeln!(
            w,
            r#"      <edge id="{idx}" source="{}" target="{}"/>"#,
            escape(&edge.source),
            escape(&edge.target),
        )?;
    }
    writeln!(w, "    </edges>")?;

    writeln!(w, "  </graph>")?;
    writeln!(w, "</gexf>")?;
    w.flush()?;
    Ok(())
}

/// Serialize `graph` to a file (buffered).
pub fn encode_to_file<P: AsRef<Path>>(path: P, graph: &Graph) -> Result<()> {
    let f = File::create(path.as_ref())
        .with_context(|| format!("create {}", path.as_ref().display()))?;
    encode(BufWriter::new(f), graph)
        .with_context(|| format!("encode GEXF to {}", path.as_ref().display()))
}

/// Escape text for use in XML attribute values.
fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Attr, AttrKind, AttrValue};

    fn encode_to_string(graph: &Graph) -> String {
        let mut buf = Vec::new();
        encode(&mut buf, graph).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("a&b<c>\"d'"), "a&amp;b&lt;c&gt;&quot;d&apos;");
        assert!(matches!(escape("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn schema_header_precedes_nodes() {
        let mut g = Graph::new();
        g.set_node_attrs(vec![
            Attr::new("type", AttrKind::String),
            Attr::new("size", AttrKind::Long),
        ]);
        g.add_node("10", "String", vec![AttrValue::new("size", 7i64)]);
        g.add_edge("10", "20");

        let xml = encode_to_string(&g);
        let attrs_at = xml.find(r#"<attributes class="node">"#).unwrap();
        let nodes_at = xml.find("<nodes>").unwrap();
        assert!(attrs_at < nodes_at);
        assert!(xml.contains(r#"<attribute id="1" title="size" type="long"/>"#));
        assert!(xml.contains(r#"<attvalue for="1" value="7"/>"#));
        assert!(xml.contains(r#"<edge id="0" source="10" target="20"/>"#));
    }

    #[test]
    fn node_without_values_is_self_closing() {
        let mut g = Graph::new();
        g.add_node("1", "Nil", vec![]);
        let xml = encode_to_string(&g);
        assert!(xml.contains(r#"<node id="1" label="Nil"/>"#));
    }

    #[test]
    fn value_text_is_escaped() {
        let mut g = Graph::new();
        g.set_node_attrs(vec![Attr::new("value", AttrKind::String)]);
        g.add_node("1", "String", vec![AttrValue::new("value", "<&>")]);
        let xml = encode_to_string(&g);
        assert!(xml.contains(r#"value="&lt;&amp;&gt;""#));
    }

    #[test]
    fn undeclared_attribute_is_rejected() {
        let mut g = Graph::new();
        g.add_node("1", "Hash", vec![AttrValue::new("ghost", 1i64)]);
        let mut buf = Vec::new();
        let err = encode(&mut buf, &g).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn multi_edges_get_distinct_ids() {
        let mut g = Graph::new();
        g.add_edge("a", "b");
        g.add_edge("a", "b");
        let xml = encode_to_string(&g);
        assert!(xml.contains(r#"<edge id="0" source="a" target="b"/>"#));
        assert!(xml.contains(r#"<edge id="1" source="a" target="b"/>"#));
    }
}
