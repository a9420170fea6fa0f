// crates/heapgraph-trace/src/record.rs

//! Heap-dump record model.
//!
//! One [`HeapRecord`] corresponds to one line of a Ruby
//! `ObjectSpace.dump_all` JSON dump. Addresses arrive as `"0x..."` hex
//! strings and decode to [`Address`]; `0` is the sentinel for records that
//! carry no stable address (roots and immediate values). Every other field
//! is optional in the source and defaults to empty/zero/false, so a record
//! that decoded with best-effort fields is still usable downstream.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Raw runtime memory address of an object (`0` = no stable address).
pub type Address = u64;

/// Garbage-collector flag block (`"flags":{...}` in the dump).
///
/// Flags the dump does not set default to `false`; flag keys this model does
/// not know (e.g. `uncollectible`) are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GcFlags {
    /// Write-barrier protected.
    pub wb_protected: bool,
    /// Promoted to the old generation.
    pub old: bool,
    /// Marked by the last GC cycle.
    pub marked: bool,
}

/// Object-kind tag of a heap record (`"type"` in the dump).
///
/// The set mirrors the tags MRI emits. Tags outside the known set decode to
/// [`ObjectType::Unknown`] so a newer runtime's dump still converts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)] // variants mirror the MRI tag set one-to-one
pub enum ObjectType {
    Array,
    Bignum,
    Class,
    Complex,
    Data,
    False,
    File,
    Float,
    Hash,
    Iclass,
    Imemo,
    Match,
    Module,
    Nil,
    Node,
    None,
    Object,
    Rational,
    Regexp,
    Root,
    String,
    Struct,
    Symbol,
    True,
    Zombie,
    /// Unrecognized tag, stored in display form.
    Unknown(String),
}

impl ObjectType {
    /// Map a raw dump tag (e.g. `"STRING"`) to its variant.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ARRAY" => Self::Array,
            "BIGNUM" => Self::Bignum,
            "CLASS" => Self::Class,
            "COMPLEX" => Self::Complex,
            "DATA" => Self::Data,
            "FALSE" => Self::False,
            "FILE" => Self::File,
            "FLOAT" => Self::Float,
            "HASH" => Self::Hash,
            "ICLASS" => Self::Iclass,
            "IMEMO" => Self::Imemo,
            "MATCH" => Self::Match,
            "MODULE" => Self::Module,
            "NIL" => Self::Nil,
            "NODE" => Self::Node,
            "NONE" => Self::None,
            "OBJECT" => Self::Object,
            "RATIONAL" => Self::Rational,
            "REGEXP" => Self::Regexp,
            "ROOT" => Self::Root,
            "STRING" => Self::String,
            "STRUCT" => Self::Struct,
            "SYMBOL" => Self::Symbol,
            "TRUE" => Self::True,
            "ZOMBIE" => Self::Zombie,
            other => Self::Unknown(display_form(other)),
        }
    }

    /// Display name used as the graph node label (`"String"`, `"Array"`, …).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Array => "Array",
            Self::Bignum => "Bignum",
            Self::Class => "Class",
            Self::Complex => "Complex",
            Self::Data => "Data",
            Self::False => "False",
            Self::File => "File",
            Self::Float => "Float",
            Self::Hash => "Hash",
            Self::Iclass => "Iclass",
            Self::Imemo => "Imemo",
            Self::Match => "Match",
            Self::Module => "Module",
            Self::Nil => "Nil",
            Self::Node => "Node",
            Self::None => "None",
            Self::Object => "Object",
            Self::Rational => "Rational",
            Self::Regexp => "Regexp",
            Self::Root => "Root",
            Self::String => "String",
            Self::Struct => "Struct",
            Self::Symbol => "Symbol",
            Self::True => "True",
            Self::Zombie => "Zombie",
            Self::Unknown(name) => name,
        }
    }
}

impl Default for ObjectType {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ObjectType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// `"STRING"` → `"String"`, preserving anything after the first character.
fn display_form(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// One decoded heap-dump line.
///
/// Field names follow the dump keys; `struct` is surfaced as
/// [`HeapRecord::struct_name`] (`struct` is reserved in Rust).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeapRecord {
    /// Object-kind tag; its display name labels the graph node.
    #[serde(rename = "type")]
    pub kind: ObjectType,
    /// Runtime address (`0` = no stable address).
    #[serde(deserialize_with = "hex::address")]
    pub address: Address,
    /// Class pointer (`0` = absent).
    #[serde(deserialize_with = "hex::address")]
    pub class: Address,
    /// Hash default-value pointer (`0` = absent).
    #[serde(deserialize_with = "hex::address")]
    pub default: Address,
    /// Outgoing references in declaration order; may repeat and may dangle.
    #[serde(deserialize_with = "hex::address_list")]
    pub references: Vec<Address>,

    /// Generic value payload; `None` only on true absence (missing or null).
    pub value: Option<serde_json::Value>,
    /// Class/module/symbol name.
    pub name: Option<String>,
    /// AST node kind (NODE records).
    pub node_type: Option<String>,
    /// Wrapped C struct name (DATA records).
    #[serde(rename = "struct")]
    pub struct_name: Option<String>,
    /// Allocation-site file.
    pub file: Option<String>,
    /// Allocation-site method.
    pub method: Option<String>,
    /// String encoding.
    pub encoding: Option<String>,

    /// String byte size.
    pub bytesize: i64,
    /// Backing-store capacity.
    pub capacity: i64,
    /// Open file descriptor (FILE records).
    pub fd: i64,
    /// GC generation the object was allocated in.
    pub generation: i64,
    /// Instance-variable count.
    pub ivars: i64,
    /// Element count (arrays).
    pub length: i64,
    /// Allocation-site line.
    pub line: i64,
    /// Total memory footprint in bytes.
    pub memsize: i64,
    /// Entry count (hashes).
    pub size: i64,

    /// Broken/corrupt object flag.
    pub broken: bool,
    /// Payload stored inline in the slot.
    pub embedded: bool,
    /// Frozen object.
    pub frozen: bool,
    /// Interned (fstring-table) string.
    pub fstring: bool,
    /// Copy-on-write shared backing store.
    pub shared: bool,
    /// GC flag block.
    pub flags: GcFlags,
}

/// Decode a `"0x..."` hex string (prefix optional, digits case-insensitive).
pub fn parse_hex_address(s: &str) -> Result<Address, std::num::ParseIntError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    Address::from_str_radix(digits, 16)
}

mod hex {
    use super::{parse_hex_address, Address};
    use serde::{de, Deserialize, Deserializer};

    pub(super) fn address<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(0),
            Some(s) => parse_hex_address(&s)
                .map_err(|e| de::Error::custom(format!("bad hex address {s:?}: {e}"))),
        }
    }

    pub(super) fn address_list<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Address>, D::Error> {
        let raw = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
        raw.iter()
            .map(|s| {
                parse_hex_address(s)
                    .map_err(|e| de::Error::custom(format!("bad hex reference {s:?}: {e}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_record_decodes() {
        let line = r#"{"address":"0x7fd3c8868e48","type":"STRING","class":"0x7fd3c9022cf8",
            "frozen":true,"embedded":true,"fstring":true,"bytesize":14,"value":"awesome string",
            "encoding":"UTF-8","memsize":40,"flags":{"wb_protected":true,"old":true,"marked":true}}"#;
        let rec: HeapRecord = serde_json::from_str(line).unwrap();
        assert_eq!(rec.kind, ObjectType::String);
        assert_eq!(rec.address, 0x7fd3_c886_8e48);
        assert_eq!(rec.class, 0x7fd3_c902_2cf8);
        assert_eq!(rec.bytesize, 14);
        assert_eq!(rec.memsize, 40);
        assert!(rec.frozen && rec.embedded && rec.fstring);
        assert!(rec.flags.wb_protected && rec.flags.old && rec.flags.marked);
        assert_eq!(rec.value, Some(serde_json::json!("awesome string")));
        assert_eq!(rec.encoding.as_deref(), Some("UTF-8"));
        assert!(rec.references.is_empty());
    }

    #[test]
    fn root_record_has_sentinel_address() {
        let line = r#"{"type":"ROOT","root":"vm","references":["0x7fd3c9024e58","0x10"]}"#;
        let rec: HeapRecord = serde_json::from_str(line).unwrap();
        assert_eq!(rec.kind, ObjectType::Root);
        assert_eq!(rec.address, 0);
        assert_eq!(rec.references, vec![0x7fd3_c902_4e58, 0x10]);
    }

    #[test]
    fn unknown_type_tag_is_carried() {
        let rec: HeapRecord = serde_json::from_str(r#"{"type":"SHAPE"}"#).unwrap();
        assert_eq!(rec.kind, ObjectType::Unknown("Shape".to_owned()));
        assert_eq!(rec.kind.name(), "Shape");
    }

    #[test]
    fn absent_fields_take_defaults() {
        let rec: HeapRecord = serde_json::from_str(r#"{"type":"ARRAY","length":3}"#).unwrap();
        assert_eq!(rec.length, 3);
        assert_eq!(rec.memsize, 0);
        assert!(!rec.frozen);
        assert_eq!(rec.value, None);
        assert_eq!(rec.name, None);
        assert_eq!(rec.class, 0);
    }

    #[test]
    fn null_value_counts_as_absent() {
        let rec: HeapRecord = serde_json::from_str(r#"{"type":"OBJECT","value":null}"#).unwrap();
        assert_eq!(rec.value, None);
    }

    #[test]
    fn malformed_hex_is_an_error() {
        assert!(serde_json::from_str::<HeapRecord>(r#"{"type":"DATA","address":"0xzz"}"#).is_err());
    }

    #[test]
    fn hex_parsing_accepts_prefix_and_case() {
        assert_eq!(parse_hex_address("0x10").unwrap(), 16);
        assert_eq!(parse_hex_address("0XfF").unwrap(), 255);
        assert_eq!(parse_hex_address("ff").unwrap(), 255);
        assert!(parse_hex_address("").is_err());
    }
}
