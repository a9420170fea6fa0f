// crates/heapgraph-core/src/ids.rs

//! Identifier allocation.
//!
//! Node identifiers come from two disjoint spaces:
//! - a nonzero raw address always maps to its lowercase-hex encoding,
//!   cached in an explicit table so forward and dangling references resolve
//!   to the same identifier the defining record later claims,
//! - records with no stable address draw from a strictly decreasing counter
//!   starting at −1, encoded in signed decimal. The leading `-` is what
//!   keeps synthetic identifiers disjoint from every hex identifier.

use std::collections::HashMap;

use heapgraph_trace::Address;

/// Address → identifier table plus the synthetic counter.
#[derive(Debug)]
pub struct IdTable {
    addrs: HashMap<Address, String>,
    next_synthetic: i64,
}

impl Default for IdTable {
    fn default() -> Self {
        Self::new()
    }
}

impl IdTable {
    /// Fresh table; the first synthetic identifier will be `-1`.
    #[must_use]
    pub fn new() -> Self {
        Self { addrs: HashMap::new(), next_synthetic: -1 }
    }

    /// Identifier for a record, branching on the address sentinel:
    /// a zero address allocates a fresh synthetic identifier, anything else
    /// resolves through the address table.
    pub fn id_for(&mut self, address: Address) -> String {
        if address == 0 {
            self.next_synthetic()
        } else {
            self.resolve(address)
        }
    }

    /// Lookup-or-create the identifier for a raw address.
    ///
    /// Idempotent: every call for the same address returns the same
    /// identifier, whether the first sight was a defining record or a
    /// reference.
    pub fn resolve(&mut self, address: Address) -> String {
        self.addrs
            .entry(address)
            .or_insert_with(|| format!("{address:x}"))
            .clone()
    }

    /// Allocate the next synthetic identifier (`-1`, `-2`, …).
    pub fn next_synthetic(&mut self) -> String {
        let id = self.next_synthetic.to_string();
        self.next_synthetic -= 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_idempotent() {
        let mut ids = IdTable::new();
        let first = ids.resolve(0x7fd3_c886_8e48);
        let second = ids.resolve(0x7fd3_c886_8e48);
        assert_eq!(first, second);
        assert_eq!(first, "7fd3c8868e48");
    }

    #[test]
    fn synthetic_ids_count_down_from_minus_one() {
        let mut ids = IdTable::new();
        assert_eq!(ids.next_synthetic(), "-1");
        assert_eq!(ids.next_synthetic(), "-2");
        assert_eq!(ids.next_synthetic(), "-3");
    }

    #[test]
    fn id_for_branches_on_the_sentinel() {
        let mut ids = IdTable::new();
        assert_eq!(ids.id_for(0), "-1");
        assert_eq!(ids.id_for(0x10), "10");
        assert_eq!(ids.id_for(0), "-2");
        assert_eq!(ids.id_for(0x10), "10");
    }

    #[test]
    fn synthetic_space_is_disjoint_from_hex() {
        let mut ids = IdTable::new();
        let synthetic = ids.next_synthetic();
        assert!(synthetic.starts_with('-'));
        // No hex id can start with '-': the encoding is bare lowercase hex.
        assert!(!ids.resolve(u64::MAX).starts_with('-'));
    }
}
