//! The fixed catalog of tile patterns.
//!
//! Patterns live in `assets/tiles.json` as lists of port pairs at rotation 0
//! and are embedded into the binary. The file is validated on first use.

use crate::error::{Result, TsuroError};
use crate::port::Port;
use std::sync::LazyLock;
use tracing::{debug, instrument};

/// Number of distinct tile patterns.
pub const TILE_COUNT: usize = 35;

const CATALOG_JSON: &str = include_str!("../assets/tiles.json");

static CATALOG: LazyLock<Result<Catalog>> = LazyLock::new(|| Catalog::parse(CATALOG_JSON));

/// Validated tile patterns, stored as exit tables indexed by port ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    patterns: Vec<[Port; 8]>,
}

impl Catalog {
    /// Returns the embedded catalog.
    pub fn get() -> Result<&'static Catalog> {
        CATALOG.as_ref().map_err(Clone::clone)
    }

    /// Parses and validates a catalog document.
    ///
    /// The document must hold exactly [`TILE_COUNT`] entries, each a list of
    /// four port pairs that together use every port exactly once.
    #[instrument(skip(json))]
    pub fn parse(json: &str) -> Result<Catalog> {
        let raw: Vec<Vec<[Port; 2]>> =
            serde_json::from_str(json).map_err(|e| TsuroError::InvalidCatalog {
                reason: e.to_string(),
            })?;

        if raw.len() != TILE_COUNT {
            return Err(TsuroError::InvalidCatalog {
                reason: format!("expected {TILE_COUNT} tiles, found {}", raw.len()),
            });
        }

        let patterns = raw
            .iter()
            .enumerate()
            .map(|(index, pairs)| exit_table(index, pairs))
            .collect::<Result<Vec<_>>>()?;

        debug!(tiles = patterns.len(), "Tile catalog loaded");
        Ok(Self { patterns })
    }

    /// Exit table for a pattern: `table[p.ordinal()]` is the port paired with `p`.
    pub fn exits(&self, index: usize) -> Option<&[Port; 8]> {
        self.patterns.get(index)
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn exit_table(index: usize, pairs: &[[Port; 2]]) -> Result<[Port; 8]> {
    let invalid = |reason: String| TsuroError::InvalidCatalog {
        reason: format!("tile {index}: {reason}"),
    };

    if pairs.len() != 4 {
        return Err(invalid(format!("expected 4 connections, found {}", pairs.len())));
    }

    let mut table: [Option<Port>; 8] = [None; 8];
    for &[a, b] in pairs {
        if a == b {
            return Err(invalid(format!("port {a} connects to itself")));
        }
        for (from, to) in [(a, b), (b, a)] {
            if table[from.ordinal()].replace(to).is_some() {
                return Err(invalid(format!("port {from} is used twice")));
            }
        }
    }

    let mut exits = [Port::A; 8];
    for (slot, exit) in exits.iter_mut().zip(table) {
        *slot = exit.ok_or_else(|| invalid("not every port is connected".to_string()))?;
    }
    Ok(exits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_is_valid() {
        let catalog = Catalog::get().unwrap();
        assert_eq!(catalog.len(), TILE_COUNT);
        assert!(catalog.exits(TILE_COUNT).is_none());
    }

    #[test]
    fn test_first_pattern_pairs_each_side() {
        let exits = Catalog::get().unwrap().exits(0).unwrap();
        assert_eq!(exits[Port::A.ordinal()], Port::B);
        assert_eq!(exits[Port::H.ordinal()], Port::G);
    }

    #[test]
    fn test_rejects_port_used_twice() {
        let mut tiles = vec![r#"[["A","B"],["C","D"],["E","F"],["G","H"]]"#; TILE_COUNT - 1];
        tiles.push(r#"[["A","B"],["A","D"],["E","F"],["G","H"]]"#);
        let json = format!("[{}]", tiles.join(","));
        let err = Catalog::parse(&json).unwrap_err();
        assert!(err.to_string().contains("used twice"), "{err}");
    }

    #[test]
    fn test_rejects_wrong_count() {
        let err = Catalog::parse(r#"[[["A","B"],["C","D"],["E","F"],["G","H"]]]"#).unwrap_err();
        assert!(matches!(err, TsuroError::InvalidCatalog { .. }));
    }
}
