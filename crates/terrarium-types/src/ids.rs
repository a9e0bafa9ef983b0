//! Identifier and coordinate types.
//!
//! Agents are keyed by an [`AgentId`] issued from a monotonically increasing
//! counter owned by the agent registry. Identifiers are never reused, so an
//! id that has been removed can never alias a newer agent.
//!
//! Cells are addressed by [`CellCoord`] (row, column). Cross-references
//! between agents and cells are always stored as these plain values and
//! resolved through the owning arena.

use serde::{Deserialize, Serialize};

/// Unique identifier for an agent in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Row/column address of a cell in the lattice.
///
/// `row` indexes the height dimension and `col` the width dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    /// Row index (`0..height`).
    pub row: usize,
    /// Column index (`0..width`).
    pub col: usize,
}

impl CellCoord {
    /// Create a coordinate from a row and column.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl core::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_by_issue_counter() {
        let first = AgentId(3);
        let second = AgentId(10);
        assert!(first < second);
        assert_eq!(second.0, 10);
    }

    #[test]
    fn id_display_is_prefixed() {
        assert_eq!(AgentId(7).to_string(), "#7");
    }

    #[test]
    fn coord_serializes_as_struct() {
        let json = serde_json::to_string(&CellCoord::new(1, 2)).ok();
        assert_eq!(json.as_deref(), Some(r#"{"row":1,"col":2}"#));
    }

    #[test]
    fn coords_sort_row_major() {
        let mut coords = vec![CellCoord::new(1, 0), CellCoord::new(0, 2), CellCoord::new(0, 1)];
        coords.sort();
        assert_eq!(
            coords,
            vec![CellCoord::new(0, 1), CellCoord::new(0, 2), CellCoord::new(1, 0)]
        );
    }
}
