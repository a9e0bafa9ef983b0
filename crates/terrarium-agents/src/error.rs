//! Error types for the `terrarium-agents` crate.
//!
//! Every variant here is an invariant violation: a programming error in the
//! registry or its callers. Ordinary lookup misses (unknown identifier, no
//! valid neighbor, failed hunt) are reported as `None` or `false` and never
//! reach this type.

use terrarium_types::{AgentId, CellCoord};

/// Registry invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// An identifier was registered twice.
    #[error("agent {0} is already registered")]
    DuplicateIdentifier(AgentId),

    /// A cell lists an identifier the registry does not know.
    #[error("cell lists unknown agent {0}")]
    UnknownAgent(AgentId),

    /// The registry's recorded cell and the cell occupant sets disagree.
    #[error("agent {agent} is recorded at {expected:?} but found at {found:?}")]
    CellDesync {
        /// The agent whose location is inconsistent.
        agent: AgentId,
        /// The cell the registry records for the agent.
        expected: Option<CellCoord>,
        /// The cell whose occupant set actually holds the agent.
        found: Option<CellCoord>,
    },

    /// A cell lists an agent the registry records as unplaced.
    #[error("agent {agent} has no cell but is listed in {cell}")]
    UnplacedAgentInCell {
        /// The unplaced agent.
        agent: AgentId,
        /// The cell that lists it.
        cell: CellCoord,
    },
}
