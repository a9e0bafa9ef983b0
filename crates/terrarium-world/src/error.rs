//! Error types for the `terrarium-world` crate.
//!
//! Neighbor and cell lookups report absence through `Option`; the only
//! error here is a lattice that cannot be built.

/// Errors that can occur during lattice operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The lattice was requested with a zero dimension.
    #[error("invalid grid dimensions {height}x{width}: both must be at least 1")]
    InvalidDimensions {
        /// Requested number of rows.
        height: usize,
        /// Requested number of columns.
        width: usize,
    },
}
