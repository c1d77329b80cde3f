//! Error types for shading computations.

use thiserror::Error;

/// Result type for shading operations.
pub type ShadingResult<T> = Result<T, ShadingError>;

/// Errors that can occur while computing normals or tangent frames.
///
/// All of these are raised during validation, before any parallel work
/// is scheduled. Degenerate geometry is not an error: zero-area faces
/// and zero-length tangent directions produce zero vectors instead.
#[derive(Debug, Error)]
pub enum ShadingError {
    /// The face topology cannot be processed by the requested operation.
    #[error("invalid topology: {details}")]
    InvalidTopology {
        /// Description of the offending face or count.
        details: String,
    },

    /// A required named attribute is absent.
    #[error("missing attribute \"{name}\"")]
    MissingAttribute {
        /// Name that was looked up.
        name: String,
    },

    /// An index refers outside its domain.
    #[error("invalid {attribute} index {index} (domain has {limit} entries)")]
    InvalidIndex {
        /// Which array the index was read from.
        attribute: &'static str,
        /// The out-of-range index.
        index: u32,
        /// Size of the indexed domain.
        limit: usize,
    },

    /// A per-facevertex array does not line up with the topology.
    #[error("{attribute} has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Which array is mismatched.
        attribute: &'static str,
        /// Expected number of entries.
        expected: usize,
        /// Actual number of entries.
        actual: usize,
    },

    /// Reference totals exceed the range of the offset type.
    #[error("reference count overflow: {total} references exceed the counter range")]
    CountOverflow {
        /// Number of references requested (saturated at `u64::MAX`).
        total: u64,
    },
}

impl ShadingError {
    pub(crate) fn invalid_topology(details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            details: details.into(),
        }
    }

    pub(crate) fn missing(name: impl Into<String>) -> Self {
        Self::MissingAttribute { name: name.into() }
    }
}
