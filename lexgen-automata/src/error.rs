//! Error types for the automata layer.

use thiserror::Error;

/// Errors that can arise from [`crate::charset::CharSet`] operations.
///
/// These are distinct from the accumulated [`lexgen_compiler`] diagnostics:
/// they signal a misuse at a call site (asking an empty set for its minimum
/// element) rather than a malformed specification.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharSetError {
    /// Raised by [`crate::charset::CharSet::min_element`] and
    /// [`crate::charset::CharSet::max_element`] when the set is empty.
    #[error("the character set is empty")]
    EmptySet,
}
