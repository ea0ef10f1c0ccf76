use thiserror::Error;

/// Errors surfaced by the public tree operations.
///
/// All of these are reported synchronously and leave the tree unchanged.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `add` was called with an id that is already present in the tree.
    #[error("sequence id is already present in the tree")]
    DuplicateId,

    /// `find_id` was called with an id that was never added.
    #[error("sequence id was never added to the tree")]
    UnknownId,

    /// `add` was called with a zero-length sequence.
    #[error("cannot add an empty sequence")]
    EmptySequence,
}
