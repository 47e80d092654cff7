//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum ProspectError {
    /// The replay buffer holds no transitions yet.
    ///
    /// Recoverable: keep collecting experience and retry the update later.
    #[error("replay buffer has no stored transitions")]
    InsufficientData,

    /// A transition's feature dimension disagrees with the buffer storage.
    ///
    /// The offending push leaves the buffer untouched.
    #[error("dimension mismatch in {field}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Name of the transition field that failed validation.
        field: &'static str,
        /// Feature dimension established by the buffer.
        expected: usize,
        /// Feature dimension of the rejected data.
        actual: usize,
    },

    /// An optimization step produced a non-finite loss.
    ///
    /// Fatal: non-finite parameters would propagate invisibly otherwise.
    #[error("non-finite {name} loss: {value}")]
    NonFiniteLoss {
        /// Name of the loss that diverged.
        name: &'static str,
        /// The offending value.
        value: f32,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
