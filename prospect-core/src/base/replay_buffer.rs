//! Replay buffer interfaces.
use anyhow::Result;

/// Interface for buffers that store experiences from environments.
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer.
    type Item;

    /// Pushes a new experience into the buffer.
    ///
    /// Implementations must validate the item before mutating any storage,
    /// so that a rejected push leaves the buffer untouched.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the current number of experiences in the buffer.
    fn len(&self) -> usize;
}

/// Interface for replay buffers that generate batches for training.
pub trait ReplayBufferBase {
    /// Configuration of the buffer.
    type Config: Clone;

    /// The type of batches generated for training.
    type Batch;

    /// Builds the buffer from the given configuration.
    fn build(config: &Self::Config) -> Self;

    /// Samples a batch of the given size.
    ///
    /// Fails with [`ProspectError::InsufficientData`] when the buffer is empty.
    ///
    /// [`ProspectError::InsufficientData`]: crate::error::ProspectError::InsufficientData
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;
}
