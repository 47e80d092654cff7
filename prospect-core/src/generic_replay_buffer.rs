//! Generic implementation of a uniform-sampling replay buffer.
//!
//! [`SimpleReplayBuffer`] stores transitions of arbitrary observation and
//! action types behind the [`BatchBase`] abstraction and samples them
//! uniformly at random with a seeded generator. Prioritized sampling is
//! deliberately not provided.
mod base;
mod batch;
mod config;
pub use base::SimpleReplayBuffer;
pub use batch::{BatchBase, GenericTransitionBatch};
pub use config::SimpleReplayBufferConfig;
