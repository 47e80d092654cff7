//! Generic transition batches.
use crate::{error::ProspectError, TransitionBatch};

/// Basic operations on a batch of observations or actions.
///
/// A [`BatchBase`] doubles as the storage backend of
/// [`SimpleReplayBuffer`](super::SimpleReplayBuffer): the buffer owns one
/// instance per transition field and pushes incoming batches into it at the
/// write cursor.
pub trait BatchBase {
    /// Creates a new batch with the specified capacity.
    fn new(capacity: usize) -> Self;

    /// Adds data at the specified index, wrapping around at the capacity.
    fn push(&mut self, ix: usize, data: Self);

    /// Retrieves samples at the specified indices.
    fn sample(&self, ixs: &Vec<usize>) -> Self;

    /// Validates that `data` is shape-compatible with this storage.
    ///
    /// Called by the replay buffer before any field is written, so a failed
    /// push cannot leave a partially written slot.
    fn check(&self, _data: &Self) -> Result<(), ProspectError> {
        Ok(())
    }
}

/// A batch of transitions over generic observation and action storage.
pub struct GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Observations.
    pub obs: O,

    /// Actions.
    pub act: A,

    /// Next observations.
    pub next_obs: O,

    /// Raw rewards.
    pub reward: Vec<f32>,

    /// Episode termination flags in `{0, 1}`.
    pub is_done: Vec<i8>,
}

impl<O, A> TransitionBatch for GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type ObsBatch = O;
    type ActBatch = A;

    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Vec<i8>,
    ) {
        (self.obs, self.act, self.next_obs, self.reward, self.is_done)
    }

    fn len(&self) -> usize {
        self.reward.len()
    }

    fn obs(&self) -> &Self::ObsBatch {
        &self.obs
    }

    fn act(&self) -> &Self::ActBatch {
        &self.act
    }
}

impl<O, A> GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Creates a batch of a single transition.
    pub fn from_single(obs: O, act: A, next_obs: O, reward: f32, is_done: i8) -> Self {
        Self {
            obs,
            act,
            next_obs,
            reward: vec![reward],
            is_done: vec![is_done],
        }
    }

    /// Creates an empty batch with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: Vec::with_capacity(capacity),
            is_done: Vec::with_capacity(capacity),
        }
    }
}
