//! Generic uniform-sampling replay buffer.
use super::{BatchBase, GenericTransitionBatch, SimpleReplayBufferConfig};
use crate::{error::ProspectError, ExperienceBufferBase, ReplayBufferBase, TransitionBatch};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A fixed-capacity circular store of transitions with uniform sampling.
///
/// The write cursor `i` always points to the next slot to overwrite; after
/// `capacity` insertions every push evicts the oldest surviving transition.
/// Sampling draws indices independently and uniformly from `[0, size)` with
/// replacement, so a batch larger than the current size is permitted and
/// filled with duplicates.
///
/// Raw rewards are stored un-shaped: the subjective reward transform is
/// applied by the agent at update time, so it can be swapped without
/// invalidating the buffer contents.
pub struct SimpleReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Maximum number of transitions that can be stored.
    capacity: usize,

    /// Current insertion index.
    i: usize,

    /// Current number of stored transitions.
    size: usize,

    /// Storage for observations.
    obs: O,

    /// Storage for actions.
    act: A,

    /// Storage for next observations.
    next_obs: O,

    /// Storage for raw rewards.
    reward: Vec<f32>,

    /// Storage for termination flags.
    is_done: Vec<i8>,

    /// Random number generator for sampling.
    rng: StdRng,
}

impl<O, A> SimpleReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    #[inline]
    fn push_reward(&mut self, i: usize, b: &Vec<f32>) {
        let mut j = i;
        for r in b.iter() {
            self.reward[j] = *r;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    #[inline]
    fn push_is_done(&mut self, i: usize, b: &Vec<i8>) {
        let mut j = i;
        for d in b.iter() {
            self.is_done[j] = *d;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    fn sample_reward(&self, ixs: &Vec<usize>) -> Vec<f32> {
        ixs.iter().map(|ix| self.reward[*ix]).collect()
    }

    fn sample_is_done(&self, ixs: &Vec<usize>) -> Vec<i8> {
        ixs.iter().map(|ix| self.is_done[*ix]).collect()
    }
}

impl<O, A> ExperienceBufferBase for SimpleReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Item = GenericTransitionBatch<O, A>;

    fn len(&self) -> usize {
        self.size
    }

    /// Adds transitions to the buffer, overwriting the oldest slots when full.
    ///
    /// All fields are validated against the established storage shapes before
    /// anything is written; a rejected push leaves the buffer untouched.
    fn push(&mut self, tr: Self::Item) -> Result<()> {
        let len = tr.len(); // batch size
        let (obs, act, next_obs, reward, is_done) = tr.unpack();
        self.obs.check(&obs)?;
        self.act.check(&act)?;
        self.next_obs.check(&next_obs)?;

        self.obs.push(self.i, obs);
        self.act.push(self.i, act);
        self.next_obs.push(self.i, next_obs);
        self.push_reward(self.i, &reward);
        self.push_is_done(self.i, &is_done);

        self.i = (self.i + len) % self.capacity;
        self.size += len;
        if self.size >= self.capacity {
            self.size = self.capacity;
        }

        Ok(())
    }
}

impl<O, A> ReplayBufferBase for SimpleReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Config = SimpleReplayBufferConfig;
    type Batch = GenericTransitionBatch<O, A>;

    fn build(config: &Self::Config) -> Self {
        let capacity = config.capacity;

        Self {
            capacity,
            i: 0,
            size: 0,
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: vec![0.; capacity],
            is_done: vec![0; capacity],
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Samples a batch of transitions uniformly at random with replacement.
    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        if self.size == 0 {
            return Err(ProspectError::InsufficientData.into());
        }

        let ixs = (0..size)
            .map(|_| self.rng.gen_range(0..self.size))
            .collect::<Vec<_>>();

        Ok(Self::Batch {
            obs: self.obs.sample(&ixs),
            act: self.act.sample(&ixs),
            next_obs: self.next_obs.sample(&ixs),
            reward: self.sample_reward(&ixs),
            is_done: self.sample_is_done(&ixs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Row-wise `Vec<f32>` storage for tests.
    struct VecBatch {
        rows: Vec<Vec<f32>>,
    }

    impl BatchBase for VecBatch {
        fn new(capacity: usize) -> Self {
            Self {
                rows: vec![vec![]; capacity],
            }
        }

        fn push(&mut self, ix: usize, data: Self) {
            let capacity = self.rows.len();
            let mut j = ix;
            for row in data.rows.into_iter() {
                self.rows[j] = row;
                j += 1;
                if j == capacity {
                    j = 0;
                }
            }
        }

        fn sample(&self, ixs: &Vec<usize>) -> Self {
            Self {
                rows: ixs.iter().map(|ix| self.rows[*ix].clone()).collect(),
            }
        }

        fn check(&self, data: &Self) -> Result<(), ProspectError> {
            let expected = match self.rows.iter().find(|row| !row.is_empty()) {
                Some(row) => row.len(),
                None => return Ok(()),
            };
            for row in data.rows.iter() {
                if row.len() != expected {
                    return Err(ProspectError::DimensionMismatch {
                        field: "obs",
                        expected,
                        actual: row.len(),
                    });
                }
            }
            Ok(())
        }
    }

    fn transition(dim: usize, value: f32, is_done: i8) -> GenericTransitionBatch<VecBatch, VecBatch> {
        GenericTransitionBatch::from_single(
            VecBatch {
                rows: vec![vec![value; dim]],
            },
            VecBatch {
                rows: vec![vec![value; 2]],
            },
            VecBatch {
                rows: vec![vec![value + 1.0; dim]],
            },
            value,
            is_done,
        )
    }

    fn build_buffer(capacity: usize) -> SimpleReplayBuffer<VecBatch, VecBatch> {
        let config = SimpleReplayBufferConfig::default().capacity(capacity).seed(42);
        SimpleReplayBuffer::build(&config)
    }

    #[test]
    fn test_fifo_eviction() {
        let capacity = 4;
        let mut buffer = build_buffer(capacity);

        for k in 0..capacity + 2 {
            buffer.push(transition(3, k as f32, 0)).unwrap();
        }

        // After capacity + 2 insertions the two oldest transitions are gone
        // and the cursor has wrapped to slot 2.
        assert_eq!(buffer.len(), capacity);
        assert_eq!(buffer.i, 2);
        assert_eq!(buffer.reward, vec![4.0, 5.0, 2.0, 3.0]);
    }

    #[test]
    fn test_empty_buffer_fails() {
        let mut buffer = build_buffer(8);
        let err = buffer.batch(1).err().unwrap();
        match err.downcast_ref::<ProspectError>() {
            Some(ProspectError::InsufficientData) => {}
            _ => panic!("expected InsufficientData, got {:?}", err),
        }
    }

    #[test]
    fn test_single_transition_roundtrip() {
        let mut buffer = build_buffer(8);
        buffer.push(transition(3, 7.5, 1)).unwrap();

        let batch = buffer.batch(1).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.obs.rows[0], vec![7.5, 7.5, 7.5]);
        assert_eq!(batch.act.rows[0], vec![7.5, 7.5]);
        assert_eq!(batch.next_obs.rows[0], vec![8.5, 8.5, 8.5]);
        assert_eq!(batch.reward, vec![7.5]);
        assert_eq!(batch.is_done, vec![1]);
    }

    #[test]
    fn test_oversized_batch_permitted() {
        let mut buffer = build_buffer(8);
        buffer.push(transition(3, 1.0, 0)).unwrap();
        buffer.push(transition(3, 2.0, 0)).unwrap();

        let batch = buffer.batch(16).unwrap();
        assert_eq!(batch.len(), 16);
        for r in batch.reward.iter() {
            assert!(*r == 1.0 || *r == 2.0);
        }
    }

    #[test]
    fn test_dimension_mismatch_leaves_buffer_untouched() {
        let mut buffer = build_buffer(8);
        buffer.push(transition(3, 1.0, 0)).unwrap();

        let err = buffer.push(transition(5, 2.0, 0)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProspectError>(),
            Some(ProspectError::DimensionMismatch { .. })
        ));

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.i, 1);
        assert_eq!(buffer.reward[1], 0.0);
    }

    #[test]
    fn test_seeded_sampling_reproducible() {
        let mut b1 = build_buffer(8);
        let mut b2 = build_buffer(8);
        for k in 0..5 {
            b1.push(transition(3, k as f32, 0)).unwrap();
            b2.push(transition(3, k as f32, 0)).unwrap();
        }

        assert_eq!(b1.batch(4).unwrap().reward, b2.batch(4).unwrap().reward);
    }
}
