//! Environment step.
use super::Env;

/// Additional information to `Obs` and `Act`.
pub trait Info {}

impl Info for () {}

/// An action, observation and reward tuple `(a_t, o_t+1, r_t)` emitted by an
/// environment at every interaction step.
///
/// The raw reward is carried as-is; any subjective reshaping happens inside
/// the agent's optimization step, never here.
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation after the step.
    pub obs: E::Obs,

    /// Raw reward.
    pub reward: f32,

    /// Flag denoting if the episode ended with this step, in `{0, 1}`.
    pub is_done: i8,

    /// Information defined by the user.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(obs: E::Obs, act: E::Act, reward: f32, is_done: i8, info: E::Info) -> Self {
        Step {
            act,
            obs,
            reward,
            is_done,
            info,
        }
    }

    /// Returns `true` if the episode ended with this step.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.is_done == 1
    }
}
