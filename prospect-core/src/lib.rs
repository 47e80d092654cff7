#![warn(missing_docs)]
//! Backend-agnostic abstractions for loss-averse reinforcement learning.
//!
//! This crate defines the interfaces between the learning core and its
//! collaborators: the environment ([`Env`]), the policy ([`Policy`]), the
//! trainable agent ([`Agent`]) and the replay buffer ([`ReplayBufferBase`]).
//! It also provides a generic circular replay buffer
//! ([`generic_replay_buffer::SimpleReplayBuffer`]) and a [`record::Record`]
//! container through which agents report scalar metrics per optimization step.
pub mod error;
pub mod generic_replay_buffer;
pub mod record;

mod base;
pub use base::{
    Act, Agent, Configurable, Env, ExperienceBufferBase, Info, Obs, Policy, ReplayBufferBase, Step,
    TransitionBatch,
};
