//! CPT-DDPG agent.
//!
//! A deterministic-policy actor-critic agent ([`CptDdpg`]) whose critic is
//! regressed onto rewards reshaped by cumulative prospect theory
//! ([`CptConfig`](crate::cpt::CptConfig)). Target copies of both networks are
//! blended towards the live parameters by a soft update after every
//! optimization step.
mod actor;
mod base;
mod config;
mod critic;
pub use actor::{Actor, ActorConfig};
pub use base::CptDdpg;
pub use config::CptDdpgConfig;
pub use critic::{Critic, CriticConfig};
