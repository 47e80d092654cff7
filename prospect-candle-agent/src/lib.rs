//! A loss-averse RL agent implemented with [candle](https://crates.io/crates/candle-core).
//!
//! The crate provides [`cpt_ddpg::CptDdpg`], a deterministic-policy
//! actor-critic agent that optimizes rewards reshaped by cumulative prospect
//! theory ([`cpt::CptConfig`]), together with the multilayer perceptron
//! function approximators ([`mlp::Mlp`]) and the tensor-backed replay storage
//! ([`TensorBatch`]) it runs on.
pub mod cpt;
pub mod cpt_ddpg;
pub mod mlp;
pub mod model;
pub mod opt;
mod tensor_batch;
pub mod util;
use candle_core::Tensor;
use serde::{Deserialize, Serialize};
pub use tensor_batch::{TensorBatch, ZeroTensor};

/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support
/// serialization.
#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl From<candle_core::Device> for Device {
    fn from(device: candle_core::Device) -> Self {
        match device {
            candle_core::Device::Cpu => Self::Cpu,
            candle_core::Device::Cuda(_cuda_device) => {
                unimplemented!();
            }
            _ => unimplemented!(),
        }
    }
}

impl Into<candle_core::Device> for Device {
    fn into(self) -> candle_core::Device {
        match self {
            Self::Cpu => candle_core::Device::Cpu,
            Self::Cuda(n) => candle_core::Device::new_cuda(n).unwrap(),
        }
    }
}

/// Activation applied to the output layer of a model.
#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
pub enum Activation {
    /// No activation, a linear output.
    None,

    /// Rectified linear unit.
    Relu,

    /// Hyperbolic tangent, bounding each output dimension to `[-1, 1]`.
    Tanh,
}

impl Activation {
    /// Applies the activation.
    pub fn forward(&self, xs: &Tensor) -> Tensor {
        match self {
            Self::None => xs.clone(),
            Self::Relu => xs.relu().unwrap(),
            Self::Tanh => xs.tanh().unwrap(),
        }
    }
}
