//! Configuration of the CPT-DDPG agent.
use super::{ActorConfig, CriticConfig};
use crate::{
    cpt::CptConfig,
    model::{SubModel1, SubModel2},
    util::OutDim,
    Device,
};
use anyhow::Result;
use candle_core::Tensor;
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`CptDdpg`](super::CptDdpg).
#[derive(Debug, Deserialize, Serialize)]
#[serde(bound = "Q::Config: DeserializeOwned + Serialize, P::Config: DeserializeOwned + Serialize")]
pub struct CptDdpgConfig<Q, P>
where
    Q: SubModel2<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    /// Configuration of the actor model.
    pub actor_config: ActorConfig<P::Config>,

    /// Configuration of the critic model.
    pub critic_config: CriticConfig<Q::Config>,

    /// Parameters of the prospect-theoretic reward transform.
    pub cpt_config: CptConfig,

    /// Discount factor, in `(0, 1)`.
    pub gamma: f64,

    /// Soft-update rate of the target networks, in `(0, 1)`.
    pub tau: f64,

    /// Number of parameter updates per optimization step.
    pub n_updates_per_opt: usize,

    /// Batch size for training.
    pub batch_size: usize,

    /// Initial training mode.
    pub train: bool,

    /// Device for actor/critic models.
    pub device: Option<Device>,
}

impl<Q, P> Clone for CptDdpgConfig<Q, P>
where
    Q: SubModel2<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    fn clone(&self) -> Self {
        Self {
            actor_config: self.actor_config.clone(),
            critic_config: self.critic_config.clone(),
            cpt_config: self.cpt_config.clone(),
            gamma: self.gamma,
            tau: self.tau,
            n_updates_per_opt: self.n_updates_per_opt,
            batch_size: self.batch_size,
            train: self.train,
            device: self.device.clone(),
        }
    }
}

impl<Q, P> PartialEq for CptDdpgConfig<Q, P>
where
    Q: SubModel2<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        self.actor_config == other.actor_config
            && self.critic_config == other.critic_config
            && self.cpt_config == other.cpt_config
            && self.gamma == other.gamma
            && self.tau == other.tau
            && self.n_updates_per_opt == other.n_updates_per_opt
            && self.batch_size == other.batch_size
            && self.train == other.train
            && self.device == other.device
    }
}

impl<Q, P> Default for CptDdpgConfig<Q, P>
where
    Q: SubModel2<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    fn default() -> Self {
        Self {
            actor_config: Default::default(),
            critic_config: Default::default(),
            cpt_config: Default::default(),
            gamma: 0.99,
            tau: 0.005,
            n_updates_per_opt: 1,
            batch_size: 64,
            train: false,
            device: None,
        }
    }
}

impl<Q, P> CptDdpgConfig<Q, P>
where
    Q: SubModel2<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
{
    /// Sets the number of parameter update steps per optimization step.
    pub fn n_updates_per_opt(mut self, v: usize) -> Self {
        self.n_updates_per_opt = v;
        self
    }

    /// Batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Soft-update rate.
    pub fn soft_update_rate(mut self, v: f64) -> Self {
        self.tau = v;
        self
    }

    /// Parameters of the reward transform.
    pub fn cpt_config(mut self, v: CptConfig) -> Self {
        self.cpt_config = v;
        self
    }

    /// Configuration of actor.
    pub fn actor_config(mut self, actor_config: ActorConfig<P::Config>) -> Self {
        self.actor_config = actor_config;
        self
    }

    /// Configuration of critic.
    pub fn critic_config(mut self, critic_config: CriticConfig<Q::Config>) -> Self {
        self.critic_config = critic_config;
        self
    }

    /// Device.
    pub fn device(mut self, device: candle_core::Device) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Constructs [`CptDdpgConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of CPT-DDPG agent from {}", path_.to_str().unwrap());
        Ok(b)
    }

    /// Saves [`CptDdpgConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of CPT-DDPG agent into {}", path_.to_str().unwrap());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CptDdpgConfig;
    use crate::{
        cpt::CptConfig,
        cpt_ddpg::{ActorConfig, CriticConfig},
        mlp::{Mlp, MlpConfig},
        Activation,
    };
    use tempdir::TempDir;

    #[test]
    fn test_yaml_roundtrip() {
        let config = CptDdpgConfig::<Mlp, Mlp>::default()
            .actor_config(
                ActorConfig::default().pi_config(MlpConfig::new(
                    10,
                    vec![256, 256],
                    2,
                    Activation::Tanh,
                )),
            )
            .critic_config(
                CriticConfig::default().q_config(MlpConfig::new(
                    12,
                    vec![256, 256],
                    1,
                    Activation::None,
                )),
            )
            .cpt_config(CptConfig::default().lambda(2.0))
            .soft_update_rate(0.01)
            .batch_size(32);

        let dir = TempDir::new("cpt_ddpg_config").unwrap();
        let path = dir.path().join("config.yaml");
        config.save(&path).unwrap();
        let loaded = CptDdpgConfig::<Mlp, Mlp>::load(&path).unwrap();
        assert_eq!(config, loaded);
    }
}
