//! CPT-DDPG agent.
use super::{Actor, CptDdpgConfig, Critic};
use crate::{
    cpt::CptConfig,
    model::{SubModel1, SubModel2},
    util::{track, OutDim},
};
use anyhow::Result;
use candle_core::{Device, Tensor, D};
use candle_nn::loss::mse;
use log::trace;
use prospect_core::{
    error::ProspectError,
    record::{Record, RecordValue},
    Agent, Configurable, Env, Policy, ReplayBufferBase, TransitionBatch,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, fs, marker::PhantomData, path::Path};

/// Deterministic-policy actor-critic agent with a prospect-theoretic
/// reward transform.
///
/// The critic is regressed onto bootstrapped targets built from rewards
/// reshaped by [`CptConfig`]; the actor ascends the critic's value estimate.
/// Time-lagged copies of both networks stabilize the targets and are blended
/// towards the live parameters by rate `tau` after every update.
///
/// Rewards are shaped only inside the optimization step. The replay buffer
/// stores raw rewards, so the transform can be swapped without invalidating
/// collected experience.
pub struct CptDdpg<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Output = Tensor>,
    P: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: Into<Q::Input1> + Into<P::Input>,
    E::Act: From<Tensor>,
    Q::Input2: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input1> + Into<P::Input> + Clone,
    <R::Batch as TransitionBatch>::ActBatch: Into<Q::Input2>,
{
    pub(super) pi: Actor<P>,
    pub(super) pi_tgt: Actor<P>,
    pub(super) qnet: Critic<Q>,
    pub(super) qnet_tgt: Critic<Q>,
    pub(super) cpt: CptConfig,
    pub(super) gamma: f64,
    pub(super) tau: f64,
    pub(super) n_updates_per_opt: usize,
    pub(super) batch_size: usize,
    pub(super) train: bool,
    pub(super) n_opts: usize,
    pub(super) device: Device,
    pub(super) phantom: PhantomData<(E, R)>,
}

impl<E, Q, P, R> CptDdpg<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Output = Tensor>,
    P: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: Into<Q::Input1> + Into<P::Input>,
    E::Act: From<Tensor>,
    Q::Input2: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input1> + Into<P::Input> + Clone,
    <R::Batch as TransitionBatch>::ActBatch: Into<Q::Input2>,
{
    /// Regresses the critic onto the bootstrapped target built from the
    /// frozen target networks and the shaped rewards.
    ///
    /// The target is detached, so no gradient flows through the target
    /// networks or the reward transform.
    fn update_critic(&mut self, batch: R::Batch) -> Result<f32> {
        let loss = {
            let (obs, act, next_obs, reward, is_done) = batch.unpack();
            let batch_size = reward.len();
            let reward = {
                let shaped = self.cpt.utility_batch(&reward);
                Tensor::from_slice(&shaped[..], (batch_size,), &self.device)?
            };
            let not_done = {
                let not_done = is_done.iter().map(|e| 1f32 - *e as f32).collect::<Vec<_>>();
                Tensor::from_slice(&not_done[..], (batch_size,), &self.device)?
            };

            let tgt = {
                let next_a = self.pi_tgt.forward(&next_obs.clone().into());
                let next_q = self
                    .qnet_tgt
                    .forward(&next_obs.into(), &next_a.into())
                    .squeeze(D::Minus1)?;
                let cont = (not_done * self.gamma)?;
                (reward + (cont * next_q)?)?
            }
            .detach();

            debug_assert_eq!(tgt.dims(), [batch_size]);

            let pred = self
                .qnet
                .forward(&obs.into(), &act.into())
                .squeeze(D::Minus1)?;
            mse(&pred, &tgt)?
        };

        self.qnet.backward_step(&loss)?;

        let loss = loss.to_scalar::<f32>()?;
        if !loss.is_finite() {
            return Err(ProspectError::NonFiniteLoss {
                name: "critic",
                value: loss,
            }
            .into());
        }
        Ok(loss)
    }

    /// Ascends the critic's value estimate at the actor's own actions.
    ///
    /// The critic's variables receive gradients but only the actor's
    /// optimizer steps, so the critic is held fixed for this update.
    fn update_actor(&mut self, obs: <R::Batch as TransitionBatch>::ObsBatch) -> Result<f32> {
        let loss = {
            let act = self.pi.forward(&obs.clone().into());
            let qval = self
                .qnet
                .forward(&obs.into(), &act.into())
                .squeeze(D::Minus1)?;
            qval.neg()?.mean_all()?
        };

        self.pi.backward_step(&loss)?;

        Ok(loss.to_scalar::<f32>()?)
    }

    fn soft_update(&mut self) -> Result<()> {
        track(self.qnet_tgt.get_varmap(), self.qnet.get_varmap(), self.tau)?;
        track(self.pi_tgt.get_varmap(), self.pi.get_varmap(), self.tau)?;
        Ok(())
    }

    fn opt_(&mut self, buffer: &mut R) -> Result<Record> {
        let mut loss_critic = 0f32;
        let mut loss_actor = 0f32;

        for _ in 0..self.n_updates_per_opt {
            trace!("batch()");
            let batch = buffer.batch(self.batch_size)?;
            let obs = batch.obs().clone();

            trace!("update_critic()");
            loss_critic += self.update_critic(batch)?;

            trace!("update_actor()");
            loss_actor += self.update_actor(obs)?;

            trace!("soft_update()");
            self.soft_update()?;

            self.n_opts += 1;
        }

        loss_critic /= self.n_updates_per_opt as f32;
        loss_actor /= self.n_updates_per_opt as f32;

        Ok(Record::from_slice(&[
            ("loss_critic", RecordValue::Scalar(loss_critic)),
            ("loss_actor", RecordValue::Scalar(loss_actor)),
        ]))
    }

    /// Returns the live actor.
    pub fn actor(&self) -> &Actor<P> {
        &self.pi
    }

    /// Returns the target actor.
    pub fn actor_tgt(&self) -> &Actor<P> {
        &self.pi_tgt
    }

    /// Returns the live critic.
    pub fn critic(&self) -> &Critic<Q> {
        &self.qnet
    }

    /// Returns the target critic.
    pub fn critic_tgt(&self) -> &Critic<Q> {
        &self.qnet_tgt
    }

    /// Returns the number of optimization steps taken so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }
}

impl<E, Q, P, R> Policy<E> for CptDdpg<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Output = Tensor>,
    P: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: Into<Q::Input1> + Into<P::Input>,
    E::Act: From<Tensor>,
    Q::Input2: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input1> + Into<P::Input> + Clone,
    <R::Batch as TransitionBatch>::ActBatch: Into<Q::Input2>,
{
    /// Deterministic forward pass through the live actor, detached from the
    /// autodiff graph.
    ///
    /// No exploration noise is added here; noise injection, if desired, is
    /// the caller's responsibility.
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let obs = obs.clone().into();
        let act = self.pi.forward(&obs);
        act.detach().into()
    }
}

impl<E, Q, P, R> Configurable for CptDdpg<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Output = Tensor>,
    P: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: Into<Q::Input1> + Into<P::Input>,
    E::Act: From<Tensor>,
    Q::Input2: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input1> + Into<P::Input> + Clone,
    <R::Batch as TransitionBatch>::ActBatch: Into<Q::Input2>,
{
    type Config = CptDdpgConfig<Q, P>;

    /// Constructs the agent.
    ///
    /// Target networks start as exact copies of the live networks.
    fn build(config: Self::Config) -> Self {
        let device: Device = config
            .device
            .expect("No device is given for CPT-DDPG agent")
            .into();
        let pi = Actor::build(config.actor_config, device.clone()).unwrap();
        let pi_tgt = pi.clone();
        let qnet = Critic::build(config.critic_config, device.clone()).unwrap();
        let qnet_tgt = qnet.clone();

        CptDdpg {
            pi,
            pi_tgt,
            qnet,
            qnet_tgt,
            cpt: config.cpt_config,
            gamma: config.gamma,
            tau: config.tau,
            n_updates_per_opt: config.n_updates_per_opt,
            batch_size: config.batch_size,
            train: config.train,
            n_opts: 0,
            device,
            phantom: PhantomData,
        }
    }
}

impl<E, Q, P, R> Agent<E, R> for CptDdpg<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Output = Tensor>,
    P: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: Into<Q::Input1> + Into<P::Input>,
    E::Act: From<Tensor>,
    Q::Input2: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input1> + Into<P::Input> + Clone,
    <R::Batch as TransitionBatch>::ActBatch: Into<Q::Input2>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt_with_record(&mut self, buffer: &mut R) -> Result<Record> {
        self.opt_(buffer)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(&path)?;
        self.qnet
            .save(&path.join("critic.safetensors").as_path())?;
        self.qnet_tgt
            .save(&path.join("critic_tgt.safetensors").as_path())?;
        self.pi.save(&path.join("actor.safetensors").as_path())?;
        self.pi_tgt
            .save(&path.join("actor_tgt.safetensors").as_path())?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet
            .load(&path.join("critic.safetensors").as_path())?;
        self.qnet_tgt
            .load(&path.join("critic_tgt.safetensors").as_path())?;
        self.pi.load(&path.join("actor.safetensors").as_path())?;
        self.pi_tgt
            .load(&path.join("actor_tgt.safetensors").as_path())?;
        Ok(())
    }
}
