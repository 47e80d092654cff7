use super::{mlp_forward, MlpConfig};
use crate::model::{SubModel1, SubModel2};
use anyhow::Result;
use candle_core::{Device, Tensor, D};
use candle_nn::{linear, Linear, VarBuilder};

/// Returns vector of linear modules from [`MlpConfig`].
fn create_linear_layers(prefix: &str, vs: VarBuilder, config: &MlpConfig) -> Result<Vec<Linear>> {
    let mut in_out_pairs: Vec<(i64, i64)> = (0..config.units.len() - 1)
        .map(|i| (config.units[i], config.units[i + 1]))
        .collect();
    in_out_pairs.insert(0, (config.in_dim, config.units[0]));
    in_out_pairs.push((*config.units.last().unwrap(), config.out_dim));
    let vs = vs.pp(prefix);

    Ok(in_out_pairs
        .iter()
        .enumerate()
        .map(|(i, &(in_dim, out_dim))| {
            linear(in_dim as _, out_dim as _, vs.pp(format!("ln{}", i))).unwrap()
        })
        .collect())
}

/// Multilayer perceptron with ReLU activation on the hidden layers.
///
/// As a [`SubModel1`] it maps a single input tensor to an output tensor
/// (an actor). As a [`SubModel2`] it concatenates two inputs along the
/// feature axis before the first layer (a critic over state-action pairs).
#[derive(Debug)]
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    layers: Vec<Linear>,
}

fn _build(vs: VarBuilder, config: MlpConfig) -> Mlp {
    let device = vs.device().clone();
    let layers = create_linear_layers("mlp", vs, &config).unwrap();

    Mlp {
        config,
        device,
        layers,
    }
}

impl SubModel1 for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, xs: &Self::Input) -> Tensor {
        let xs = xs.to_device(&self.device).unwrap();
        mlp_forward(xs, &self.layers, &self.config.out_act)
    }

    fn build(vs: VarBuilder, config: Self::Config) -> Self {
        _build(vs, config)
    }
}

impl SubModel2 for Mlp {
    type Config = MlpConfig;
    type Input1 = Tensor;
    type Input2 = Tensor;
    type Output = Tensor;

    fn forward(&self, input1: &Self::Input1, input2: &Self::Input2) -> Self::Output {
        let input1: Tensor = input1.to_device(&self.device).unwrap();
        let input2: Tensor = input2.to_device(&self.device).unwrap();
        let input = Tensor::cat(&[input1, input2], D::Minus1)
            .unwrap()
            .to_device(&self.device)
            .unwrap();
        mlp_forward(input, &self.layers, &self.config.out_act)
    }

    fn build(vs: VarBuilder, config: Self::Config) -> Self {
        _build(vs, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Activation;
    use candle_core::DType;
    use candle_nn::VarMap;

    #[test]
    fn test_actor_output_bounded() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let config = MlpConfig::new(4, vec![16, 16], 2, Activation::Tanh);
        let mlp = <Mlp as SubModel1>::build(vb, config);

        let xs = Tensor::from_slice(&[10f32, -10.0, 3.0, 0.5], (1, 4), &Device::Cpu).unwrap();
        let ys = SubModel1::forward(&mlp, &xs);
        assert_eq!(ys.dims(), [1, 2]);
        for y in ys.flatten_all().unwrap().to_vec1::<f32>().unwrap() {
            assert!(y >= -1.0 && y <= 1.0);
        }
    }

    #[test]
    fn test_critic_concatenates_inputs() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let config = MlpConfig::new(6, vec![16, 16], 1, Activation::None);
        let mlp = <Mlp as SubModel2>::build(vb, config);

        let obs = Tensor::zeros((3, 4), DType::F32, &Device::Cpu).unwrap();
        let act = Tensor::zeros((3, 2), DType::F32, &Device::Cpu).unwrap();
        let q = SubModel2::forward(&mlp, &obs, &act);
        assert_eq!(q.dims(), [3, 1]);
    }
}
