//! Utilities.
use anyhow::Result;
use candle_core::{Tensor, WithDType};
use candle_nn::VarMap;
use log::trace;
use num_traits::AsPrimitive;
use std::convert::TryFrom;

/// Applies a soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    trace!("dest");
    let dest = dest.data().lock().unwrap();
    trace!("src");
    let src = src.data().lock().unwrap();

    dest.iter().for_each(|(k_dest, v_dest)| {
        let v_src = src.get(k_dest).unwrap();
        let t_src = v_src.as_tensor();
        let t_dest = v_dest.as_tensor();
        let t_dest = ((tau * t_src).unwrap() + (1.0 - tau) * t_dest).unwrap();
        v_dest.set(&t_dest).unwrap();
    });

    Ok(())
}

/// Copies all variables of `src` into `dest`.
///
/// Used to initialize a target network equal to its live counterpart.
pub fn copy_params(dest: &VarMap, src: &VarMap) -> Result<()> {
    track(dest, src, 1.0)
}

/// Flattens all variables of a [`VarMap`] into a single vector, ordered by
/// variable name.
pub fn flatten_params(varmap: &VarMap) -> Vec<f32> {
    let data = varmap.data().lock().unwrap();
    let mut keys: Vec<_> = data.keys().cloned().collect();
    keys.sort();

    keys.iter()
        .flat_map(|k| {
            data.get(k)
                .unwrap()
                .as_tensor()
                .flatten_all()
                .unwrap()
                .to_vec1::<f32>()
                .unwrap()
        })
        .collect()
}

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> i64;

    /// Sets the output dimension.
    fn set_out_dim(&mut self, v: i64);
}

/// Converts a vector into a 1- or 2-dimensional [`Tensor`].
pub fn vec_to_tensor<T1, T2>(v: Vec<T1>, add_batch_dim: bool) -> Result<Tensor>
where
    T1: AsPrimitive<T2>,
    T2: WithDType,
{
    let v = v.iter().map(|e| e.as_()).collect::<Vec<_>>();
    let t: Tensor = TryFrom::<Vec<T2>>::try_from(v)?;

    match add_batch_dim {
        true => Ok(t.unsqueeze(0)?),
        false => Ok(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device, Tensor};
    use candle_nn::Init;

    fn varmap_with(values: &[f32]) -> VarMap {
        let vm = VarMap::new();
        let init = Init::Randn {
            mean: 0.0,
            stdev: 1.0,
        };
        vm.get((values.len(),), "var1", init, DType::F32, &Device::Cpu)
            .unwrap();
        let t = Tensor::from_slice(values, (values.len(),), &Device::Cpu).unwrap();
        vm.data().lock().unwrap().get("var1").unwrap().set(&t).unwrap();
        vm
    }

    #[test]
    fn test_track() -> Result<()> {
        let tau = 0.7;
        let vm_src = varmap_with(&[1.0, 2.0, 3.0]);
        let vm_dest = varmap_with(&[4.0, 5.0, 6.0]);

        track(&vm_dest, &vm_src, tau)?;

        let expected: Vec<f32> = vec![1.0f32, 2.0, 3.0]
            .iter()
            .zip(vec![4.0f32, 5.0, 6.0].iter())
            .map(|(s, d)| tau as f32 * s + (1.0 - tau as f32) * d)
            .collect();
        let got = flatten_params(&vm_dest);
        for (e, g) in expected.iter().zip(got.iter()) {
            assert!((e - g).abs() < 1e-6);
        }

        Ok(())
    }

    #[test]
    fn test_track_tau_zero_is_identity() -> Result<()> {
        let vm_src = varmap_with(&[1.0, 2.0, 3.0]);
        let vm_dest = varmap_with(&[4.0, 5.0, 6.0]);

        track(&vm_dest, &vm_src, 0.0)?;
        track(&vm_dest, &vm_src, 0.0)?;
        track(&vm_dest, &vm_src, 0.0)?;

        assert_eq!(flatten_params(&vm_dest), vec![4.0, 5.0, 6.0]);
        Ok(())
    }

    #[test]
    fn test_track_tau_one_copies_src() -> Result<()> {
        let vm_src = varmap_with(&[1.0, 2.0, 3.0]);
        let vm_dest = varmap_with(&[4.0, 5.0, 6.0]);

        track(&vm_dest, &vm_src, 1.0)?;

        assert_eq!(flatten_params(&vm_dest), flatten_params(&vm_src));
        Ok(())
    }

    #[test]
    fn test_vec_to_tensor() -> Result<()> {
        let t = vec_to_tensor::<f32, f32>(vec![1.0, 2.0, 3.0], true)?;
        assert_eq!(t.dims(), [1, 3]);
        Ok(())
    }
}
