use candle_core::{DType, Device, IndexOp, Tensor};
use prospect_core::{error::ProspectError, generic_replay_buffer::BatchBase};

/// Adds capability of constructing [`Tensor`] with a static method.
///
/// [`Tensor`]: candle_core::Tensor
pub trait ZeroTensor {
    /// Constructs zero tensor.
    fn zeros(shape: &[usize]) -> candle_core::Result<Tensor>;
}

impl ZeroTensor for u8 {
    fn zeros(shape: &[usize]) -> candle_core::Result<Tensor> {
        Tensor::zeros(shape, DType::U8, &Device::Cpu)
    }
}

impl ZeroTensor for f32 {
    fn zeros(shape: &[usize]) -> candle_core::Result<Tensor> {
        Tensor::zeros(shape, DType::F32, &Device::Cpu)
    }
}

impl ZeroTensor for i64 {
    fn zeros(shape: &[usize]) -> candle_core::Result<Tensor> {
        Tensor::zeros(shape, DType::I64, &Device::Cpu)
    }
}

/// A buffer consisting of a [`Tensor`].
///
/// The first axis is the batch axis; the remaining axes are the feature
/// shape, fixed at the first push.
///
/// [`Tensor`]: candle_core::Tensor
#[derive(Clone, Debug)]
pub struct TensorBatch {
    buf: Option<Tensor>,
    capacity: usize,
}

impl TensorBatch {
    /// Wraps a tensor whose first axis is the batch axis.
    pub fn from_tensor(t: Tensor) -> Self {
        let capacity = t.dims()[0] as _;
        Self {
            buf: Some(t),
            capacity,
        }
    }

    /// Moves the internal buffer to the given device.
    pub fn to(&mut self, device: &Device) -> candle_core::Result<()> {
        if let Some(buf) = &self.buf {
            self.buf = Some(buf.to_device(device)?);
        }
        Ok(())
    }
}

impl BatchBase for TensorBatch {
    fn new(capacity: usize) -> Self {
        Self {
            buf: None,
            capacity,
        }
    }

    /// Pushes given data.
    ///
    /// If the internal buffer is empty, it will be initialized with the shape
    /// `[capacity, data.buf.dims()[1..]]`.
    fn push(&mut self, index: usize, data: Self) {
        if data.buf.is_none() {
            return;
        }

        let batch_size = data.buf.as_ref().unwrap().dims()[0];
        if batch_size == 0 {
            return;
        }

        if self.buf.is_none() {
            let mut shape = data.buf.as_ref().unwrap().dims().to_vec();
            shape[0] = self.capacity;
            let dtype = data.buf.as_ref().unwrap().dtype();
            let device = Device::Cpu;
            self.buf = Some(Tensor::zeros(shape, dtype, &device).unwrap());
        }

        if index + batch_size > self.capacity {
            let batch_size = self.capacity - index;
            let data = &data.buf.unwrap();
            let data1 = data.i((..batch_size,)).unwrap();
            let data2 = data.i((batch_size..,)).unwrap();
            self.buf
                .as_mut()
                .unwrap()
                .slice_set(&data1, 0, index)
                .unwrap();
            self.buf.as_mut().unwrap().slice_set(&data2, 0, 0).unwrap();
        } else {
            self.buf
                .as_mut()
                .unwrap()
                .slice_set(&data.buf.unwrap(), 0, index)
                .unwrap();
        }
    }

    fn sample(&self, ixs: &Vec<usize>) -> Self {
        let capacity = ixs.len();
        let ixs = {
            let device = self.buf.as_ref().unwrap().device();
            let ixs = ixs.iter().map(|x| *x as u32).collect();
            Tensor::from_vec(ixs, &[capacity], device).unwrap()
        };
        let buf = Some(self.buf.as_ref().unwrap().index_select(&ixs, 0).unwrap());
        Self { buf, capacity }
    }

    /// Validates the feature shape of `data` against the established buffer.
    ///
    /// The check compares the flattened feature dimension, so a mismatching
    /// state or action vector length is rejected before any slot is written.
    fn check(&self, data: &Self) -> Result<(), ProspectError> {
        let (buf, data) = match (&self.buf, &data.buf) {
            (Some(buf), Some(data)) => (buf, data),
            _ => return Ok(()),
        };

        let expected: usize = buf.dims()[1..].iter().product();
        let actual: usize = data.dims()[1..].iter().product();
        if expected != actual {
            return Err(ProspectError::DimensionMismatch {
                field: "tensor",
                expected,
                actual,
            });
        }
        Ok(())
    }
}

impl From<TensorBatch> for Tensor {
    fn from(b: TensorBatch) -> Self {
        b.buf.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_sample() {
        let mut batch = TensorBatch::new(4);
        let data =
            Tensor::from_slice(&[1f32, 2.0, 3.0, 4.0], (2, 2), &Device::Cpu).unwrap();
        batch.push(0, TensorBatch::from_tensor(data));

        let sampled = batch.sample(&vec![1, 1]);
        let t: Tensor = sampled.into();
        assert_eq!(t.dims(), [2, 2]);
        assert_eq!(t.to_vec2::<f32>().unwrap()[0], vec![3.0, 4.0]);
    }

    #[test]
    fn test_wraparound_push() {
        let mut batch = TensorBatch::new(3);
        let data = Tensor::from_slice(&[0f32, 1.0, 2.0], (3, 1), &Device::Cpu).unwrap();
        batch.push(0, TensorBatch::from_tensor(data));

        let data = Tensor::from_slice(&[3f32, 4.0], (2, 1), &Device::Cpu).unwrap();
        batch.push(2, TensorBatch::from_tensor(data));

        let t: Tensor = batch.sample(&vec![0, 1, 2]).into();
        assert_eq!(
            t.flatten_all().unwrap().to_vec1::<f32>().unwrap(),
            vec![4.0, 1.0, 3.0]
        );
    }

    #[test]
    fn test_check_rejects_wrong_dim() {
        let mut batch = TensorBatch::new(4);
        let data = Tensor::zeros((1, 3), DType::F32, &Device::Cpu).unwrap();
        batch.push(0, TensorBatch::from_tensor(data));

        let wrong = TensorBatch::from_tensor(Tensor::zeros((1, 5), DType::F32, &Device::Cpu).unwrap());
        assert!(matches!(
            batch.check(&wrong),
            Err(ProspectError::DimensionMismatch {
                expected: 3,
                actual: 5,
                ..
            })
        ));

        let ok = TensorBatch::from_tensor(Tensor::zeros((1, 3), DType::F32, &Device::Cpu).unwrap());
        assert!(batch.check(&ok).is_ok());
    }
}
