use rand::distributions::{Distribution, Uniform};
use rand_pcg::Pcg64;

use crate::error::{self, Result};

mod basic_ops;
mod shape;
mod tensor_2d;
mod tensor_4d;

pub use shape::{Dims2, Dims4, FilterDims};

/// Owned, contiguous `f32` buffer laid out in row-major order.
#[derive(Debug, Clone)]
pub struct Tensor {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl Tensor {

    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
        let expected_size: usize = shape.iter().product();
        assert_eq!(data.len(), expected_size,
            "Data length {} doesn't match shape {:?} (expected {})",
            data.len(), shape, expected_size);
        Tensor {
            data,
            shape,
        }
    }

    /// Like [`Tensor::new`] but reports a bad buffer length instead of panicking.
    pub fn try_new(data: Vec<f32>, shape: Vec<usize>) -> Result<Tensor> {
        let expected_size: usize = shape.iter().product();
        if data.len() != expected_size {
            return Err(error::shape("tensor", format!(
                "data length {} doesn't match shape {:?} (expected {})",
                data.len(), shape, expected_size)));
        }
        Ok(Tensor { data, shape })
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rows(&self) -> usize {
        if self.shape.len() >= 1 { self.shape[0] } else { 1 }
    }

    pub fn cols(&self) -> usize {
        if self.shape.len() >= 2 { self.shape[1] } else { 1 }
    }

    pub fn random(shape: Vec<usize>, seed: u64) -> Self {
        use rand::SeedableRng;
        let mut rng = Pcg64::seed_from_u64(seed);
        let uniform = Uniform::new(0.0, 1.0);
        let size: usize = shape.iter().product();
        let data = (0..size)
            .map(|_| uniform.sample(&mut rng))
            .collect::<Vec<f32>>();

        Tensor::new(data, shape)
    }

    /// Seeded uniform values in `[low, high)`.
    pub fn random_range(shape: Vec<usize>, low: f32, high: f32, seed: u64) -> Self {
        let mut tensor = Self::random(shape, seed);
        let span = high - low;
        tensor.data.iter_mut().for_each(|x| *x = low + *x * span);
        tensor
    }

    pub fn ones(shape: Vec<usize>) -> Tensor {
        let size: usize = shape.iter().product();
        Tensor::new(vec![1.0; size], shape)
    }

    pub fn zeros(shape: Vec<usize>) -> Tensor {
        let size: usize = shape.iter().product();
        Tensor::new(vec![0.0; size], shape)
    }

    pub fn filled(shape: Vec<usize>, value: f32) -> Tensor {
        let size: usize = shape.iter().product();
        Tensor::new(vec![value; size], shape)
    }

    /// Row-major flat offset of a multi-index. The last axis varies fastest.
    pub fn offset(&self, index: &[usize]) -> usize {
        assert_eq!(index.len(), self.rank(),
            "Index {:?} has rank {} but tensor has shape {:?}", index, index.len(), self.shape);
        let mut offset = 0;
        for (&i, &extent) in index.iter().zip(&self.shape) {
            assert!(i < extent, "Index {:?} out of bounds for shape {:?}", index, self.shape);
            offset = offset * extent + i;
        }
        offset
    }

    /// Reinterprets the buffer under a new shape with the same element count.
    pub fn reshape(self, shape: Vec<usize>) -> Result<Tensor> {
        let size: usize = shape.iter().product();
        if size != self.size() {
            return Err(error::shape("reshape", format!(
                "cannot view {:?} as {:?}", self.shape, shape)));
        }
        Ok(Tensor { data: self.data, shape })
    }

    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

}
