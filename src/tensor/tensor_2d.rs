use crate::error::Result;
use crate::tensor::{Dims2, Tensor};

impl Tensor {

    pub fn new_2d(data: Vec<f32>, rows: usize, cols: usize) -> Tensor {
        Self::new(data, vec![rows, cols])
    }

    pub fn random_2d(rows: usize, cols: usize, seed: u64) -> Self {
        Self::random(vec![rows, cols], seed)
    }

    pub fn ones_2d(rows: usize, cols: usize) -> Tensor {
        Self::ones(vec![rows, cols])
    }

    pub fn zeros_2d(rows: usize, cols: usize) -> Tensor {
        Self::zeros(vec![rows, cols])
    }

    pub fn dims2(&self, stage: &'static str) -> Result<Dims2> {
        Dims2::from_shape(stage, &self.shape)
    }

    /// Borrow row `i` of a rank-2 tensor.
    pub fn row(&self, i: usize) -> &[f32] {
        let cols = self.cols();
        &self.data[i * cols..(i + 1) * cols]
    }

}
