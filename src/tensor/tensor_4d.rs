use crate::error::{self, Result};
use crate::tensor::{Dims4, Tensor};

impl Tensor {

    pub fn zeros_4d(dims: Dims4) -> Tensor {
        Self::zeros(dims.to_vec())
    }

    pub fn dims4(&self, stage: &'static str) -> Result<Dims4> {
        Dims4::from_shape(stage, &self.shape)
    }

    /// Collapses `(N, H, W, C)` into `(N, H*W*C)`.
    ///
    /// The buffer is reused as is, so features stay in `H, W, C` order with
    /// channels fastest. Dense weights trained against a channel-last flatten
    /// depend on that ordering.
    pub fn flatten_trailing(self) -> Result<Tensor> {
        let dims = self.dims4("flatten")
            .map_err(|_| error::shape("flatten", format!("cannot flatten shape {:?}", self.shape)))?;
        let features = dims.sample_len();
        Ok(Tensor { data: self.data, shape: vec![dims.n, features] })
    }

}
