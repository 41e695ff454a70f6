use crate::error::{self, Result};
use crate::tensor::Tensor;

/// Images `(N, H, W, C)` with their reference labels `(N, Classes)`.
#[derive(Debug, Clone)]
pub struct Batch {
    pub images: Tensor,
    pub labels: Tensor,
}

impl Batch {

    pub fn new(images: Tensor, labels: Tensor) -> Result<Self> {
        let x = images.dims4("batch")?;
        let y = labels.dims2("batch")?;
        if x.n != y.rows {
            return Err(error::shape("batch", format!(
                "{} images but {} label rows", x.n, y.rows)));
        }
        Ok(Batch { images, labels })
    }

    pub fn len(&self) -> usize {
        self.images.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One-hot `(N, num_classes)` matrix from class indices.
    pub fn one_hot(classes: &[u8], num_classes: usize) -> Result<Tensor> {
        let mut labels = Tensor::zeros_2d(classes.len(), num_classes);
        for (i, &class) in classes.iter().enumerate() {
            let class = class as usize;
            if class >= num_classes {
                return Err(error::shape("labels", format!(
                    "label {} at row {} is outside {} classes", class, i, num_classes)));
            }
            labels[[i, class]] = 1.0;
        }
        Ok(labels)
    }

}
