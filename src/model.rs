use crate::config::NetworkConfig;
use crate::error::{self, Result};
use crate::tensor::Tensor;

/// Pre-trained weights of the network. Read-only once built.
#[derive(Debug, Clone)]
pub struct Model {
    pub conv1: Tensor,
    pub conv2: Tensor,
    pub fc1: Tensor,
    pub fc2: Tensor,
}

impl Model {

    pub fn new(conv1: Tensor, conv2: Tensor, fc1: Tensor, fc2: Tensor, config: &NetworkConfig) -> Result<Self> {
        let model = Model { conv1, conv2, fc1, fc2 };
        model.check(config)?;
        Ok(model)
    }

    /// Weights drawn uniformly from `[-0.1, 0.1)`, each layer with its own seed.
    pub fn random(config: &NetworkConfig, seed: u64) -> Self {
        Model {
            conv1: Tensor::random_range(config.conv1.to_vec(), -0.1, 0.1, seed),
            conv2: Tensor::random_range(config.conv2.to_vec(), -0.1, 0.1, seed.wrapping_add(1)),
            fc1: Tensor::random_range(config.fc1.to_vec(), -0.1, 0.1, seed.wrapping_add(2)),
            fc2: Tensor::random_range(config.fc2.to_vec(), -0.1, 0.1, seed.wrapping_add(3)),
        }
    }

    /// Verifies that every weight tensor has the shape `config` declares.
    pub fn check(&self, config: &NetworkConfig) -> Result<()> {
        let expected: [(&'static str, &Tensor, &[usize]); 4] = [
            ("conv1", &self.conv1, &config.conv1),
            ("conv2", &self.conv2, &config.conv2),
            ("fc1", &self.fc1, &config.fc1),
            ("fc2", &self.fc2, &config.fc2),
        ];
        for (name, weight, shape) in expected {
            if weight.shape() != shape {
                return Err(error::shape(name, format!(
                    "weight has shape {:?}, expected {:?}", weight.shape(), shape)));
            }
        }
        Ok(())
    }

    pub fn layers(&self) -> [(&'static str, &Tensor); 4] {
        [
            ("conv1", &self.conv1),
            ("conv2", &self.conv2),
            ("fc1", &self.fc1),
            ("fc2", &self.fc2),
        ]
    }

}
