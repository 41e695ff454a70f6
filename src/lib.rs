pub mod batch;
pub mod config;
pub mod error;
pub mod helpers;
pub mod idx_data;
pub mod model;
pub mod ops;
pub mod pipeline;
pub mod telemetry;
pub mod tensor;

pub use batch::Batch;
pub use config::{NetworkConfig, RunConfig};
pub use error::{Error, Result};
pub use model::Model;
pub use ops::ExecutionMode;
pub use pipeline::ForwardPipeline;
pub use tensor::Tensor;
