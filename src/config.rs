use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{self, Error, Result};
use crate::ops::{conv_output_dims, pool_output_dims, ExecutionMode};
use crate::tensor::{Dims2, Dims4};

/// Layer shapes of the two-conv, two-dense network.
///
/// `input` is `(N, H, W, C)`; the batch extent only matters to the driver,
/// the pipeline takes `N` from the tensor it is handed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub input: [usize; 4],
    pub conv1: [usize; 4],
    pub conv2: [usize; 4],
    pub fc1: [usize; 2],
    pub fc2: [usize; 2],
    pub pool_size: usize,
    pub num_classes: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            input: [10000, 28, 28, 1],
            conv1: [5, 5, 1, 32],
            conv2: [5, 5, 32, 64],
            fc1: [1024, 128],
            fc2: [128, 10],
            pool_size: 2,
            num_classes: 10,
        }
    }
}

/// Every intermediate extent of one forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageShapes {
    pub conv1: Dims4,
    pub pool1: Dims4,
    pub conv2: Dims4,
    pub pool2: Dims4,
    pub flat: Dims2,
    pub fc1: Dims2,
    pub fc2: Dims2,
}

impl NetworkConfig {

    pub fn input_dims(&self) -> Dims4 {
        let [n, h, w, c] = self.input;
        Dims4::new(n, h, w, c)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.input[0] = batch_size;
        self
    }

    /// Derives all stage shapes for a batch of `input` extents.
    pub fn stage_shapes(&self, input: Dims4) -> Result<StageShapes> {
        if self.input.iter().skip(1).chain(&self.conv1).chain(&self.conv2)
            .chain(&self.fc1).chain(&self.fc2).any(|&extent| extent == 0)
        {
            return Err(error::invalid("config", format!("layer shapes must be positive: {:?}", self)));
        }

        let conv1 = conv_output_dims(input, dims4(self.conv1).as_filter())
            .map_err(|err| err.in_stage("conv1"))?;
        let pool1 = pool_output_dims(conv1, self.pool_size).map_err(|err| err.in_stage("pool1"))?;
        let conv2 = conv_output_dims(pool1, dims4(self.conv2).as_filter())
            .map_err(|err| err.in_stage("conv2"))?;
        let pool2 = pool_output_dims(conv2, self.pool_size).map_err(|err| err.in_stage("pool2"))?;

        let flat = Dims2::new(pool2.n, pool2.sample_len());
        if flat.cols != self.fc1[0] {
            return Err(error::shape("fc1", format!(
                "flattened features {} ({}x{}x{}) don't match fc1 input {}",
                flat.cols, pool2.h, pool2.w, pool2.c, self.fc1[0])));
        }
        let fc1 = Dims2::new(flat.rows, self.fc1[1]);
        if fc1.cols != self.fc2[0] {
            return Err(error::shape("fc2", format!(
                "fc1 output {} doesn't match fc2 input {}", fc1.cols, self.fc2[0])));
        }
        let fc2 = Dims2::new(fc1.rows, self.fc2[1]);
        if fc2.cols != self.num_classes {
            return Err(error::shape("fc2", format!(
                "fc2 produces {} logits but {} classes are configured", fc2.cols, self.num_classes)));
        }

        Ok(StageShapes { conv1, pool1, conv2, pool2, flat, fc1, fc2 })
    }

    /// Checks the layer chain once before any data is touched.
    pub fn validate(&self) -> Result<StageShapes> {
        self.stage_shapes(self.input_dims())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }

}

fn dims4(shape: [usize; 4]) -> Dims4 {
    let [a, b, c, d] = shape;
    Dims4::new(a, b, c, d)
}

/// Where the driver finds its inputs and how it runs the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub model_dir: PathBuf,
    pub images_file: String,
    pub labels_file: String,
    pub batch_size: Option<usize>,
    pub mode: ExecutionMode,
    pub network: NetworkConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            data_dir: PathBuf::from("./data"),
            model_dir: PathBuf::from("./model"),
            images_file: "t10k-images.idx3-ubyte".to_string(),
            labels_file: "t10k-labels.idx1-ubyte".to_string(),
            batch_size: None,
            mode: ExecutionMode::Sequential,
            network: NetworkConfig::default(),
        }
    }
}

pub const ENV_DATA_DIR: &str = "CNN_DATA_DIR";
pub const ENV_MODEL_DIR: &str = "CNN_MODEL_DIR";
pub const ENV_BATCH_SIZE: &str = "CNN_BATCH_SIZE";
pub const ENV_EXECUTION_MODE: &str = "CNN_EXECUTION_MODE";

impl RunConfig {

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }

    /// Applies `CNN_*` environment overrides on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());

        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_MODEL_DIR) {
            self.model_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_BATCH_SIZE) {
            let size = raw.trim().parse::<usize>()
                .map_err(|e| Error::Config(format!("{}='{}': {}", ENV_BATCH_SIZE, raw, e)))?;
            self.batch_size = Some(size);
        }
        if let Some(raw) = lookup(ENV_EXECUTION_MODE) {
            self.mode = raw.parse()?;
        }
        Ok(self)
    }

    pub fn images_path(&self) -> PathBuf {
        self.data_dir.join(&self.images_file)
    }

    pub fn labels_path(&self) -> PathBuf {
        self.data_dir.join(&self.labels_file)
    }

}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|e| error::load(path, e.to_string()))?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}
