//! Stateless forward operators over channel-last tensors.
//!
//! Every operator reads its extents from the tensors it is given and
//! returns a [`crate::Error`] instead of panicking on a shape violation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};

mod argmax;
mod conv;
mod dense;
mod pool;
mod relu;

pub use argmax::argmax;
pub use conv::{conv_forward_valid, conv_output_dims};
pub use dense::{fully_forward, fully_forward_par, fully_forward_seq};
pub use pool::{average_pool, pool_output_dims};
pub use relu::{relu2, relu4};

/// How an operator spreads its independent output rows over threads.
///
/// Both modes run the same per-element accumulation, so their results are
/// bit-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

impl FromStr for ExecutionMode {
    type Err = error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(ExecutionMode::Sequential),
            "parallel" | "par" => Ok(ExecutionMode::Parallel),
            other => Err(error::Error::Config(format!("unknown execution mode '{}'", other))),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Parallel => write!(f, "parallel"),
        }
    }
}

pub(crate) fn ensure_positive(stage: &'static str, what: &str, shape: &[usize]) -> Result<()> {
    if shape.iter().any(|&extent| extent == 0) {
        return Err(error::shape(stage, format!("{} has a zero extent: {:?}", what, shape)));
    }
    Ok(())
}
