use tracing::{debug, info_span};

use crate::batch::Batch;
use crate::config::{NetworkConfig, StageShapes};
use crate::error::{self, Result};
use crate::model::Model;
use crate::ops::{self, ExecutionMode};
use crate::tensor::Tensor;

/// Fixed five-stage forward pass:
/// conv1 -> relu -> pool -> conv2 -> relu -> pool -> flatten -> fc1 -> relu -> fc2 -> argmax.
#[derive(Debug, Clone)]
pub struct ForwardPipeline {
    config: NetworkConfig,
    mode: ExecutionMode,
}

impl ForwardPipeline {

    /// Fails when the configured layer shapes don't chain.
    pub fn new(config: NetworkConfig, mode: ExecutionMode) -> Result<Self> {
        config.validate()?;
        Ok(ForwardPipeline { config, mode })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn run(&self, batch: &Batch, model: &Model) -> Result<Vec<usize>> {
        self.forward(&batch.images, model)
    }

    /// Class prediction for every sample of `images`.
    pub fn forward(&self, images: &Tensor, model: &Model) -> Result<Vec<usize>> {
        let logits = self.logits(images, model)?;
        ops::argmax(&logits).map_err(|err| err.in_stage("argmax"))
    }

    /// Output of the last dense stage, `(N, classes)`.
    pub fn logits(&self, images: &Tensor, model: &Model) -> Result<Tensor> {
        let x = images.dims4("input")?;
        let [_, h, w, c] = self.config.input;
        if (x.h, x.w, x.c) != (h, w, c) {
            return Err(error::shape("input", format!(
                "images are {}x{}x{}, network expects {}x{}x{}", x.h, x.w, x.c, h, w, c)));
        }
        model.check(&self.config)?;
        let shapes = self.config.stage_shapes(x)?;

        let span = info_span!("forward", batch = x.n, mode = %self.mode);
        let _guard = span.enter();
        forward_stages(images, model, self.config.pool_size, self.mode, &shapes)
    }

}

fn forward_stages(
    images: &Tensor,
    model: &Model,
    pool_size: usize,
    mode: ExecutionMode,
    shapes: &StageShapes,
) -> Result<Tensor> {
    let mut a = ops::conv_forward_valid(images, &model.conv1, mode).map_err(|err| err.in_stage("conv1"))?;
    debug_assert_eq!(a.shape(), shapes.conv1.to_vec().as_slice());
    ops::relu4(&mut a).map_err(|err| err.in_stage("relu1"))?;
    debug!(stage = "conv1", shape = ?a.shape());

    let b = ops::average_pool(&a, pool_size, mode).map_err(|err| err.in_stage("pool1"))?;
    drop(a);
    debug!(stage = "pool1", shape = ?b.shape());

    let mut c = ops::conv_forward_valid(&b, &model.conv2, mode).map_err(|err| err.in_stage("conv2"))?;
    drop(b);
    ops::relu4(&mut c).map_err(|err| err.in_stage("relu2"))?;
    debug!(stage = "conv2", shape = ?c.shape());

    let d = ops::average_pool(&c, pool_size, mode).map_err(|err| err.in_stage("pool2"))?;
    drop(c);
    debug_assert_eq!(d.shape(), shapes.pool2.to_vec().as_slice());
    debug!(stage = "pool2", shape = ?d.shape());

    let d = d.flatten_trailing()?;
    let mut e = ops::fully_forward(&d, &model.fc1, mode).map_err(|err| err.in_stage("fc1"))?;
    drop(d);
    ops::relu2(&mut e).map_err(|err| err.in_stage("relu3"))?;
    debug!(stage = "fc1", shape = ?e.shape());

    let f = ops::fully_forward(&e, &model.fc2, mode).map_err(|err| err.in_stage("fc2"))?;
    debug_assert_eq!(f.shape(), shapes.fc2.to_vec().as_slice());
    debug!(stage = "fc2", shape = ?f.shape());
    Ok(f)
}

/// One-shot forward pass with the reference network shapes taken from `config`.
pub fn forward_operation(
    images: &Tensor,
    model: &Model,
    config: &NetworkConfig,
    mode: ExecutionMode,
) -> Result<Vec<usize>> {
    ForwardPipeline::new(config.clone(), mode)?.forward(images, model)
}
