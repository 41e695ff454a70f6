use rayon::prelude::*;

use crate::error::{self, Result};
use crate::ops::{ensure_positive, ExecutionMode};
use crate::tensor::{Dims2, Tensor};

/// `Y = X * W` for `X: (Rows, In)` and `W: (In, Out)`. No bias, no activation.
pub fn fully_forward(input: &Tensor, weight: &Tensor, mode: ExecutionMode) -> Result<Tensor> {
    match mode {
        ExecutionMode::Sequential => fully_forward_seq(input, weight),
        ExecutionMode::Parallel => fully_forward_par(input, weight),
    }
}

pub fn fully_forward_seq(input: &Tensor, weight: &Tensor) -> Result<Tensor> {
    let (x, w) = check_dims(input, weight)?;
    let mut result = Tensor::zeros_2d(x.rows, w.cols);

    for (i, row) in result.data.chunks_mut(w.cols).enumerate() {
        dense_row(input.row(i), &weight.data, w, row);
    }
    Ok(result)
}

pub fn fully_forward_par(input: &Tensor, weight: &Tensor) -> Result<Tensor> {
    let (x, w) = check_dims(input, weight)?;
    let mut result = Tensor::zeros_2d(x.rows, w.cols);

    result.data
        .par_chunks_mut(w.cols)
        .enumerate()
        .for_each(|(i, row)| dense_row(input.row(i), &weight.data, w, row));
    Ok(result)
}

fn check_dims(input: &Tensor, weight: &Tensor) -> Result<(Dims2, Dims2)> {
    let x = input.dims2("dense")?;
    let w = weight.dims2("dense")?;
    ensure_positive("dense", "input", input.shape())?;
    ensure_positive("dense", "weight", weight.shape())?;
    if x.cols != w.rows {
        return Err(error::shape("dense", format!(
            "Matrix dimensions don't match: {}x{} * {}x{}", x.rows, x.cols, w.rows, w.cols)));
    }
    Ok((x, w))
}

fn dense_row(x_row: &[f32], weight: &[f32], w: Dims2, out: &mut [f32]) {
    for (j, y) in out.iter_mut().enumerate() {
        let mut sum = 0.0;
        for (k, &x) in x_row.iter().enumerate() {
            sum += x * weight[w.offset(k, j)];
        }
        *y = sum;
    }
}
