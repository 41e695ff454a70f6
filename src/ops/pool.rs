use rayon::prelude::*;

use crate::error::{self, Result};
use crate::ops::{ensure_positive, ExecutionMode};
use crate::tensor::{Dims4, Tensor};

/// Non-overlapping `k x k` average pooling over `(N, H, W, C)`.
///
/// The output is `(N, H / k, W / k, C)`. Trailing rows and columns that do
/// not fill a whole window are dropped.
pub fn average_pool(input: &Tensor, pool_size: usize, mode: ExecutionMode) -> Result<Tensor> {
    let x = input.dims4("pool")?;
    ensure_positive("pool", "input", input.shape())?;
    let y = pool_output_dims(x, pool_size)?;
    let mut out = Tensor::zeros_4d(y);

    let sample_len = y.sample_len();
    match mode {
        ExecutionMode::Sequential => out.data
            .chunks_mut(sample_len)
            .enumerate()
            .for_each(|(n, chunk)| pool_sample(&input.data, x, pool_size, y, n, chunk)),
        ExecutionMode::Parallel => out.data
            .par_chunks_mut(sample_len)
            .enumerate()
            .for_each(|(n, chunk)| pool_sample(&input.data, x, pool_size, y, n, chunk)),
    }

    Ok(out)
}

/// Output extents of `k x k` pooling over `x`.
pub fn pool_output_dims(x: Dims4, pool_size: usize) -> Result<Dims4> {
    if pool_size == 0 {
        return Err(error::invalid("pool", "pool size must be at least 1"));
    }
    let y = Dims4::new(x.n, x.h / pool_size, x.w / pool_size, x.c);
    if y.h == 0 || y.w == 0 {
        return Err(error::shape("pool", format!(
            "window {} is larger than input {}x{}", pool_size, x.h, x.w)));
    }
    Ok(y)
}

fn pool_sample(input: &[f32], x: Dims4, k: usize, y: Dims4, n: usize, out: &mut [f32]) {
    let area = (k * k) as f32;
    for h in 0..y.h {
        for w in 0..y.w {
            let out_base = (h * y.w + w) * y.c;
            let cell = &mut out[out_base..out_base + y.c];
            for p in 0..k {
                for q in 0..k {
                    let in_base = x.offset(n, k * h + p, k * w + q, 0);
                    let pixels = &input[in_base..in_base + x.c];
                    for (acc, &value) in cell.iter_mut().zip(pixels) {
                        *acc += value / area;
                    }
                }
            }
        }
    }
}
