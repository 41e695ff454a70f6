use rayon::prelude::*;

use crate::error::{self, Result};
use crate::ops::{ensure_positive, ExecutionMode};
use crate::tensor::{Dims4, FilterDims, Tensor};

/// Valid (unpadded, stride 1) convolution without bias.
///
/// `input` is `(N, Hin, Win, Cin)`, `filter` is `(Fh, Fw, Cin, Cout)` and the
/// result is `(N, Hin - Fh + 1, Win - Fw + 1, Cout)` with
///
/// ```text
/// out[n,h,w,m] = sum_{p,q,c} in[n, h+p, w+q, c] * filter[p,q,c,m]
/// ```
pub fn conv_forward_valid(input: &Tensor, filter: &Tensor, mode: ExecutionMode) -> Result<Tensor> {
    let x = input.dims4("conv")?;
    let f = filter.dims4("conv")?.as_filter();
    ensure_positive("conv", "input", input.shape())?;
    ensure_positive("conv", "filter", filter.shape())?;

    let y = conv_output_dims(x, f)?;
    let mut out = Tensor::zeros_4d(y);

    let sample_len = y.sample_len();
    match mode {
        ExecutionMode::Sequential => out.data
            .chunks_mut(sample_len)
            .enumerate()
            .for_each(|(n, chunk)| conv_sample(&input.data, x, &filter.data, f, y, n, chunk)),
        ExecutionMode::Parallel => out.data
            .par_chunks_mut(sample_len)
            .enumerate()
            .for_each(|(n, chunk)| conv_sample(&input.data, x, &filter.data, f, y, n, chunk)),
    }

    Ok(out)
}

/// Output extents of a valid convolution of `x` with filter `f`.
pub fn conv_output_dims(x: Dims4, f: FilterDims) -> Result<Dims4> {
    if x.c != f.cin {
        return Err(error::shape("conv", format!(
            "input has {} channels but filter expects {}", x.c, f.cin)));
    }
    if x.h < f.fh || x.w < f.fw {
        return Err(error::shape("conv", format!(
            "filter {}x{} does not fit input {}x{}", f.fh, f.fw, x.h, x.w)));
    }
    Ok(Dims4::new(x.n, x.h - f.fh + 1, x.w - f.fw + 1, f.cout))
}

// `out` is sample `n` of the output, zeroed on entry.
fn conv_sample(
    input: &[f32],
    x: Dims4,
    filter: &[f32],
    f: FilterDims,
    y: Dims4,
    n: usize,
    out: &mut [f32],
) {
    for h in 0..y.h {
        for w in 0..y.w {
            let out_base = (h * y.w + w) * y.c;
            let cell = &mut out[out_base..out_base + y.c];
            for p in 0..f.fh {
                for q in 0..f.fw {
                    for c in 0..f.cin {
                        let pixel = input[x.offset(n, h + p, w + q, c)];
                        let tap = f.offset(p, q, c, 0);
                        let taps = &filter[tap..tap + f.cout];
                        for (acc, &weight) in cell.iter_mut().zip(taps) {
                            *acc += pixel * weight;
                        }
                    }
                }
            }
        }
    }
}
