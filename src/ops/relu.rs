use crate::error::Result;
use crate::tensor::Tensor;

/// In-place rectification of a `(N, H, W, C)` activation.
pub fn relu4(tensor: &mut Tensor) -> Result<()> {
    tensor.dims4("relu4")?;
    relu_inplace(&mut tensor.data);
    Ok(())
}

/// In-place rectification of a `(Rows, Cols)` activation.
pub fn relu2(tensor: &mut Tensor) -> Result<()> {
    tensor.dims2("relu2")?;
    relu_inplace(&mut tensor.data);
    Ok(())
}

fn relu_inplace(data: &mut [f32]) {
    for x in data.iter_mut() {
        if *x < 0.0 {
            *x = 0.0;
        }
    }
}
