use crate::error::{self, Result};
use crate::tensor::Tensor;

/// Per-row index of the largest value in a `(Rows, Cols)` tensor.
///
/// Ties resolve to the lowest column.
pub fn argmax(input: &Tensor) -> Result<Vec<usize>> {
    let dims = input.dims2("argmax")?;
    if dims.cols == 0 {
        return Err(error::shape("argmax", "rows must have at least one column"));
    }

    let predictions = input.data
        .chunks(dims.cols)
        .map(|row| {
            let mut max_idx = 0;
            let mut max_val = row[0];
            for (j, &val) in row.iter().enumerate() {
                if val > max_val {
                    max_val = val;
                    max_idx = j;
                }
            }
            max_idx
        })
        .collect();
    Ok(predictions)
}
