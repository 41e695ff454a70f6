use std::ops::{Add, Index, IndexMut, Sub};

use crate::tensor::Tensor;

impl Add for &Tensor {
    type Output = Tensor;

    fn add(self, rhs: &Tensor) -> Tensor {
        assert_eq!(self.shape, rhs.shape, "Tensor add: shape mismatch {:?} vs {:?}", self.shape, rhs.shape);
        let data = self.data.iter().zip(rhs.data.iter()).map(|(a, b)| a + b).collect();
        Tensor::new(data, self.shape.clone())
    }
}

impl Sub for &Tensor {
    type Output = Tensor;

    fn sub(self, rhs: &Tensor) -> Tensor {
        assert_eq!(self.shape, rhs.shape, "Tensor sub: shape mismatch {:?} vs {:?}", self.shape, rhs.shape);
        let data = self.data.iter().zip(rhs.data.iter()).map(|(a, b)| a - b).collect();
        Tensor::new(data, self.shape.clone())
    }
}

// Approximate equality, accumulation order may differ between execution modes.
impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        let epsilon = 1e-4;
        if self.shape != other.shape {
            return false;
        }

        self.data.iter()
            .zip(&other.data)
            .all(|(a, b)| (a - b).abs() <= epsilon * a.abs().max(b.abs()).max(1.0))
    }
}

impl Index<[usize; 2]> for Tensor {
    type Output = f32;

    fn index(&self, index: [usize; 2]) -> &f32 {
        &self.data[self.offset(&index)]
    }
}

impl IndexMut<[usize; 2]> for Tensor {
    fn index_mut(&mut self, index: [usize; 2]) -> &mut f32 {
        let offset = self.offset(&index);
        &mut self.data[offset]
    }
}

impl Index<[usize; 4]> for Tensor {
    type Output = f32;

    fn index(&self, index: [usize; 4]) -> &f32 {
        &self.data[self.offset(&index)]
    }
}

impl IndexMut<[usize; 4]> for Tensor {
    fn index_mut(&mut self, index: [usize; 4]) -> &mut f32 {
        let offset = self.offset(&index);
        &mut self.data[offset]
    }
}
