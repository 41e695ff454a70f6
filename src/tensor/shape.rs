use crate::error::{self, Result};

/// Extents of a channel-last activation tensor `(N, H, W, C)`.
///
/// Filter tensors `(Fh, Fw, Cin, Cout)` are read through [`Dims4::as_filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims4 {
    pub n: usize,
    pub h: usize,
    pub w: usize,
    pub c: usize,
}

/// Filter extents `(Fh, Fw, Cin, Cout)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDims {
    pub fh: usize,
    pub fw: usize,
    pub cin: usize,
    pub cout: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims2 {
    pub rows: usize,
    pub cols: usize,
}

impl Dims4 {

    pub fn new(n: usize, h: usize, w: usize, c: usize) -> Self {
        Dims4 { n, h, w, c }
    }

    pub fn from_shape(stage: &'static str, shape: &[usize]) -> Result<Self> {
        match *shape {
            [n, h, w, c] => Ok(Dims4 { n, h, w, c }),
            _ => Err(error::shape(stage, format!("expected a rank-4 tensor, got shape {:?}", shape))),
        }
    }

    pub fn as_filter(&self) -> FilterDims {
        FilterDims { fh: self.n, fw: self.h, cin: self.w, cout: self.c }
    }

    pub fn len(&self) -> usize {
        self.n * self.h * self.w * self.c
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in one sample, `H * W * C`.
    pub fn sample_len(&self) -> usize {
        self.h * self.w * self.c
    }

    #[inline]
    pub fn offset(&self, n: usize, h: usize, w: usize, c: usize) -> usize {
        ((n * self.h + h) * self.w + w) * self.c + c
    }

    pub fn to_vec(&self) -> Vec<usize> {
        vec![self.n, self.h, self.w, self.c]
    }

    pub fn to_array(&self) -> [usize; 4] {
        [self.n, self.h, self.w, self.c]
    }

}

impl FilterDims {

    #[inline]
    pub fn offset(&self, p: usize, q: usize, c: usize, m: usize) -> usize {
        ((p * self.fw + q) * self.cin + c) * self.cout + m
    }

}

impl Dims2 {

    pub fn new(rows: usize, cols: usize) -> Self {
        Dims2 { rows, cols }
    }

    pub fn from_shape(stage: &'static str, shape: &[usize]) -> Result<Self> {
        match *shape {
            [rows, cols] => Ok(Dims2 { rows, cols }),
            _ => Err(error::shape(stage, format!("expected a rank-2 tensor, got shape {:?}", shape))),
        }
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn to_vec(&self) -> Vec<usize> {
        vec![self.rows, self.cols]
    }

}
