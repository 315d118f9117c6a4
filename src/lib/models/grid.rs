use ndarray::{Array1, Array2};

use crate::error::EmissError;

/// Fixed target domain of `nrows x ncols` cells.
/// Per-cell fields are stored flattened in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub nrows: usize,
    pub ncols: usize,
}

impl Grid {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Grid { nrows, ncols }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// number of cells
    pub fn len(&self) -> usize {
        self.nrows * self.ncols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn zeros(&self) -> Array1<f32> {
        Array1::zeros(self.len())
    }

    /// Fails when a flattened field does not cover the grid
    pub fn check(&self, what: &str, values: &Array1<f32>) -> Result<(), EmissError> {
        if values.len() != self.len() {
            return Err(EmissError::shape_mismatch(what, self.len(), values.len()));
        }
        Ok(())
    }

    /// reshape a flattened field back onto the grid
    pub fn to_2d(&self, values: &Array1<f32>) -> Result<Array2<f32>, EmissError> {
        self.check("flattened field", values)?;
        Array2::from_shape_vec(self.shape(), values.to_vec())
            .map_err(|_| EmissError::shape_mismatch("flattened field", self.len(), values.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn reshape_is_row_major() {
        let grid = Grid::new(2, 3);
        let values = array![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let field = grid.to_2d(&values).expect("should reshape");
        assert_eq!(field[[0, 2]], 2.0);
        assert_eq!(field[[1, 0]], 3.0);
    }

    #[test]
    fn check_rejects_wrong_length() {
        let grid = Grid::new(2, 2);
        let err = grid.check("emiss_factor", &array![1.0, 1.0, 1.0]);
        assert_eq!(err, Err(EmissError::shape_mismatch("emiss_factor", 4, 3)));
    }
}
