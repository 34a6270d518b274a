use crate::error::PrepError;

/// Co-registered sample coordinates and a scalar band, row-major.
///
/// Index (i, j) addresses the same physical point in all three arrays; row 0
/// is the northernmost row, matching the scan order of the gridded
/// topography formats.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    rows: usize,
    cols: usize,
    x: Vec<f64>,
    y: Vec<f64>,
    b: Vec<f64>,
}

impl RasterGrid {
    pub fn new(
        rows: usize,
        cols: usize,
        x: Vec<f64>,
        y: Vec<f64>,
        b: Vec<f64>,
    ) -> Result<Self, PrepError> {
        let expected = rows * cols;
        if x.len() != expected || y.len() != expected || b.len() != expected {
            return Err(PrepError::ShapeMismatch(format!(
                "expected {}x{} = {} samples, got x={} y={} b={}",
                rows,
                cols,
                expected,
                x.len(),
                y.len(),
                b.len()
            )));
        }
        Ok(RasterGrid { rows, cols, x, y, b })
    }

    /// Uniform mesh over a rectangular extent, with the band filled from a
    /// point function. Rows run north to south.
    pub fn uniform(
        lower: [f64; 2],
        upper: [f64; 2],
        nx: usize,
        ny: usize,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, PrepError> {
        if nx < 2 || ny < 2 {
            return Err(PrepError::InvalidConfig(format!(
                "uniform grid needs at least 2 points per axis, got {}x{}",
                nx, ny
            )));
        }
        let dx = (upper[0] - lower[0]) / (nx - 1) as f64;
        let dy = (upper[1] - lower[1]) / (ny - 1) as f64;

        let n = nx * ny;
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        let mut b = Vec::with_capacity(n);
        for i in 0..ny {
            let yi = upper[1] - i as f64 * dy;
            for j in 0..nx {
                let xj = lower[0] + j as f64 * dx;
                x.push(xj);
                y.push(yi);
                b.push(f(xj, yi));
            }
        }
        RasterGrid::new(ny, nx, x, y, b)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn sample(&self, i: usize, j: usize) -> (f64, f64, f64) {
        let k = i * self.cols + j;
        (self.x[k], self.y[k], self.b[k])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_band_length() {
        let err = RasterGrid::new(2, 2, vec![0.0; 4], vec![0.0; 4], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, PrepError::ShapeMismatch(_)));
    }

    #[test]
    fn uniform_spans_extent_inclusively() {
        let g = RasterGrid::uniform([0.0, 0.0], [10.0, 4.0], 6, 3, |_, _| 0.0).unwrap();
        assert_eq!(g.rows(), 3);
        assert_eq!(g.cols(), 6);
        // northwest corner first, southeast corner last
        assert_eq!(g.sample(0, 0), (0.0, 4.0, 0.0));
        assert_eq!(g.sample(2, 5), (10.0, 0.0, 0.0));
        assert_eq!(g.sample(1, 3), (6.0, 2.0, 0.0));
    }

    #[test]
    fn uniform_band_follows_point_function() {
        let g = RasterGrid::uniform([-1.0, -1.0], [1.0, 1.0], 3, 3, |x, y| x + y).unwrap();
        assert_eq!(g.sample(0, 2), (1.0, 1.0, 2.0));
        assert_eq!(g.sample(2, 0), (-1.0, -1.0, -2.0));
    }

    #[test]
    fn uniform_rejects_degenerate_axis() {
        let err = RasterGrid::uniform([0.0, 0.0], [1.0, 1.0], 1, 3, |_, _| 0.0).unwrap_err();
        assert!(matches!(err, PrepError::InvalidConfig(_)));
    }
}
