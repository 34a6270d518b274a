use crate::error::PrepError;
use crate::grid::RasterGrid;
use indicatif::ProgressBar;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Dam centerline survey: three line segments over x, joined at x3 and x4.
///
/// Continuous but not differentiable at the joins. Knot coordinates are in
/// the same projected frame as the topography grid.
#[derive(Debug, Clone, Copy)]
pub struct DamLine {
    pub x0: f64,
    pub x1: f64,
    pub x2: f64,
    pub x3: f64,
    pub x4: f64,
    pub x5: f64,
    pub y1: f64,
    pub y2: f64,
    pub y3: f64,
    pub y4: f64,
    pub y5: f64,
}

impl DamLine {
    /// Malpasset dam alignment, Lambert III meters.
    pub fn malpasset() -> Self {
        DamLine {
            x0: 953.155e3,
            x1: 956.0e3,
            x2: 957.0e3,
            x3: 957.2e3,
            x4: 958.15e3,
            x5: 959.640e3,
            y1: 1844.5e3,
            y2: 1843.6e3,
            y3: 1844.5e3,
            y4: 1844.7e3,
            y5: 1845.7e3,
        }
    }

    /// Knots must march east, or the segment slopes are meaningless.
    pub fn validate(&self) -> Result<(), PrepError> {
        let xs = [self.x0, self.x1, self.x2, self.x3, self.x4, self.x5];
        if xs.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PrepError::InvalidConfig(format!(
                "dam line knots not strictly increasing in x: {:?}",
                xs
            )));
        }
        Ok(())
    }

    /// Centerline y at the given x.
    ///
    /// The west segment keeps the (x1,y1)-(x2,y2) slope all the way to the
    /// x3 join, extending it past its own right knot. That asymmetry is in
    /// the surveyed alignment as delivered; do not move the cut to x2
    /// without rechecking the survey.
    pub fn eval(&self, x: f64) -> f64 {
        if x < self.x3 {
            let m = (self.y2 - self.y1) / (self.x2 - self.x1);
            self.y1 + m * (x - self.x1)
        } else if x < self.x4 {
            self.y3
        } else {
            let m = (self.y5 - self.y4) / (self.x5 - self.x4);
            self.y4 + m * (x - self.x4)
        }
    }

    /// True when the sample sits upstream of the dam.
    pub fn is_behind(&self, x: f64, y: f64) -> bool {
        y > self.eval(x)
    }
}

/// Water-surface elevation assigned on either side of the dam line.
#[derive(Debug, Clone, Copy)]
pub struct EtaSplit {
    pub behind: f64,
    pub front: f64,
}

impl EtaSplit {
    /// Reservoir head behind the dam; far below ground in front, so the
    /// depth clamp dries every downstream cell, depressions included.
    pub const HEAD: EtaSplit = EtaSplit {
        behind: 100.0,
        front: -100.0,
    };

    /// Reservoir head behind the dam; sea level in front.
    pub const SEA_LEVEL_FRONT: EtaSplit = EtaSplit {
        behind: 100.0,
        front: 0.0,
    };
}

/// Initial-surface synthesis context: one topography grid plus the dam line.
///
/// Built once per invocation and discarded after the output files are
/// written.
pub struct InitSurface<'a> {
    grid: &'a RasterGrid,
    dam: &'a DamLine,
}

impl<'a> InitSurface<'a> {
    pub fn new(grid: &'a RasterGrid, dam: &'a DamLine) -> Self {
        InitSurface { grid, dam }
    }

    /// Non-negative water depth at sample (i, j) under the given split.
    pub fn depth(&self, i: usize, j: usize, split: EtaSplit) -> f64 {
        let (x, y, b) = self.grid.sample(i, j);
        let eta = if self.dam.is_behind(x, y) {
            split.behind
        } else {
            split.front
        };
        (eta - b).max(0.0)
    }

    /// Writes one `x y depth` line per sample, row-major, no header.
    ///
    /// The solver ingests these positionally, so the scan order here must
    /// stay outer-over-rows, inner-over-columns.
    pub fn write_depth_file(
        &self,
        path: &Path,
        split: EtaSplit,
        pb: &ProgressBar,
    ) -> Result<(), PrepError> {
        let file = File::create(path).map_err(|e| PrepError::output_write(path, e))?;
        let mut out = BufWriter::new(file);

        for i in 0..self.grid.rows() {
            for j in 0..self.grid.cols() {
                let (x, y, _) = self.grid.sample(i, j);
                let h = self.depth(i, j, split);
                writeln!(out, "{} {} {}", x, y, h)
                    .map_err(|e| PrepError::output_write(path, e))?;
            }
            pb.inc(1);
        }

        out.flush().map_err(|e| PrepError::output_write(path, e))
    }

    /// Writes the depth-style and elevation-style initializer files.
    pub fn write_pair(
        &self,
        h_path: &Path,
        eta_path: &Path,
        pb: &ProgressBar,
    ) -> Result<(), PrepError> {
        self.write_depth_file(h_path, EtaSplit::HEAD, pb)?;
        self.write_depth_file(eta_path, EtaSplit::SEA_LEVEL_FRONT, pb)
    }
}

/// Flat reservoir surface split at a gate abscissa.
#[derive(Debug, Clone, Copy)]
pub struct StepSurface {
    pub x_split: f64,
    pub upstream: f64,
    pub downstream: f64,
}

impl StepSurface {
    /// Laboratory dam-break benchmark at field scale: 8 m of water behind
    /// the gate at x = 0, 0.4 m downstream.
    pub fn benchmark() -> Self {
        StepSurface {
            x_split: 0.0,
            upstream: 8.0,
            downstream: 0.4,
        }
    }

    pub fn eval(&self, x: f64) -> f64 {
        if x < self.x_split {
            self.upstream
        } else {
            self.downstream
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
        y1 + (y2 - y1) / (x2 - x1) * (x - x1)
    }

    #[test]
    fn west_segment_interpolates_first_chord() {
        let dam = DamLine::malpasset();
        let x = 956.4e3;
        assert_eq!(dam.eval(x), line(dam.x1, dam.y1, dam.x2, dam.y2, x));
    }

    #[test]
    fn west_segment_extends_past_its_right_knot_until_x3() {
        // Between x2 and x3 the first chord still applies, not y3.
        let dam = DamLine::malpasset();
        let x = 957.1e3;
        assert!(x > dam.x2 && x < dam.x3);
        assert_eq!(dam.eval(x), line(dam.x1, dam.y1, dam.x2, dam.y2, x));
        assert_ne!(dam.eval(x), dam.y3);
    }

    #[test]
    fn crest_segment_is_constant() {
        let dam = DamLine::malpasset();
        assert_eq!(dam.eval(dam.x3), dam.y3);
        assert_eq!(dam.eval(0.5 * (dam.x3 + dam.x4)), dam.y3);
    }

    #[test]
    fn east_segment_interpolates_last_chord() {
        let dam = DamLine::malpasset();
        for x in [dam.x4, 958.9e3, dam.x5, 960.2e3] {
            assert_eq!(dam.eval(x), line(dam.x4, dam.y4, dam.x5, dam.y5, x));
        }
    }

    #[test]
    fn rejects_unordered_knots() {
        let mut dam = DamLine::malpasset();
        dam.x4 = dam.x3;
        assert!(matches!(
            dam.validate(),
            Err(PrepError::InvalidConfig(_))
        ));
    }

    #[test]
    fn depth_is_never_negative() {
        let dam = DamLine::malpasset();
        let grid = RasterGrid::uniform(
            [dam.x0, 1842.0e3],
            [dam.x5, 1847.0e3],
            12,
            9,
            |_, _| 150.0, // ground above both surface regimes
        )
        .unwrap();
        let surf = InitSurface::new(&grid, &dam);
        for i in 0..grid.rows() {
            for j in 0..grid.cols() {
                assert!(surf.depth(i, j, EtaSplit::HEAD) >= 0.0);
                assert!(surf.depth(i, j, EtaSplit::SEA_LEVEL_FRONT) >= 0.0);
            }
        }
    }

    #[test]
    fn classifies_two_by_two_grid() {
        // Dam line passing between y = 2000 and y = -2000 at x in {0, 1}.
        let dam = DamLine {
            x0: -30.0,
            x1: -20.0,
            x2: -10.0,
            x3: 5.0,
            x4: 10.0,
            x5: 20.0,
            y1: 0.0,
            y2: 0.0,
            y3: 0.0,
            y4: 0.0,
            y5: 0.0,
        };
        let grid = RasterGrid::new(
            2,
            2,
            vec![0.0, 1.0, 0.0, 1.0],
            vec![2000.0, 2000.0, -2000.0, -2000.0],
            vec![0.0; 4],
        )
        .unwrap();
        let surf = InitSurface::new(&grid, &dam);

        // north row behind the dam: eta = 100, depth = 100
        assert_eq!(surf.depth(0, 0, EtaSplit::HEAD), 100.0);
        assert_eq!(surf.depth(0, 1, EtaSplit::HEAD), 100.0);
        // south row in front: eta = -100, clamped to dry
        assert_eq!(surf.depth(1, 0, EtaSplit::HEAD), 0.0);
        assert_eq!(surf.depth(1, 1, EtaSplit::HEAD), 0.0);
    }

    #[test]
    fn write_pair_emits_row_major_triples() {
        let dam = DamLine {
            x0: -30.0,
            x1: -20.0,
            x2: -10.0,
            x3: 5.0,
            x4: 10.0,
            x5: 20.0,
            y1: 0.0,
            y2: 0.0,
            y3: 0.0,
            y4: 0.0,
            y5: 0.0,
        };
        // downstream rows sit in a depression 50 m below sea level
        let grid = RasterGrid::new(
            2,
            2,
            vec![0.0, 1.0, 0.0, 1.0],
            vec![2000.0, 2000.0, -2000.0, -2000.0],
            vec![0.0, 0.0, -50.0, -50.0],
        )
        .unwrap();
        let surf = InitSurface::new(&grid, &dam);

        let dir = tempdir().unwrap();
        let h_path = dir.path().join("init_h.xyz");
        let eta_path = dir.path().join("init_eta.xyz");
        let pb = ProgressBar::hidden();
        surf.write_pair(&h_path, &eta_path, &pb).unwrap();

        // head split dries the depression, eta = -100 < b = -50
        let h = std::fs::read_to_string(&h_path).unwrap();
        assert_eq!(h, "0 2000 100\n1 2000 100\n0 -2000 0\n1 -2000 0\n");

        // sea-level front floods the depression up to eta = 0
        let eta = std::fs::read_to_string(&eta_path).unwrap();
        assert_eq!(eta, "0 2000 100\n1 2000 100\n0 -2000 50\n1 -2000 50\n");
    }

    #[test]
    fn step_surface_splits_at_gate() {
        let step = StepSurface::benchmark();
        assert_eq!(step.eval(-128.0), 8.0);
        assert_eq!(step.eval(-0.001), 8.0);
        assert_eq!(step.eval(0.0), 0.4);
        assert_eq!(step.eval(1500.0), 0.4);
    }
}
