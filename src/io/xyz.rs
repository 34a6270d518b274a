use crate::error::PrepError;
use crate::grid::RasterGrid;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes a grid as `x y value` triples, row-major, no header.
pub fn write_grid(grid: &RasterGrid, path: &Path) -> Result<(), PrepError> {
    let file = File::create(path).map_err(|e| PrepError::output_write(path, e))?;
    let mut out = BufWriter::new(file);
    for i in 0..grid.rows() {
        for j in 0..grid.cols() {
            let (x, y, b) = grid.sample(i, j);
            writeln!(out, "{} {} {}", x, y, b).map_err(|e| PrepError::output_write(path, e))?;
        }
    }
    out.flush().map_err(|e| PrepError::output_write(path, e))
}

/// Reads `x y value` triples back, one per line, in file order.
pub fn read_triples(path: &Path) -> Result<Vec<(f64, f64, f64)>, PrepError> {
    let file = File::open(path).map_err(|e| PrepError::source_read(path, e.to_string()))?;
    let mut triples = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| PrepError::source_read(path, e.to_string()))?;
        let mut fields = line.split_whitespace().map(|tok| tok.parse::<f64>());
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(Ok(x)), Some(Ok(y)), Some(Ok(v)), None) => triples.push((x, y, v)),
            _ => {
                return Err(PrepError::source_read(
                    path,
                    format!("line {} is not an x y value triple: {:?}", lineno + 1, line),
                ));
            }
        }
    }
    Ok(triples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qinit::{DamLine, EtaSplit, InitSurface};
    use indicatif::ProgressBar;
    use tempfile::tempdir;

    #[test]
    fn lines_come_out_row_major() {
        let grid = RasterGrid::uniform([0.0, 0.0], [3.0, 2.0], 4, 3, |x, y| x * 10.0 + y).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.xyz");
        write_grid(&grid, &path).unwrap();

        let triples = read_triples(&path).unwrap();
        assert_eq!(triples.len(), grid.len());
        for (n, &(x, y, v)) in triples.iter().enumerate() {
            let (i, j) = (n / grid.cols(), n % grid.cols());
            assert_eq!((x, y, v), grid.sample(i, j));
        }
    }

    #[test]
    fn depth_file_round_trips_through_text() {
        let dam = DamLine::malpasset();
        let grid = RasterGrid::uniform(
            [dam.x0, 1842.5e3],
            [dam.x5, 1846.5e3],
            15,
            11,
            |x, y| 0.02 * (x - 953.0e3) + 0.01 * (y - 1842.0e3) - 40.0,
        )
        .unwrap();
        let surf = InitSurface::new(&grid, &dam);

        let dir = tempdir().unwrap();
        let path = dir.path().join("init_h.xyz");
        surf.write_depth_file(&path, EtaSplit::HEAD, &ProgressBar::hidden())
            .unwrap();

        let triples = read_triples(&path).unwrap();
        assert_eq!(triples.len(), grid.len());
        for (n, &(x, y, v)) in triples.iter().enumerate() {
            let (i, j) = (n / grid.cols(), n % grid.cols());
            let (gx, gy, _) = grid.sample(i, j);
            // coordinates survive the text round trip exactly
            assert_eq!((x, y), (gx, gy));
            assert!((v - surf.depth(i, j, EtaSplit::HEAD)).abs() < 1e-12);
        }
    }

    #[test]
    fn malformed_line_is_a_source_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.xyz");
        std::fs::write(&path, "1.0 2.0 3.0\n4.0 five 6.0\n").unwrap();
        assert!(matches!(
            read_triples(&path),
            Err(PrepError::SourceRead { .. })
        ));
    }
}
