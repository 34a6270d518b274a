use crate::error::PrepError;
use crate::grid::RasterGrid;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// Raster topography layouts understood by the solver's initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopoType {
    /// `x y z` triples, no header. Output-only here.
    Xyz,
    /// Six-line header, then one value per line.
    OnePerLine,
    /// Six-line header, then one grid row per line.
    RowPerLine,
}

impl TopoType {
    pub fn code(self) -> i64 {
        match self {
            TopoType::Xyz => 1,
            TopoType::OnePerLine => 2,
            TopoType::RowPerLine => 3,
        }
    }

    /// Maps the customary file extensions onto a layout.
    pub fn from_extension(ext: &str) -> Option<TopoType> {
        match ext {
            "xyz" | "tt1" | "topotype1" => Some(TopoType::Xyz),
            "tt2" | "topotype2" => Some(TopoType::OnePerLine),
            "tt3" | "topotype3" | "asc" => Some(TopoType::RowPerLine),
            _ => None,
        }
    }
}

/// Header of a gridded (type 2/3) topography file.
#[derive(Debug, Clone, Copy)]
pub struct TopoHeader {
    pub cols: usize,
    pub rows: usize,
    pub xll: f64,
    pub yll: f64,
    pub cellsize: f64,
    pub nodata: f64,
}

impl TopoHeader {
    pub fn x_upper(&self) -> f64 {
        self.xll + self.cellsize * (self.cols - 1) as f64
    }

    pub fn y_upper(&self) -> f64 {
        self.yll + self.cellsize * (self.rows - 1) as f64
    }
}

/// Anything that can yield a co-registered (X, Y, B) grid.
pub trait RasterSource {
    fn read_grid(&mut self) -> Result<RasterGrid, PrepError>;
}

/// Topography file on disk.
#[derive(Debug, Clone)]
pub struct TopoFile {
    path: PathBuf,
    topo_type: TopoType,
}

impl TopoFile {
    pub fn new(path: impl Into<PathBuf>, topo_type: TopoType) -> Self {
        TopoFile {
            path: path.into(),
            topo_type,
        }
    }

    fn open(&self) -> Result<BufReader<File>, PrepError> {
        let file = File::open(&self.path)
            .map_err(|e| PrepError::source_read(&self.path, e.to_string()))?;
        Ok(BufReader::new(file))
    }

    /// Reads just the six header lines.
    pub fn header(&self) -> Result<TopoHeader, PrepError> {
        if self.topo_type == TopoType::Xyz {
            return Err(PrepError::source_read(
                &self.path,
                "xyz topography has no header; supply a type 2 or 3 file",
            ));
        }
        parse_header(self.open()?).map_err(|detail| PrepError::source_read(&self.path, detail))
    }
}

impl RasterSource for TopoFile {
    fn read_grid(&mut self) -> Result<RasterGrid, PrepError> {
        if self.topo_type == TopoType::Xyz {
            return Err(PrepError::source_read(
                &self.path,
                "xyz topography is not gridded; supply a type 2 or 3 file",
            ));
        }
        let mut reader = self.open()?;
        let header = parse_header(&mut reader)
            .map_err(|detail| PrepError::source_read(&self.path, detail))?;
        let values = parse_values(reader)
            .map_err(|detail| PrepError::source_read(&self.path, detail))?;
        grid_from_header(&header, values)
    }
}

/// Pulls the numeric field out of a header line; both `2021 mx` and
/// `ncols 2021` orderings occur in the wild.
fn header_value(line: &str) -> Option<f64> {
    line.split_whitespace().find_map(|tok| tok.parse::<f64>().ok())
}

fn parse_header(mut reader: impl BufRead) -> Result<TopoHeader, String> {
    let mut fields = [0.0f64; 6];
    let names = ["ncols", "nrows", "xllcorner", "yllcorner", "cellsize", "nodata_value"];
    let mut line = String::new();
    for (k, field) in fields.iter_mut().enumerate() {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .map_err(|e| format!("header line {}: {}", k + 1, e))?;
        if n == 0 {
            return Err(format!("truncated header: missing {}", names[k]));
        }
        *field = header_value(&line)
            .ok_or_else(|| format!("header line {:?} has no numeric {}", line.trim(), names[k]))?;
    }

    let cols = fields[0];
    let rows = fields[1];
    if cols < 1.0 || rows < 1.0 || cols.fract() != 0.0 || rows.fract() != 0.0 {
        return Err(format!("bad grid dimensions {} x {}", cols, rows));
    }
    if fields[4] <= 0.0 {
        return Err(format!("cellsize must be positive, got {}", fields[4]));
    }
    Ok(TopoHeader {
        cols: cols as usize,
        rows: rows as usize,
        xll: fields[2],
        yll: fields[3],
        cellsize: fields[4],
        nodata: fields[5],
    })
}

/// Reads every remaining whitespace-separated value; handles both the
/// one-per-line and row-per-line layouts.
fn parse_values(reader: impl BufRead) -> Result<Vec<f64>, String> {
    let mut values = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| e.to_string())?;
        for tok in line.split_whitespace() {
            let v = tok
                .parse::<f64>()
                .map_err(|_| format!("bad elevation value {:?}", tok))?;
            values.push(v);
        }
    }
    Ok(values)
}

/// Expands the header into coordinate arrays; rows run north to south, as
/// stored in the file.
fn grid_from_header(header: &TopoHeader, values: Vec<f64>) -> Result<RasterGrid, PrepError> {
    let n = header.rows * header.cols;
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let y_upper = header.y_upper();
    for i in 0..header.rows {
        let yi = y_upper - i as f64 * header.cellsize;
        for j in 0..header.cols {
            x.push(header.xll + j as f64 * header.cellsize);
            y.push(yi);
        }
    }
    RasterGrid::new(header.rows, header.cols, x, y, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "3 mx\n2 my\n10.0 xllcorner\n20.0 yllcorner\n5.0 cellsize\n-9999 nodata_value\n";

    #[test]
    fn parses_value_first_header() {
        let h = parse_header(Cursor::new(HEADER)).unwrap();
        assert_eq!((h.cols, h.rows), (3, 2));
        assert_eq!(h.x_upper(), 20.0);
        assert_eq!(h.y_upper(), 25.0);
    }

    #[test]
    fn parses_keyword_first_header() {
        let text = "ncols 3\nnrows 2\nxllcorner 10.0\nyllcorner 20.0\ncellsize 5.0\nnodata_value -9999\n";
        let h = parse_header(Cursor::new(text)).unwrap();
        assert_eq!((h.cols, h.rows), (3, 2));
        assert_eq!(h.xll, 10.0);
    }

    #[test]
    fn rejects_truncated_header() {
        let err = parse_header(Cursor::new("3 mx\n2 my\n")).unwrap_err();
        assert!(err.contains("truncated"));
    }

    #[test]
    fn one_per_line_grid_reads_north_to_south() {
        let text = format!("{}1\n2\n3\n4\n5\n6\n", HEADER);
        let mut reader = Cursor::new(text);
        let header = parse_header(&mut reader).unwrap();
        let grid = grid_from_header(&header, parse_values(reader).unwrap()).unwrap();

        assert_eq!(grid.sample(0, 0), (10.0, 25.0, 1.0));
        assert_eq!(grid.sample(0, 2), (20.0, 25.0, 3.0));
        assert_eq!(grid.sample(1, 0), (10.0, 20.0, 4.0));
        assert_eq!(grid.sample(1, 2), (20.0, 20.0, 6.0));
    }

    #[test]
    fn row_per_line_parses_identically() {
        let text = format!("{}1 2 3\n4 5 6\n", HEADER);
        let mut reader = Cursor::new(text);
        let header = parse_header(&mut reader).unwrap();
        let grid = grid_from_header(&header, parse_values(reader).unwrap()).unwrap();
        assert_eq!(grid.sample(1, 1), (15.0, 20.0, 5.0));
    }

    #[test]
    fn value_count_mismatch_is_a_shape_error() {
        let mut reader = Cursor::new(format!("{}1\n2\n3\n4\n5\n", HEADER));
        let header = parse_header(&mut reader).unwrap();
        let err = grid_from_header(&header, parse_values(reader).unwrap()).unwrap_err();
        assert!(matches!(err, PrepError::ShapeMismatch(_)));
    }

    #[test]
    fn missing_file_is_a_source_error() {
        let mut topo = TopoFile::new("/nonexistent/grid.tt2", TopoType::OnePerLine);
        assert!(matches!(
            topo.read_grid(),
            Err(PrepError::SourceRead { .. })
        ));
    }

    #[test]
    fn extension_mapping() {
        assert_eq!(TopoType::from_extension("topotype2"), Some(TopoType::OnePerLine));
        assert_eq!(TopoType::from_extension("asc"), Some(TopoType::RowPerLine));
        assert_eq!(TopoType::from_extension("gpkg"), None);
    }
}
