use crate::error::PrepError;
use serde::Deserialize;
use std::path::Path;

// Gauges record for the whole run unless the window says otherwise.
const WINDOW_END: f64 = 1e10;

/// One row of the case's gauge-location file.
#[derive(Debug, Deserialize)]
struct GaugeRecord {
    x: f64,
    y: f64,
}

/// Monitoring point handed to the solver with its recording window.
#[derive(Debug, Clone, Copy)]
pub struct Gauge {
    pub id: i64,
    pub x: f64,
    pub y: f64,
    pub t_start: f64,
    pub t_end: f64,
}

/// Loads gauge locations from CSV; ids are assigned by file position.
pub fn read_gauges(path: &Path) -> Result<Vec<Gauge>, PrepError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PrepError::source_read(path, e.to_string()))?;

    let mut gauges = Vec::new();
    for (i, record) in rdr.deserialize::<GaugeRecord>().enumerate() {
        let record = record.map_err(|e| PrepError::source_read(path, e.to_string()))?;
        gauges.push(Gauge {
            id: i as i64,
            x: record.x,
            y: record.y,
            t_start: 0.0,
            t_end: WINDOW_END,
        });
    }
    Ok(gauges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_locations_in_file_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gauge_loc.csv");
        std::fs::write(&path, "x,y\n100.5, -20.0\n200.0, 35.5\n").unwrap();

        let gauges = read_gauges(&path).unwrap();
        assert_eq!(gauges.len(), 2);
        assert_eq!(gauges[0].id, 0);
        assert_eq!((gauges[0].x, gauges[0].y), (100.5, -20.0));
        assert_eq!(gauges[1].id, 1);
        assert_eq!((gauges[1].x, gauges[1].y), (200.0, 35.5));
        assert_eq!(gauges[0].t_start, 0.0);
        assert_eq!(gauges[0].t_end, 1e10);
    }

    #[test]
    fn malformed_row_is_a_source_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gauge_loc.csv");
        std::fs::write(&path, "x,y\nnot-a-number, 3.0\n").unwrap();
        assert!(matches!(
            read_gauges(&path),
            Err(PrepError::SourceRead { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_source_error() {
        let path = Path::new("/nonexistent/gauge_loc.csv");
        assert!(matches!(
            read_gauges(path),
            Err(PrepError::SourceRead { .. })
        ));
    }
}
