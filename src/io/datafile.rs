use crate::error::PrepError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One value in a solver parameter file. Booleans render Fortran-style.
#[derive(Debug, Clone)]
pub enum DataValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Int(v) => write!(f, "{}", v),
            // huge sentinels (dt_max and friends) stay in E notation
            DataValue::Float(v) if v.abs() >= 1e17 => write!(f, "{:e}", v),
            DataValue::Float(v) => write!(f, "{}", v),
            DataValue::Bool(true) => write!(f, "T"),
            DataValue::Bool(false) => write!(f, "F"),
            DataValue::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Int(v)
    }
}

impl From<usize> for DataValue {
    fn from(v: usize) -> Self {
        DataValue::Int(v as i64)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Float(v)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Bool(v)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::Str(v.to_string())
    }
}

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        DataValue::Str(v)
    }
}

#[derive(Debug, Clone)]
enum DataEntry {
    /// `values =: name` line.
    Keyed {
        name: String,
        values: Vec<DataValue>,
    },
    /// Bare row, used by the table files (gauges, regions, flowgrades).
    Row(Vec<DataValue>),
    Blank,
}

/// An ordered parameter file in the solver's `value =: name` format.
#[derive(Debug, Clone, Default)]
pub struct DataDocument {
    entries: Vec<DataEntry>,
}

impl DataDocument {
    pub fn new() -> Self {
        DataDocument::default()
    }

    pub fn put(&mut self, name: &str, value: impl Into<DataValue>) {
        self.put_list(name, vec![value.into()]);
    }

    pub fn put_list(&mut self, name: &str, values: Vec<DataValue>) {
        self.entries.push(DataEntry::Keyed {
            name: name.to_string(),
            values,
        });
    }

    pub fn row(&mut self, values: Vec<DataValue>) {
        self.entries.push(DataEntry::Row(values));
    }

    pub fn blank(&mut self) {
        self.entries.push(DataEntry::Blank);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                DataEntry::Keyed { name, values } => {
                    let joined = join(values);
                    out.push_str(&format!("{:<26} =: {}\n", joined, name));
                }
                DataEntry::Row(values) => {
                    out.push_str(&join(values));
                    out.push('\n');
                }
                DataEntry::Blank => out.push('\n'),
            }
        }
        out
    }
}

fn join(values: &[DataValue]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// An ordered `[section] / key = value` file.
#[derive(Debug, Clone, Default)]
pub struct IniDocument {
    sections: Vec<(String, Vec<(String, String)>)>,
}

impl IniDocument {
    pub fn new() -> Self {
        IniDocument::default()
    }

    /// Appends under the named section, opening it if it is not current.
    pub fn set(&mut self, section: &str, key: &str, value: impl fmt::Display) {
        match self.sections.last_mut() {
            Some((name, entries)) if name == section => {
                entries.push((key.to_string(), value.to_string()));
            }
            _ => {
                self.sections.push((
                    section.to_string(),
                    vec![(key.to_string(), value.to_string())],
                ));
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, entries) in &self.sections {
            out.push_str(&format!("[{}]\n", name));
            for (key, value) in entries {
                out.push_str(&format!("{} = {}\n", key, value));
            }
            out.push('\n');
        }
        out
    }
}

/// Receives rendered parameter files bound for the solver run directory.
pub trait RunConfigSink {
    fn write_data(&mut self, name: &str, doc: &DataDocument) -> Result<(), PrepError>;
    fn write_ini(&mut self, name: &str, doc: &IniDocument) -> Result<(), PrepError>;
}

/// Production sink: one file per document under the run directory.
#[derive(Debug)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, PrepError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| PrepError::output_write(&root, e))?;
        Ok(DataDir { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write(&self, name: &str, text: &str) -> Result<(), PrepError> {
        let path = self.root.join(name);
        fs::write(&path, text).map_err(|e| PrepError::output_write(&path, e))
    }
}

impl RunConfigSink for DataDir {
    fn write_data(&mut self, name: &str, doc: &DataDocument) -> Result<(), PrepError> {
        self.write(name, &doc.render())
    }

    fn write_ini(&mut self, name: &str, doc: &IniDocument) -> Result<(), PrepError> {
        self.write(name, &doc.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn keyed_entries_render_value_then_name() {
        let mut doc = DataDocument::new();
        doc.put("num_dim", 2usize);
        doc.put_list(
            "lower",
            vec![DataValue::Float(-146.25), DataValue::Float(-55.1125)],
        );
        doc.put("restart", false);
        doc.put("restart_file", "fort.chk00006");

        let text = doc.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], format!("{:<26} =: num_dim", "2"));
        assert_eq!(lines[1], format!("{:<26} =: lower", "-146.25 -55.1125"));
        assert_eq!(lines[2], format!("{:<26} =: restart", "F"));
        assert!(lines[3].ends_with("=: restart_file"));
        assert!(lines[3].starts_with("fort.chk00006"));
    }

    #[test]
    fn table_rows_render_bare() {
        let mut doc = DataDocument::new();
        doc.put("ngauges", 2usize);
        doc.blank();
        doc.row(vec![
            DataValue::Int(0),
            DataValue::Float(4.0),
            DataValue::Float(1.2),
        ]);
        let text = doc.render();
        assert!(text.contains("\n\n0 4 1.2\n"));
    }

    #[test]
    fn ini_groups_keys_by_section() {
        let mut doc = IniDocument::new();
        doc.set("user", "example", 1);
        doc.set("Options", "minlevel", 1);
        doc.set("Options", "maxlevel", 3);
        assert_eq!(
            doc.render(),
            "[user]\nexample = 1\n\n[Options]\nminlevel = 1\nmaxlevel = 3\n\n"
        );
    }

    #[test]
    fn data_dir_writes_named_files() {
        let dir = tempdir().unwrap();
        let mut sink = DataDir::create(dir.path().join("_data")).unwrap();
        let mut doc = DataDocument::new();
        doc.put("num_dim", 2usize);
        sink.write_data("claw.data", &doc).unwrap();

        let text = std::fs::read_to_string(dir.path().join("_data/claw.data")).unwrap();
        assert!(text.contains("=: num_dim"));
    }

    #[test]
    fn unwritable_root_is_an_output_error() {
        // a plain file in the way of the run directory
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let err = DataDir::create(blocker.join("_data")).unwrap_err();
        assert!(matches!(err, PrepError::OutputWrite { .. }));
    }
}
