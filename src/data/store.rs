use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{PlotterError, Result};

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

/// Parsing options for one load of a delimited file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Single-byte field separator.
    pub delimiter: u8,
    /// If true, the first data row holds per-field unit labels, not values.
    pub unit_in_data: bool,
    /// If true, previously loaded data is dropped before reading the file.
    pub clear_before_load: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            unit_in_data: true,
            clear_before_load: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Field – one named column
// ---------------------------------------------------------------------------

/// A named column: raw strings in row order, a unit label, and the cleaned
/// numeric vector (`None` when any value in the column failed to parse).
#[derive(Debug, Clone, Default)]
struct Field {
    raw: Vec<String>,
    unit: String,
    values: Option<Vec<f64>>,
}

// ---------------------------------------------------------------------------
// TabularDataStore
// ---------------------------------------------------------------------------

/// Name-indexed table of numeric series read from a delimited text file.
///
/// A conversion failure in one field never aborts the load: that field just
/// serves an empty vector and the problem lands in [`diagnostics`].
///
/// [`diagnostics`]: TabularDataStore::diagnostics
#[derive(Debug, Default)]
pub struct TabularDataStore {
    fields: HashMap<String, Field>,
    field_order: Vec<String>,
    source: Option<(PathBuf, LoadOptions)>,
    diagnostics: Vec<String>,
}

impl TabularDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` as a header-delimited table.
    ///
    /// The header row supplies field names (first-seen order is preserved);
    /// every later row appends one raw value per field. With
    /// `unit_in_data`, the first data row becomes per-field unit labels.
    ///
    /// An unreadable file fails the whole load; note that a requested
    /// `clear_before_load` has already run by then, which is the documented
    /// option semantics rather than an accident.
    pub fn load(&mut self, path: &Path, options: LoadOptions) -> Result<()> {
        log::debug!("loading {} with {:?}", path.display(), options);
        if options.clear_before_load {
            self.clear();
        }

        let file = File::open(path).map_err(|e| PlotterError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| PlotterError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // Positional column mapping; a name duplicated within one header
        // row keeps its first column only. `base_len` remembers how many
        // raw values each field held before this load, so the unit-row
        // strip below only ever touches rows appended by this load.
        let mut seen: HashSet<&String> = HashSet::new();
        let mut columns: Vec<Option<String>> = Vec::with_capacity(headers.len());
        let mut base_len: HashMap<String, usize> = HashMap::new();
        for name in &headers {
            if !seen.insert(name) {
                self.diagnose(format!("duplicate field name {name:?}, keeping first"));
                columns.push(None);
                continue;
            }
            if !self.fields.contains_key(name) {
                self.fields.insert(name.clone(), Field::default());
                self.field_order.push(name.clone());
            }
            base_len.insert(name.clone(), self.fields[name].raw.len());
            columns.push(Some(name.clone()));
        }

        for (row_no, result) in reader.records().enumerate() {
            let record = result.map_err(|e| PlotterError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;

            if record.len() != headers.len() {
                self.diagnose(format!(
                    "row {} has {} values, expected {}",
                    row_no + 1,
                    record.len(),
                    headers.len()
                ));
            }

            // Distribute positionally; short rows leave trailing fields
            // untouched, conversion reports any resulting unevenness.
            for (column, value) in columns.iter().zip(record.iter()) {
                let Some(name) = column else { continue };
                if let Some(field) = self.fields.get_mut(name) {
                    field.raw.push(value.to_string());
                }
            }
        }

        if options.unit_in_data {
            for (name, &start) in &base_len {
                if let Some(field) = self.fields.get_mut(name) {
                    if field.raw.len() > start {
                        field.unit = field.raw.remove(start);
                    }
                }
            }
        }

        self.convert_all_fields();
        self.source = Some((path.to_path_buf(), options));
        log::info!(
            "loaded {} fields from {}",
            self.field_order.len(),
            path.display()
        );
        Ok(())
    }

    /// Re-read the remembered file with the remembered options.
    pub fn refresh(&mut self) -> Result<()> {
        match self.source.clone() {
            Some((path, options)) => self.load(&path, options),
            None => {
                self.diagnose("refresh requested before any successful load".to_string());
                Err(PlotterError::NoDataLoaded)
            }
        }
    }

    /// Drop all fields; the remembered path/options survive so
    /// [`refresh`](Self::refresh) still works.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.field_order.clear();
        self.diagnostics.clear();
    }

    /// [`clear`](Self::clear) plus forgetting the remembered path/options.
    pub fn reset(&mut self) {
        self.clear();
        self.source = None;
    }

    // -- queries (no side effects) --

    /// Field names in first-seen order.
    pub fn field_names(&self) -> &[String] {
        &self.field_order
    }

    pub fn has_data(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Unit label for a field; empty when units are untracked or the field
    /// is unknown.
    pub fn unit(&self, field_name: &str) -> String {
        match self.fields.get(field_name) {
            Some(field) => field.unit.clone(),
            None => {
                log::warn!("unit query for unknown field {field_name:?}");
                String::new()
            }
        }
    }

    /// Cleaned numeric vector for a field; empty when the field is unknown
    /// or its conversion failed.
    pub fn data(&self, field_name: &str) -> Vec<f64> {
        match self.fields.get(field_name) {
            Some(field) => field.values.clone().unwrap_or_default(),
            None => {
                log::warn!("data query for unknown field {field_name:?}");
                Vec::new()
            }
        }
    }

    /// Path of the last successfully loaded file, if any.
    pub fn current_file(&self) -> Option<&Path> {
        self.source.as_ref().map(|(path, _)| path.as_path())
    }

    /// Problems recorded during the last load (bad rows, unconvertible
    /// fields). Never fatal.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    // -- internals --

    fn diagnose(&mut self, message: String) {
        log::warn!("{message}");
        self.diagnostics.push(message);
    }

    fn convert_all_fields(&mut self) {
        let mut failed = Vec::new();
        for (name, field) in &mut self.fields {
            match convert_field(&field.raw) {
                Ok(values) => field.values = Some(values),
                Err(bad) => {
                    failed.push(format!(
                        "field {name:?}: value {bad:?} is not numeric, field unusable"
                    ));
                    field.values = None;
                }
            }
        }
        for message in failed {
            self.diagnose(message);
        }
    }
}

/// Clean and parse one column: `,` decimal separators become `.`, then
/// every value must parse as `f64`. The first offending value fails the
/// whole column.
fn convert_field(raw: &[String]) -> std::result::Result<Vec<f64>, String> {
    raw.iter()
        .map(|value| {
            let cleaned = value.trim().replace(',', ".");
            cleaned.parse::<f64>().map_err(|_| value.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn options(unit_in_data: bool) -> LoadOptions {
        LoadOptions {
            unit_in_data,
            ..LoadOptions::default()
        }
    }

    #[test]
    fn load_without_unit_row() {
        let file = write_file("a;b;c\n1;2;3\n4;5;6\n");
        let mut store = TabularDataStore::new();
        store.load(file.path(), options(false)).unwrap();

        assert_eq!(store.field_names(), ["a", "b", "c"]);
        assert_eq!(store.data("b"), vec![2.0, 5.0]);
        assert_eq!(store.data("a").len(), 2);
        assert_eq!(store.unit("a"), "");
        assert!(store.diagnostics().is_empty());
    }

    #[test]
    fn unit_row_becomes_labels() {
        let file = write_file("t;v\ns;m/s\n0;1,5\n1;2,5\n");
        let mut store = TabularDataStore::new();
        store.load(file.path(), options(true)).unwrap();

        assert_eq!(store.unit("t"), "s");
        assert_eq!(store.unit("v"), "m/s");
        assert_eq!(store.data("t"), vec![0.0, 1.0]);
        assert_eq!(store.data("v"), vec![1.5, 2.5]);
    }

    #[test]
    fn comma_cleaning_is_idempotent() {
        let file = write_file("a\n1.5\n2,5\n");
        let mut store = TabularDataStore::new();
        store.load(file.path(), options(false)).unwrap();
        assert_eq!(store.data("a"), vec![1.5, 2.5]);
    }

    #[test]
    fn bad_value_isolates_one_field() {
        let file = write_file("a;b;c\nx;5;6\n7;8;9\n");
        let mut store = TabularDataStore::new();
        store.load(file.path(), options(false)).unwrap();

        assert!(store.data("a").is_empty());
        assert!(!store.diagnostics().is_empty());
        assert_eq!(store.data("b"), vec![5.0, 8.0]);
        assert_eq!(store.data("c"), vec![6.0, 9.0]);
    }

    #[test]
    fn unknown_field_is_empty_not_fatal() {
        let file = write_file("a\n1\n");
        let mut store = TabularDataStore::new();
        store.load(file.path(), options(false)).unwrap();
        assert!(store.data("missing").is_empty());
        assert_eq!(store.unit("missing"), "");
    }

    #[test]
    fn missing_file_fails_load() {
        let mut store = TabularDataStore::new();
        let err = store
            .load(Path::new("/no/such/file.csv"), LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, PlotterError::Io { .. }));
        assert!(!store.has_data());
    }

    #[test]
    fn custom_delimiter() {
        let file = write_file("a,b\n1,2\n");
        let mut store = TabularDataStore::new();
        store
            .load(
                file.path(),
                LoadOptions {
                    delimiter: b',',
                    unit_in_data: false,
                    clear_before_load: true,
                },
            )
            .unwrap();
        assert_eq!(store.field_names(), ["a", "b"]);
        assert_eq!(store.data("b"), vec![2.0]);
    }

    #[test]
    fn uneven_row_is_diagnosed() {
        let file = write_file("a;b\n1;2\n3\n");
        let mut store = TabularDataStore::new();
        store.load(file.path(), options(false)).unwrap();
        assert!(store
            .diagnostics()
            .iter()
            .any(|d| d.contains("expected 2")));
        // "a" got both rows, "b" only the first.
        assert_eq!(store.data("a"), vec![1.0, 3.0]);
        assert_eq!(store.data("b"), vec![2.0]);
    }

    #[test]
    fn accumulating_load_strips_unit_row_per_load() {
        let file = write_file("a\nV\n1\n2\n");
        let options = LoadOptions {
            clear_before_load: false,
            ..LoadOptions::default()
        };
        let mut store = TabularDataStore::new();
        store.load(file.path(), options).unwrap();
        assert_eq!(store.unit("a"), "V");
        assert_eq!(store.data("a"), vec![1.0, 2.0]);

        // Second load appends; its unit row must be stripped from the
        // newly appended rows, not from the accumulated column.
        store.load(file.path(), options).unwrap();
        assert_eq!(store.unit("a"), "V");
        assert_eq!(store.data("a"), vec![1.0, 2.0, 1.0, 2.0]);
        assert!(store.diagnostics().is_empty());
    }

    #[test]
    fn refresh_rereads_the_file() {
        let mut file = write_file("a\n1\n");
        let mut store = TabularDataStore::new();
        store.load(file.path(), options(false)).unwrap();
        assert_eq!(store.data("a"), vec![1.0]);

        // Rewrite the file in place, then refresh.
        file.as_file_mut().set_len(0).unwrap();
        use std::io::Seek;
        file.as_file_mut().rewind().unwrap();
        file.write_all(b"a\n1\n2\n").unwrap();
        file.flush().unwrap();

        store.refresh().unwrap();
        assert_eq!(store.data("a"), vec![1.0, 2.0]);
    }

    #[test]
    fn refresh_without_load_is_an_error() {
        let mut store = TabularDataStore::new();
        assert!(matches!(
            store.refresh().unwrap_err(),
            PlotterError::NoDataLoaded
        ));
        assert!(!store.diagnostics().is_empty());
    }

    #[test]
    fn clear_keeps_source_reset_forgets_it() {
        let file = write_file("a\n1\n");
        let mut store = TabularDataStore::new();
        store.load(file.path(), options(false)).unwrap();

        store.clear();
        assert!(!store.has_data());
        assert!(store.refresh().is_ok());
        assert!(store.has_data());

        store.reset();
        assert!(store.refresh().is_err());
    }
}
