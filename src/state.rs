use std::collections::BTreeSet;
use std::path::Path;

use crate::data::{LoadOptions, TabularDataStore};
use crate::series::{SeriesId, SeriesRegistry};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Inputs of the "series from function" window, kept as text until submit.
pub struct FunctionInput {
    pub open: bool,
    pub name: String,
    pub expression: String,
    pub x_min: String,
    pub x_max: String,
    pub samples: String,
}

impl Default for FunctionInput {
    fn default() -> Self {
        Self {
            open: false,
            name: "square".to_string(),
            expression: "x*x".to_string(),
            x_min: "1".to_string(),
            x_max: "10".to_string(),
            samples: "100".to_string(),
        }
    }
}

/// The full UI state, independent of rendering.
///
/// This is the composition root: it owns the one `TabularDataStore` and the
/// one `SeriesRegistry` and hands them to whoever needs them.
pub struct AppState {
    pub store: TabularDataStore,
    pub registry: SeriesRegistry,

    /// Parsing options edited in the top bar, applied on the next load.
    pub delimiter: String,
    pub unit_in_data: bool,

    /// Field picked for the x axis.
    pub x_field: Option<String>,
    /// Fields ticked for the y axis.
    pub y_fields: BTreeSet<String>,

    /// Series currently drawn in the plot.
    pub selected: BTreeSet<SeriesId>,

    /// Function-window inputs.
    pub function_input: FunctionInput,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            store: TabularDataStore::new(),
            registry: SeriesRegistry::new(),
            delimiter: ";".to_string(),
            unit_in_data: true,
            x_field: None,
            y_fields: BTreeSet::new(),
            selected: BTreeSet::new(),
            function_input: FunctionInput::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// State pre-populated by the CLI one-shot mode: data already loaded,
    /// series already minted and selected. The load options used on the
    /// command line carry over into the top-bar toggles.
    pub fn preloaded(
        store: TabularDataStore,
        registry: SeriesRegistry,
        selected: Vec<SeriesId>,
        options: LoadOptions,
    ) -> Self {
        let x_field = store.field_names().first().cloned();
        Self {
            store,
            registry,
            x_field,
            selected: selected.into_iter().collect(),
            delimiter: (options.delimiter as char).to_string(),
            unit_in_data: options.unit_in_data,
            ..Self::default()
        }
    }

    /// The [`LoadOptions`] matching the current top-bar toggles, or a
    /// user-facing message when the delimiter box holds anything other
    /// than one ASCII character.
    pub fn load_options(&self) -> Result<LoadOptions, String> {
        match self.delimiter.as_bytes() {
            &[delimiter] => Ok(LoadOptions {
                delimiter,
                unit_in_data: self.unit_in_data,
                clear_before_load: true,
            }),
            _ => Err("Delimiter must be a single ASCII character".to_string()),
        }
    }

    /// Load (or reload) a file with the current options, then resync any
    /// field-bound series.
    pub fn load_file(&mut self, path: &Path) {
        let options = match self.load_options() {
            Ok(options) => options,
            Err(message) => {
                self.status_message = Some(message);
                return;
            }
        };
        match self.store.load(path, options) {
            Ok(()) => {
                self.registry.refresh(&self.store);
                self.x_field = self.store.field_names().first().cloned();
                self.y_fields.clear();
                self.status_message = match self.store.diagnostics().len() {
                    0 => None,
                    n => Some(format!("Loaded with {n} warning(s), see log")),
                };
            }
            Err(e) => {
                log::error!("load failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Mint one series per ticked y field against the picked x field and
    /// add them to the plot.
    pub fn add_field_series(&mut self) {
        let Some(x_field) = self.x_field.clone() else {
            self.status_message = Some("Pick an x field first".to_string());
            return;
        };
        if self.y_fields.is_empty() {
            self.status_message = Some("Tick at least one y field".to_string());
            return;
        }
        let y_fields: Vec<String> = self.y_fields.iter().cloned().collect();
        match self
            .registry
            .create_many_from_fields(&self.store, &x_field, &y_fields)
        {
            Ok(ids) => {
                self.selected.extend(ids);
                self.status_message = None;
            }
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    /// Submit the function window: sample the expression into a new series.
    pub fn add_function_series(&mut self) {
        let input = &self.function_input;
        let parsed = (
            input.x_min.trim().parse::<f64>(),
            input.x_max.trim().parse::<f64>(),
            input.samples.trim().parse::<usize>(),
        );
        let (Ok(x_min), Ok(x_max), Ok(samples)) = parsed else {
            self.status_message = Some("x min/x max/samples must be numeric".to_string());
            return;
        };
        let y_label = if input.name.trim().is_empty() {
            input.expression.clone()
        } else {
            input.name.trim().to_string()
        };
        match self.registry.create_from_function(
            &input.expression,
            x_min,
            x_max,
            samples,
            "x",
            &y_label,
        ) {
            Ok(series) => {
                let id = series.id;
                self.selected.insert(id);
                self.function_input.open = false;
                self.status_message = None;
            }
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    /// Toggle a series in the plot from its list-widget label.
    pub fn toggle_series_label(&mut self, label: &str) {
        match self.registry.resolve_label(label) {
            Ok(series) => {
                let id = series.id;
                if !self.selected.remove(&id) {
                    self.selected.insert(id);
                }
            }
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Re-read the current file from disk and resync field-bound series.
    pub fn refresh_data(&mut self) {
        match self.store.refresh() {
            Ok(()) => {
                self.registry.refresh(&self.store);
                self.status_message = None;
            }
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    /// Drop the loaded table (refresh stays possible; series keep their
    /// existing vectors until then).
    pub fn clear_data(&mut self) {
        self.store.clear();
        self.x_field = None;
        self.y_fields.clear();
        self.status_message = Some("Data cleared".to_string());
    }

    /// Like [`clear_data`](Self::clear_data), but also forgets the
    /// remembered file, so refresh no longer applies.
    pub fn reset_data(&mut self) {
        self.store.reset();
        self.x_field = None;
        self.y_fields.clear();
        self.status_message = Some("Data reset".to_string());
    }
}
