use std::collections::BTreeMap;

use crate::data::TabularDataStore;
use crate::error::{PlotterError, Result};
use crate::expr::{linspace, Expr};

use super::model::{Series, SeriesId, SeriesSource};

// ---------------------------------------------------------------------------
// SeriesRegistry
// ---------------------------------------------------------------------------

/// Mints stable identifiers for derived series and stores them.
///
/// Not a singleton: the composition root (AppState or the CLI handler)
/// constructs one and passes it down. Identifiers are strictly increasing
/// for the registry's lifetime and never reused; the registry does not
/// deduplicate, so asking for the same field pair twice yields two series.
#[derive(Debug, Default)]
pub struct SeriesRegistry {
    series: BTreeMap<SeriesId, Series>,
    next_id: u64,
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a series from two named columns of `store`, taking data and
    /// unit labels from it.
    pub fn create_from_fields(
        &mut self,
        store: &TabularDataStore,
        x_field: &str,
        y_field: &str,
    ) -> Result<&Series> {
        for name in [x_field, y_field] {
            if !store.field_names().iter().any(|f| f == name) {
                return Err(PlotterError::UnknownField(name.to_string()));
            }
        }
        let x = store.data(x_field);
        let y = store.data(y_field);
        log::debug!("series from fields {x_field:?} x {y_field:?} ({} points)", x.len());
        self.mint(
            x,
            y,
            x_field.to_string(),
            y_field.to_string(),
            store.unit(x_field),
            store.unit(y_field),
            SeriesSource::Fields {
                x_field: x_field.to_string(),
                y_field: y_field.to_string(),
            },
        )
    }

    /// One series per y field, all against the same x field. Fails on the
    /// first bad pair; series created before the failure stay registered.
    pub fn create_many_from_fields(
        &mut self,
        store: &TabularDataStore,
        x_field: &str,
        y_fields: &[String],
    ) -> Result<Vec<SeriesId>> {
        y_fields
            .iter()
            .map(|y_field| Ok(self.create_from_fields(store, x_field, y_field)?.id))
            .collect()
    }

    /// Register caller-supplied vectors (synthetic or externally computed
    /// data). Rejects a length mismatch before anything is stored.
    pub fn create_from_values(
        &mut self,
        x: Vec<f64>,
        y: Vec<f64>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        x_unit: impl Into<String>,
        y_unit: impl Into<String>,
    ) -> Result<&Series> {
        self.mint(
            x,
            y,
            x_label.into(),
            y_label.into(),
            x_unit.into(),
            y_unit.into(),
            SeriesSource::Values,
        )
    }

    /// Sample a math expression in `x` over the closed interval
    /// `[x_min, x_max]`. The expression is parsed against a fixed grammar
    /// first; a rejected expression never evaluates anything.
    pub fn create_from_function(
        &mut self,
        expression: &str,
        x_min: f64,
        x_max: f64,
        samples: usize,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Result<&Series> {
        let expr = Expr::parse(expression)?;
        let x = linspace(x_min, x_max, samples)?;
        let y: Vec<f64> = x.iter().map(|&xi| expr.eval(xi)).collect();
        log::debug!("series from function {expression:?} over [{x_min}, {x_max}]");
        self.mint(
            x,
            y,
            x_label.into(),
            y_label.into(),
            String::new(),
            String::new(),
            SeriesSource::Function {
                expression: expression.to_string(),
            },
        )
    }

    pub fn get(&self, id: SeriesId) -> Option<&Series> {
        self.series.get(&id)
    }

    /// Resolve a series back from its display label (`id=<n> [...]`,
    /// trailing text tolerated). This is the inverse of
    /// [`Series::label`] for list widgets that hand back plain strings.
    pub fn resolve_label(&self, label: &str) -> Result<&Series> {
        let id = parse_label_id(label)
            .ok_or_else(|| PlotterError::UnknownSeries(label.to_string()))?;
        self.series
            .get(&SeriesId(id))
            .ok_or_else(|| PlotterError::UnknownSeries(label.to_string()))
    }

    /// Resync `Fields`-sourced series against freshly loaded store data.
    ///
    /// Best effort: a series whose fields disappeared (or whose fresh
    /// vectors disagree in length) is left as it was. `Values` and
    /// `Function` series are never touched.
    pub fn refresh(&mut self, store: &TabularDataStore) {
        for series in self.series.values_mut() {
            let SeriesSource::Fields { x_field, y_field } = &series.source else {
                continue;
            };
            let present = |name: &str| store.field_names().iter().any(|f| f == name);
            if !present(x_field) || !present(y_field) {
                log::warn!("series {} no longer matches fields, not refreshed", series.id);
                continue;
            }
            let x = store.data(x_field);
            let y = store.data(y_field);
            if x.len() != y.len() {
                log::warn!(
                    "series {} refresh skipped: x has {} values, y has {}",
                    series.id,
                    x.len(),
                    y.len()
                );
                continue;
            }
            series.x = x;
            series.y = y;
            series.x_unit = store.unit(x_field);
            series.y_unit = store.unit(y_field);
        }
    }

    /// All series in creation (= identifier) order.
    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    #[allow(clippy::too_many_arguments)]
    fn mint(
        &mut self,
        x: Vec<f64>,
        y: Vec<f64>,
        x_label: String,
        y_label: String,
        x_unit: String,
        y_unit: String,
        source: SeriesSource,
    ) -> Result<&Series> {
        if x.len() != y.len() {
            return Err(PlotterError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        let id = SeriesId(self.next_id);
        self.next_id += 1;
        let series = Series {
            id,
            x,
            y,
            x_label,
            y_label,
            x_unit,
            y_unit,
            source,
        };
        log::debug!("created series {}", series.label());
        Ok(self.series.entry(id).or_insert(series))
    }
}

/// Extract the integer from a leading `id=<n>` token. Anything after the
/// integer (including a trailing space) is ignored.
fn parse_label_id(label: &str) -> Option<u64> {
    let rest = label.strip_prefix("id=")?;
    let digits: &str = rest
        .split_once(|c: char| !c.is_ascii_digit())
        .map_or(rest, |(head, _)| head);
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::data::LoadOptions;

    use super::*;

    fn store_from(contents: &str, unit_in_data: bool) -> (TabularDataStore, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        let mut store = TabularDataStore::new();
        store
            .load(
                file.path(),
                LoadOptions {
                    unit_in_data,
                    ..LoadOptions::default()
                },
            )
            .unwrap();
        (store, file)
    }

    #[test]
    fn ids_are_strictly_increasing_and_unique() {
        let mut registry = SeriesRegistry::new();
        let a = registry
            .create_from_values(vec![0.0], vec![1.0], "x", "y", "", "")
            .unwrap()
            .id;
        let b = registry
            .create_from_values(vec![0.0], vec![1.0], "x", "y", "", "")
            .unwrap()
            .id;
        // Same inputs, no deduplication.
        assert!(b > a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn mismatched_lengths_rejected_before_storing() {
        let mut registry = SeriesRegistry::new();
        let err = registry
            .create_from_values(vec![0.0, 1.0], vec![1.0], "x", "y", "", "")
            .unwrap_err();
        assert!(matches!(
            err,
            PlotterError::LengthMismatch { x_len: 2, y_len: 1 }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn fields_round_trip_through_labels() {
        let (store, _file) = store_from("t;v\ns;m\n0;1\n1;2\n", true);
        let mut registry = SeriesRegistry::new();
        let created = registry.create_from_fields(&store, "t", "v").unwrap();
        let label = created.label();
        let (id, x, y) = (created.id, created.x.clone(), created.y.clone());

        assert_eq!(label, format!("id={id} [t | v]"));
        let resolved = registry.resolve_label(&label).unwrap();
        assert_eq!(resolved.id, id);
        assert_eq!(resolved.x, x);
        assert_eq!(resolved.y, y);
        assert_eq!(resolved.x_unit, "s");

        // Trailing space tolerated, like the list widgets produce.
        assert!(registry.resolve_label(&format!("{label} ")).is_ok());
    }

    #[test]
    fn unresolvable_labels_are_lookup_errors() {
        let registry = SeriesRegistry::new();
        assert!(registry.resolve_label("id=7 [a | b]").is_err());
        assert!(registry.resolve_label("no id here").is_err());
        assert!(registry.resolve_label("id=abc").is_err());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let (store, _file) = store_from("a\n1\n", false);
        let mut registry = SeriesRegistry::new();
        assert!(matches!(
            registry.create_from_fields(&store, "a", "missing"),
            Err(PlotterError::UnknownField(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn function_series_samples_closed_interval() {
        let mut registry = SeriesRegistry::new();
        let series = registry
            .create_from_function("x*x", 1.0, 4.0, 4, "x", "x*x")
            .unwrap();
        assert_eq!(series.x, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(series.y, vec![1.0, 4.0, 9.0, 16.0]);
        assert!(matches!(series.source, SeriesSource::Function { .. }));
    }

    #[test]
    fn hostile_expression_is_rejected_without_evaluation() {
        let mut registry = SeriesRegistry::new();
        let err = registry
            .create_from_function("import os", 0.0, 1.0, 10, "x", "y")
            .unwrap_err();
        assert!(matches!(err, PlotterError::Expr(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn refresh_resyncs_field_series_only() {
        let (mut store, mut file) = store_from("t;v\n0;1\n1;2\n", false);
        let mut registry = SeriesRegistry::new();
        let field_id = registry.create_from_fields(&store, "t", "v").unwrap().id;
        let value_id = registry
            .create_from_values(vec![9.0], vec![9.0], "a", "b", "", "")
            .unwrap()
            .id;
        let func_id = registry
            .create_from_function("x", 0.0, 1.0, 2, "x", "x")
            .unwrap()
            .id;

        file.as_file_mut().set_len(0).unwrap();
        use std::io::Seek;
        file.as_file_mut().rewind().unwrap();
        file.write_all(b"t;v\n0;10\n1;20\n2;30\n").unwrap();
        file.flush().unwrap();

        store.refresh().unwrap();
        registry.refresh(&store);

        assert_eq!(registry.get(field_id).unwrap().y, vec![10.0, 20.0, 30.0]);
        assert_eq!(registry.get(value_id).unwrap().x, vec![9.0]);
        assert_eq!(registry.get(func_id).unwrap().x, vec![0.0, 1.0]);
    }

    #[test]
    fn refresh_skips_series_whose_fields_vanished() {
        let (mut store, mut file) = store_from("t;v\n0;1\n", false);
        let mut registry = SeriesRegistry::new();
        let id = registry.create_from_fields(&store, "t", "v").unwrap().id;

        file.as_file_mut().set_len(0).unwrap();
        use std::io::Seek;
        file.as_file_mut().rewind().unwrap();
        file.write_all(b"time;v\n5;6\n").unwrap();
        file.flush().unwrap();

        store.refresh().unwrap();
        registry.refresh(&store);

        // x field was renamed, so the series keeps its old vectors.
        assert_eq!(registry.get(id).unwrap().x, vec![0.0]);
    }
}
