use std::path::Path;

use anyhow::{Context, Result};

use crate::data::{LoadOptions, TabularDataStore};
use crate::series::SeriesRegistry;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// One-shot mode: load → mint series → hand a preloaded state to the viewer
// ---------------------------------------------------------------------------

/// Build the viewer state for one-shot mode: load `file`, create one series
/// per y field against `x_field`, and mark them all for display.
///
/// `y_list` is one field name or a comma-separated list, as passed on the
/// command line.
pub fn one_shot_state(
    file: &Path,
    options: LoadOptions,
    x_field: &str,
    y_list: &str,
) -> Result<AppState> {
    let y_fields: Vec<String> = y_list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if y_fields.is_empty() {
        anyhow::bail!("no y field names given");
    }

    let mut store = TabularDataStore::new();
    store
        .load(file, options)
        .with_context(|| format!("loading {}", file.display()))?;

    let mut registry = SeriesRegistry::new();
    let ids = registry
        .create_many_from_fields(&store, x_field, &y_fields)
        .context("creating series")?;

    log::info!(
        "one-shot: {} series from {} against {x_field:?}",
        ids.len(),
        file.display()
    );
    Ok(AppState::preloaded(store, registry, ids, options))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn sample_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"t;u;v\ns;m;m\n0;1;2\n1;3;4\n").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn one_shot_creates_and_selects_series() {
        let file = sample_file();
        let state =
            one_shot_state(file.path(), LoadOptions::default(), "t", "u,v").unwrap();
        assert_eq!(state.registry.len(), 2);
        assert_eq!(state.selected.len(), 2);
        let first = state.registry.iter().next().unwrap();
        assert_eq!(first.x, vec![0.0, 1.0]);
        assert_eq!(first.x_unit, "s");
    }

    #[test]
    fn one_shot_options_carry_into_the_state() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"t,v\n0,1\n1,2\n").unwrap();
        file.flush().unwrap();

        let options = LoadOptions {
            delimiter: b',',
            unit_in_data: false,
            clear_before_load: true,
        };
        let state = one_shot_state(file.path(), options, "t", "v").unwrap();

        // The top-bar toggles must reflect what the command line used, so
        // a later File→Open reuses the same options.
        assert_eq!(state.delimiter, ",");
        assert!(!state.unit_in_data);
        assert_eq!(state.load_options().unwrap(), options);
    }

    #[test]
    fn unknown_y_field_fails() {
        let file = sample_file();
        assert!(one_shot_state(file.path(), LoadOptions::default(), "t", "nope").is_err());
    }

    #[test]
    fn empty_y_list_fails_before_loading() {
        let file = sample_file();
        assert!(one_shot_state(file.path(), LoadOptions::default(), "t", " , ").is_err());
    }

    #[test]
    fn missing_file_fails() {
        assert!(one_shot_state(
            Path::new("/no/such/data.csv"),
            LoadOptions::default(),
            "t",
            "v"
        )
        .is_err());
    }
}
