use std::fmt;

// ---------------------------------------------------------------------------
// SeriesId – opaque, monotonically minted identifier
// ---------------------------------------------------------------------------

/// Opaque series identifier. Minted by the registry starting at 0,
/// incremented per creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesId(pub(crate) u64);

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SeriesSource – where the vectors came from
// ---------------------------------------------------------------------------

/// Typed binding between a series and its origin. Only `Fields` series are
/// resynced when the underlying table is reloaded; the other variants are
/// explicitly detached.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesSource {
    /// Derived from two named columns of the data store.
    Fields { x_field: String, y_field: String },
    /// Caller-supplied vectors with no field binding.
    Values,
    /// Sampled from a math expression in `x`.
    Function { expression: String },
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// An identified pair of equal-length numeric vectors with axis/unit
/// metadata. Immutable after creation, except that the registry replaces
/// the vectors of `Fields`-sourced series on refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: SeriesId,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub x_label: String,
    pub y_label: String,
    pub x_unit: String,
    pub y_unit: String,
    pub source: SeriesSource,
}

impl Series {
    /// Display label for list widgets: `id=<n> [<x_label> | <y_label>]`.
    ///
    /// Pure rendering; the inverse lives in
    /// [`SeriesRegistry::resolve_label`](super::SeriesRegistry::resolve_label).
    pub fn label(&self) -> String {
        format!("id={} [{} | {}]", self.id, self.x_label, self.y_label)
    }

    /// Axis caption `<label> [<unit>]`, or just the label without a unit.
    pub fn x_caption(&self) -> String {
        caption(&self.x_label, &self.x_unit)
    }

    pub fn y_caption(&self) -> String {
        caption(&self.y_label, &self.y_unit)
    }
}

fn caption(label: &str, unit: &str) -> String {
    if unit.is_empty() {
        label.to_string()
    } else {
        format!("{label} [{unit}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Series {
        Series {
            id: SeriesId(3),
            x: vec![0.0, 1.0],
            y: vec![2.0, 4.0],
            x_label: "time".into(),
            y_label: "speed".into(),
            x_unit: "s".into(),
            y_unit: "m/s".into(),
            source: SeriesSource::Values,
        }
    }

    #[test]
    fn label_format() {
        assert_eq!(series().label(), "id=3 [time | speed]");
    }

    #[test]
    fn captions_include_units_when_present() {
        let s = series();
        assert_eq!(s.x_caption(), "time [s]");
        let mut no_unit = s.clone();
        no_unit.y_unit.clear();
        assert_eq!(no_unit.y_caption(), "speed");
    }
}
