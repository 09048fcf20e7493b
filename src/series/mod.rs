/// Series layer: identified plot series and the registry that mints them.
///
/// A [`Series`](model::Series) is an immutable pair of equal-length numeric
/// vectors plus axis/unit metadata. The [`SeriesRegistry`] assigns each one
/// a monotonically increasing [`SeriesId`](model::SeriesId), keeps the
/// typed binding back to its originating fields, and can resolve a series
/// from the `id=<n> [...]` display label used by list widgets.
pub mod model;
pub mod registry;

pub use model::{Series, SeriesId, SeriesSource};
pub use registry::SeriesRegistry;
