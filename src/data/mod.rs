/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, coerce numbers → QuakeDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ QuakeDataset  │  Arc<[QuakeEvent]>, year span, magnitude extent
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year + range predicates → filtered indices
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
