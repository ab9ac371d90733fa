/// Data layer: core types, loading, and distribution statistics.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → TabularDataset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ TabularDataset │  column names, rows of CellValue
///   └────────────────┘
///        │  numeric_column(name)
///        ▼
///   ┌──────────┐
///   │  stats    │  histogram bins + density curve
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod stats;
