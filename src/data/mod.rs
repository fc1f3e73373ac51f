/// Data layer: core types, loading, and the user's selection.
///
/// Architecture:
/// ```text
///  dropped .csv / .tsv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  media type check, parse → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  ordered columns, typed rows, source bytes
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ selection  │  target column + algorithm, validated against the schema
///   └───────────┘
/// ```

pub mod loader;
pub mod model;
pub mod selection;
