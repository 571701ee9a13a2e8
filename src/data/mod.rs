/// Data layer: the table type, loading, and the pure transform stages.
///
/// Architecture:
/// ```text
///  .csv / .json bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse text → Table (all cells text)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  value predicates + column projection
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   sort   │  stable lexical multi-column ordering
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  group   │  contiguous runs → Partitions
///   └──────────┘
/// ```

pub mod filter;
pub mod group;
pub mod loader;
pub mod model;
pub mod sort;
