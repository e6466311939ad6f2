/// Data layer: table store, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (types inferred per column)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  table    │ ───▶ │ catalog   │  distinct values / ranges for widgets
///   └──────────┘      └──────────┘
///        │
///        ├──────────────────┬─────────────────┐
///        ▼                  ▼                 ▼
///   ┌──────────┐      ┌──────────┐      ┌───────────┐
///   │  filter   │      │  recipe   │      │ histogram  │
///   └──────────┘      └──────────┘      └───────────┘
///        │             group/aggregate/     per-column
///        ▼             sort/limit/dedupe    distribution
///   ┌──────────┐
///   │  export   │  filtered view → CSV
///   └──────────┘
/// ```
pub mod catalog;
pub mod columns;
pub mod error;
pub mod export;
pub mod filter;
pub mod histogram;
pub mod loader;
pub mod model;
pub mod recipe;
pub mod table;
