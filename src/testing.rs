//! Helpers for testing code built on this crate.
//!
//! - [`RawRecordBuilder`] builds input rows fluently
//! - [`sample_raw_records`] and [`sample_csv`] provide a small dataset whose
//!   every statistic is known (see [`fixtures`])
//! - [`assert_groups_partition`] and [`assert_derivation_invariants`] check
//!   the properties every run must satisfy
//!
//! ```
//! use visitbeam::mappings::MappingTables;
//! use visitbeam::pipeline::{PipelineOptions, run};
//! use visitbeam::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let out = run(sample_raw_records(), &MappingTables::default(), &PipelineOptions::default())?;
//! assert_groups_partition(&out.statistics);
//! assert_derivation_invariants(&out.records);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
