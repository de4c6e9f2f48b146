//! # Visitbeam
//!
//! A **batch pipeline** for customer visit/payment exports. One tabular input
//! file goes in; canonicalized, enriched records and grouped statistics come
//! out, ready for a document store or a reporting layer.
//!
//! ## Stages
//!
//! Every stage is a pure function over its input collection and returns a new
//! one; nothing is mutated after the stage that owns it.
//!
//! 1. [`normalize`] - map raw locale codes to canonical labels using
//!    [`MappingTables`]
//! 2. [`derive`] - compute payment per visit, grade, activity, churn and visit
//!    category
//! 3. [`validation`] - advisory data-quality report
//! 4. [`outliers`] - threshold breach counts, optional removal
//! 5. [`aggregate`] - overall, region, age-group and grade summaries
//! 6. [`insights`] - retention funnel, region × age heat-map, visit and
//!    activity distributions
//!
//! The [`pipeline`] module composes them; [`io::artifacts`] writes the results.
//!
//! ## Quick Start
//!
//! ```
//! use visitbeam::testing::sample_raw_records;
//! use visitbeam::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let tables = MappingTables::default();
//! let out = run(sample_raw_records(), &tables, &PipelineOptions::default())?;
//!
//! assert_eq!(out.statistics.overall.total_customers, 6);
//! assert_eq!(out.records[0].customer_grade, CustomerGrade::Vip);
//! # Ok(())
//! # }
//! ```
//!
//! ## Execution modes
//!
//! Per-record stages and aggregations run through a [`Runner`]. In
//! [`ExecMode::Parallel`] the work is spread over Rayon; results, including
//! record order and group order, are identical to [`ExecMode::Sequential`].
//!
//! ## Errors
//!
//! Only loading can fail a run. Unmapped codes, missing values, duplicates,
//! negative values and outliers are collected into reports on
//! [`PipelineOutput`] and never abort processing.

pub mod aggregate;
pub mod combiners;
pub mod config;
pub mod derive;
pub mod insights;
pub mod io;
pub mod logging;
pub mod mappings;
pub mod metrics;
pub mod normalize;
pub mod outliers;
pub mod pipeline;
pub mod record;
pub mod runner;
pub mod testing;
pub mod utils;
pub mod validation;

pub use aggregate::{StatisticsBundle, aggregate};
pub use combiners::{CombineFn, Count, GroupBy, Mean, Median, Rate, Sum};
pub use config::PipelineConfig;
pub use derive::derive;
pub use insights::Insights;
pub use mappings::MappingTables;
pub use metrics::MetricsCollector;
pub use normalize::{NormalizeReport, normalize};
pub use outliers::{OutlierReport, OutlierThresholds, analyze};
pub use pipeline::{PipelineOptions, PipelineOutput, run, run_file};
pub use record::{CanonicalRecord, CustomerGrade, EnrichedRecord, RawRecord, VisitCategory};
pub use runner::{ExecMode, Runner};
pub use validation::{ValidationIssue, ValidationReport, validate};
