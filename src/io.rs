//! File input and output: CSV loading and export, JSON artifacts, the text
//! report, and transparent decompression.

pub mod artifacts;
pub mod compression;
pub mod csv;
pub mod json;
pub mod report;
