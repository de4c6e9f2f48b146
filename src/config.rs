//! Run configuration.
//!
//! Every field has a default, so an empty (or absent) TOML file is a valid
//! configuration. Command-line flags are layered on top by the binary.
//!
//! ```toml
//! [input]
//! path = "data/customers.csv"
//!
//! [output]
//! directory = "cleaned_data"
//! write_csv = true
//!
//! [outliers]
//! remove = false
//! max_payment = 500000
//!
//! [execution]
//! mode = "parallel"
//! threads = 4
//! ```

use crate::outliers::OutlierThresholds;
use crate::runner::ExecMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub outliers: OutlierConfig,
    pub execution: ExecutionConfig,
    pub mappings: MappingsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: Option<PathBuf>,
    pub has_headers: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            has_headers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub write_csv: bool,
    /// Prefix the CSV export with a UTF-8 BOM so spreadsheet tools pick the right encoding.
    pub csv_bom: bool,
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("cleaned_data"),
            write_csv: true,
            csv_bom: true,
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub remove: bool,
    #[serde(flatten)]
    pub thresholds: OutlierThresholds,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeName {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub mode: ModeName,
    /// Worker count for parallel mode; the global Rayon pool when unset.
    pub threads: Option<usize>,
}

impl ExecutionConfig {
    #[must_use]
    pub const fn exec_mode(&self) -> ExecMode {
        match self.mode {
            ModeName::Sequential => ExecMode::Sequential,
            ModeName::Parallel => ExecMode::Parallel {
                threads: self.threads,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingsConfig {
    /// JSON file whose entries override or extend the built-in tables.
    pub path: Option<PathBuf>,
}

impl PipelineConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse pipeline config")
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("open {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("load config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_all_defaults() -> Result<()> {
        let cfg = PipelineConfig::from_toml_str("")?;
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.output.directory, PathBuf::from("cleaned_data"));
        assert_eq!(cfg.outliers.thresholds.max_visit_days, 25);
        assert_eq!(cfg.execution.exec_mode(), ExecMode::Sequential);
        Ok(())
    }

    #[test]
    fn thresholds_sit_in_the_outliers_table() -> Result<()> {
        let cfg = PipelineConfig::from_toml_str(
            "[outliers]\nremove = true\nmax_payment = 1000\n[execution]\nmode = \"parallel\"\nthreads = 2\n",
        )?;
        assert!(cfg.outliers.remove);
        assert_eq!(cfg.outliers.thresholds.max_payment, 1000);
        assert_eq!(cfg.outliers.thresholds.max_duration_min, 10_000);
        assert_eq!(cfg.execution.exec_mode(), ExecMode::Parallel { threads: Some(2) });
        Ok(())
    }
}
