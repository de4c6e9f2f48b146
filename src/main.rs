use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use visitbeam::config::{ModeName, PipelineConfig};
use visitbeam::io::artifacts::write_all;
use visitbeam::logging::{LogFormat, init_logging};
use visitbeam::mappings::MappingTables;
use visitbeam::pipeline::{PipelineOptions, run_file};

/// Input used when neither the config file nor `--input` names one.
const DEFAULT_INPUT: &str = "data.csv";

#[derive(Parser)]
#[command(name = "visitbeam")]
#[command(about = "Clean, enrich and summarise a customer visit/payment export")]
#[command(version)]
struct Cli {
    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input CSV (optionally .gz or .zst)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory receiving the artifacts
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Drop records breaching any outlier threshold
    #[arg(long)]
    remove_outliers: bool,

    /// Run per-record stages on a thread pool
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel
    #[arg(long)]
    threads: Option<usize>,

    /// JSON file overriding or extending the built-in mapping tables
    #[arg(long)]
    mappings: Option<PathBuf>,

    /// Skip the CSV export
    #[arg(long)]
    no_csv: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    fn apply(&self, cfg: &mut PipelineConfig) {
        if let Some(input) = &self.input {
            cfg.input.path = Some(input.clone());
        }
        if let Some(dir) = &self.output_dir {
            cfg.output.directory.clone_from(dir);
        }
        if self.remove_outliers {
            cfg.outliers.remove = true;
        }
        if self.parallel {
            cfg.execution.mode = ModeName::Parallel;
        }
        if self.threads.is_some() {
            cfg.execution.threads = self.threads;
        }
        if let Some(path) = &self.mappings {
            cfg.mappings.path = Some(path.clone());
        }
        if self.no_csv {
            cfg.output.write_csv = false;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    let mut cfg = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    cli.apply(&mut cfg);

    let tables = match &cfg.mappings.path {
        Some(path) => MappingTables::load(path)?,
        None => MappingTables::default(),
    };
    let input = cfg.input.path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
    let opts = PipelineOptions::from(&cfg);

    let out = run_file(&input, cfg.input.has_headers, &tables, &opts)
        .with_context(|| format!("pipeline failed for {}", input.display()))?;
    let written = write_all(&out, &cfg.output, &input)?;

    out.metrics.log_summary();
    info!(
        records = out.records.len(),
        files = written.files.len(),
        dir = %cfg.output.directory.display(),
        "all done"
    );
    Ok(())
}
