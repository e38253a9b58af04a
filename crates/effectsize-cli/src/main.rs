mod registry;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use effectsize_core::{DataTable, Error as CoreError, read_csv};
use effectsize_stats::{
    ReportEngine, ReportOptions, StatsError, correlations, effect_sizes_for_groups, eta_squared,
    partial_eta_squared, render_cohens_d, render_correlations, render_eta_squared,
    render_partial_eta, resolve_metrics, write_json, write_rows_csv,
};
use registry::{RunContext, RunPaths, init_run_logging, start_run};
use serde::Serialize;
use settings::{OutputFormat, Settings, SettingsOverrides, load_settings};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("settings error: {0}")]
    Settings(#[from] settings::SettingsError),
    #[error("table error: {0}")]
    Table(#[from] CoreError),
    #[error("statistics error: {0}")]
    Stats(#[from] StatsError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "effectsize", version, about = "Effect-size reports for grouped tabular data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cohen's d between every pair of groups.
    CohensD(GroupedArgs),
    /// Pearson correlation between every pair of metrics.
    Correlations(MetricArgs),
    /// Partial eta-squared for every metric and factor.
    PartialEta(FactorArgs),
    /// One-way ANOVA with eta-squared for every metric.
    EtaSquared(GroupedArgs),
    /// Run every family and write a combined report.
    Report(ReportArgs),
}

/// Which computation a run performs, once its flags are folded into settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    CohensD,
    Correlations,
    PartialEta,
    EtaSquared,
    Report,
}

impl CommandKind {
    fn name(self) -> &'static str {
        match self {
            CommandKind::CohensD => "cohens-d",
            CommandKind::Correlations => "correlations",
            CommandKind::PartialEta => "partial-eta",
            CommandKind::EtaSquared => "eta-squared",
            CommandKind::Report => "report",
        }
    }
}

impl Command {
    fn kind(&self) -> CommandKind {
        match self {
            Command::CohensD(_) => CommandKind::CohensD,
            Command::Correlations(_) => CommandKind::Correlations,
            Command::PartialEta(_) => CommandKind::PartialEta,
            Command::EtaSquared(_) => CommandKind::EtaSquared,
            Command::Report(_) => CommandKind::Report,
        }
    }
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Input CSV file with a header row.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Settings file (defaults to ./effectsize.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory for runs.
    #[arg(long)]
    run_dir: Option<PathBuf>,
    /// Output format for result tables.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// Metric column(s); defaults to every numeric column.
    #[arg(long = "metric", value_name = "COLUMN")]
    metrics: Vec<String>,
}

#[derive(Args, Debug)]
struct MetricArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct GroupedArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Grouping column.
    #[arg(long = "group", value_name = "COLUMN")]
    group_column: Option<String>,
}

#[derive(Args, Debug)]
struct FactorArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Factor column(s); defaults to the grouping column from settings.
    #[arg(long = "factor", value_name = "COLUMN")]
    factors: Vec<String>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Grouping column.
    #[arg(long = "group", value_name = "COLUMN")]
    group_column: Option<String>,
    /// Factor column(s) for partial eta-squared.
    #[arg(long = "factor", value_name = "COLUMN")]
    factors: Vec<String>,
    /// Rows shown per table in report.md.
    #[arg(long)]
    max_rows: Option<usize>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let kind = cli.command.kind();

    let (common, overrides) = match cli.command {
        Command::CohensD(args) | Command::EtaSquared(args) => {
            let overrides = SettingsOverrides {
                group_column: args.group_column,
                ..SettingsOverrides::default()
            };
            (args.common, overrides)
        }
        Command::Correlations(args) => (args.common, SettingsOverrides::default()),
        Command::PartialEta(args) => {
            let overrides = SettingsOverrides {
                factors: args.factors,
                ..SettingsOverrides::default()
            };
            (args.common, overrides)
        }
        Command::Report(args) => {
            let overrides = SettingsOverrides {
                group_column: args.group_column,
                factors: args.factors,
                max_rows: args.max_rows,
                ..SettingsOverrides::default()
            };
            (args.common, overrides)
        }
    };

    let mut settings = load_settings(common.config.as_deref())?;
    settings.apply(SettingsOverrides {
        input: common.input,
        metrics: common.metrics,
        format: common.format,
        run_dir: common.run_dir,
        ..overrides
    });

    run_command(kind, settings)
}

fn run_command(kind: CommandKind, settings: Settings) -> Result<(), CliError> {
    let input = settings.input.clone().ok_or_else(|| {
        CliError::InvalidConfig(
            "input csv is required (--input or `input` in effectsize.toml)".to_string(),
        )
    })?;

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        command: kind.name().to_string(),
        settings: settings.clone(),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    let _run_span = tracing::info_span!("run", run_id = %run_id, command = kind.name()).entered();
    tracing::info!(event = "run_started");
    let timer = Instant::now();

    let table = read_csv(&input)?;
    tracing::info!(
        event = "table_loaded",
        path = %input.display(),
        rows = table.row_count(),
        columns = table.column_count()
    );

    let outputs = match kind {
        CommandKind::CohensD => run_cohens_d(&table, &settings, &run_paths)?,
        CommandKind::Correlations => run_correlations(&table, &settings, &run_paths)?,
        CommandKind::PartialEta => run_partial_eta(&table, &settings, &run_paths)?,
        CommandKind::EtaSquared => run_eta_squared(&table, &settings, &run_paths)?,
        CommandKind::Report => run_report(&table, &settings, &run_paths, &input)?,
    };

    for path in &outputs {
        tracing::info!(event = "artifact_written", path = %path.display());
        println!("{}", path.display());
    }

    let duration_ms = timer.elapsed().as_millis() as u64;
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);

    Ok(())
}

fn run_cohens_d(
    table: &DataTable,
    settings: &Settings,
    paths: &RunPaths,
) -> Result<Vec<PathBuf>, CliError> {
    let group = require_group(settings)?;
    let metrics = resolve_metrics(table, &settings.metrics, group, &settings.factors);
    let rows = effect_sizes_for_groups(table, group, &as_refs(&metrics))?;
    let path = write_rows(paths, "cohens_d", &rows, settings, render_cohens_d)?;
    Ok(vec![path])
}

fn run_correlations(
    table: &DataTable,
    settings: &Settings,
    paths: &RunPaths,
) -> Result<Vec<PathBuf>, CliError> {
    let group = settings.group_column.as_deref().unwrap_or_default();
    let metrics = resolve_metrics(table, &settings.metrics, group, &settings.factors);
    let rows = correlations(table, &as_refs(&metrics))?;
    let path = write_rows(paths, "correlations", &rows, settings, render_correlations)?;
    Ok(vec![path])
}

fn run_partial_eta(
    table: &DataTable,
    settings: &Settings,
    paths: &RunPaths,
) -> Result<Vec<PathBuf>, CliError> {
    let factors = if settings.factors.is_empty() {
        vec![require_group(settings)?.to_string()]
    } else {
        settings.factors.clone()
    };
    let group = settings.group_column.as_deref().unwrap_or_default();
    let metrics = resolve_metrics(table, &settings.metrics, group, &factors);
    let rows = partial_eta_squared(table, &as_refs(&metrics), &as_refs(&factors))?;
    let path = write_rows(paths, "partial_eta_squared", &rows, settings, render_partial_eta)?;
    Ok(vec![path])
}

fn run_eta_squared(
    table: &DataTable,
    settings: &Settings,
    paths: &RunPaths,
) -> Result<Vec<PathBuf>, CliError> {
    let group = require_group(settings)?;
    let metrics = resolve_metrics(table, &settings.metrics, group, &settings.factors);
    let rows = eta_squared(table, &as_refs(&metrics), group)?;
    let path = write_rows(paths, "eta_squared", &rows, settings, render_eta_squared)?;
    Ok(vec![path])
}

fn run_report(
    table: &DataTable,
    settings: &Settings,
    paths: &RunPaths,
    input: &std::path::Path,
) -> Result<Vec<PathBuf>, CliError> {
    let group = require_group(settings)?;
    let options = ReportOptions {
        group_column: group.to_string(),
        metrics: settings.metrics.clone(),
        factors: settings.factors.clone(),
        max_rows: settings.max_rows,
        source: Some(input.display().to_string()),
    };
    let engine = ReportEngine::new(options);
    let report = engine.run(table)?;
    let artifacts = engine.write_artifacts(&report, &paths.root)?;
    Ok(vec![
        artifacts.cohens_d_csv,
        artifacts.correlations_csv,
        artifacts.partial_eta_csv,
        artifacts.eta_squared_csv,
        artifacts.report_json,
        artifacts.report_md,
    ])
}

fn write_rows<T: Serialize>(
    paths: &RunPaths,
    name: &str,
    rows: &[T],
    settings: &Settings,
    render: fn(&[T], usize) -> String,
) -> Result<PathBuf, CliError> {
    let path = paths.artifact(name, settings.format.extension());
    match settings.format {
        OutputFormat::Csv => {
            write_rows_csv(&path, rows)?;
        }
        OutputFormat::Json => write_json(&path, &rows)?,
        OutputFormat::Markdown => std::fs::write(&path, render(rows, settings.max_rows))?,
    }
    Ok(path)
}

fn require_group(settings: &Settings) -> Result<&str, CliError> {
    settings.group_column.as_deref().ok_or_else(|| {
        CliError::InvalidConfig(
            "grouping column is required (--group or `group_column` in effectsize.toml)"
                .to_string(),
        )
    })
}

fn as_refs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(args: &[&str]) -> CommandKind {
        Cli::try_parse_from(args).expect("parse args").command.kind()
    }

    #[test]
    fn every_subcommand_maps_to_its_own_kind() {
        let cases = [
            (&["effectsize", "cohens-d", "--group", "arm"][..], CommandKind::CohensD),
            (&["effectsize", "correlations"][..], CommandKind::Correlations),
            (&["effectsize", "partial-eta", "--factor", "site"][..], CommandKind::PartialEta),
            (&["effectsize", "eta-squared", "--group", "arm"][..], CommandKind::EtaSquared),
            (&["effectsize", "report", "--max-rows", "5"][..], CommandKind::Report),
        ];
        for (args, expected) in cases {
            let kind = kind_of(args);
            assert_eq!(kind, expected);
            assert_eq!(kind.name(), args[1]);
        }
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["effectsize", "anova"]).is_err());
    }

    #[test]
    fn repeated_metric_flags_accumulate() {
        let cli = Cli::try_parse_from([
            "effectsize",
            "correlations",
            "--metric",
            "a",
            "--metric",
            "b c",
            "--format",
            "markdown",
        ])
        .expect("parse args");
        let Command::Correlations(args) = cli.command else {
            panic!("expected correlations");
        };
        assert_eq!(args.common.metrics, vec!["a", "b c"]);
        assert_eq!(args.common.format, Some(OutputFormat::Markdown));
    }
}
