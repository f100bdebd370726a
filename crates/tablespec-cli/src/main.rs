mod config;
mod logging;
mod output;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{Map, Value};
use tablespec_core::{
    DataFrameProfile, Error as CoreError, UMF_FILE_SUFFIX, Umf, apply_default_specifications,
    enrich_umf_with_profiling, fix_duplicate_column_names, load_umf_from_yaml, save_umf_to_yaml,
    validate_umf_directory, validate_umf_file,
};
use tablespec_gx::{
    GxError, Strictness, build_expectation_suite, extract_column_constraints,
    generate_sample_with, load_expectations_for_table, merge_baseline_expectations,
    read_suite_file, sample_value_for_column, save_expectation_suite, save_suite_document,
    validate_suite_format,
};
use tablespec_schema::{
    SchemaError, generate_pyspark_schema, generate_sql_ddl, render_json_schema,
};
use thiserror::Error;

use config::{Settings, load_settings};
use logging::{LogFormat, init_logging};

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("expectation error: {0}")]
    Gx(#[from] GxError),
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid output path: {0}")]
    InvalidOutput(String),
    #[error("{0} UMF document(s) failed validation")]
    ValidationFailed(usize),
    #[error("upstream suite has {0} format error(s)")]
    InvalidSuite(usize),
    #[error("no expectation suite found for table {0}")]
    SuiteNotFound(String),
}

#[derive(Parser, Debug)]
#[command(name = "tablespec", version, about = "UMF table specification toolkit")]
struct Cli {
    /// Path to tablespec.toml (defaults to ./tablespec.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    /// Filter directive used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// Append log events to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a UMF file, or every UMF file in a directory.
    Validate(ValidateArgs),
    /// Generate the baseline expectation suite for a UMF table.
    Baseline(BaselineArgs),
    /// Render a schema artifact from a UMF table.
    Emit(EmitArgs),
    /// Print the column constraints recorded in a table's suite.
    Constraints(ConstraintsArgs),
    /// Synthesize sample values from a pattern or a table's suite.
    Sample(SampleArgs),
    /// Fold profiler statistics into a UMF document.
    Profile(ProfileArgs),
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// UMF file or directory of `*.umf.yaml` files.
    path: PathBuf,
}

#[derive(Args, Debug)]
struct BaselineArgs {
    umf: PathBuf,
    /// Overrides the configured strictness.
    #[arg(long)]
    strictness: Option<Strictness>,
    /// Overrides the configured suite directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Print the suite as YAML instead of saving it.
    #[arg(long, default_value_t = false)]
    stdout: bool,
    /// Upstream suite (YAML or JSON) to merge the baseline into.
    #[arg(long, value_name = "SUITE")]
    merge: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmitTarget {
    Ddl,
    Pyspark,
    JsonSchema,
}

#[derive(Args, Debug)]
struct EmitArgs {
    #[arg(value_enum)]
    target: EmitTarget,
    umf: PathBuf,
    /// Write to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Fill missing VARCHAR length and DECIMAL precision/scale from config.
    #[arg(long, default_value_t = false)]
    apply_defaults: bool,
}

#[derive(Args, Debug)]
struct ConstraintsArgs {
    table: String,
    #[arg(long)]
    suite_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Table whose suite drives the samples.
    #[arg(required_unless_present = "pattern")]
    table: Option<String>,
    /// Sample directly from a regex instead of a suite.
    #[arg(long, conflicts_with = "table")]
    pattern: Option<String>,
    /// Restrict to these columns (repeatable); defaults to every constrained column.
    #[arg(long = "column", value_name = "COLUMN")]
    columns: Vec<String>,
    #[arg(long, default_value_t = 1)]
    count: usize,
    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    suite_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ProfileArgs {
    umf: PathBuf,
    /// DataFrame profile as JSON.
    profile: PathBuf,
    #[arg(long)]
    sample_size: Option<u64>,
    /// Write the enriched UMF here instead of updating it in place.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format, &cli.log_level, cli.log_file.as_deref())?;
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Baseline(args) => run_baseline(args, &settings),
        Command::Emit(args) => run_emit(args, &settings),
        Command::Constraints(args) => run_constraints(args, &settings),
        Command::Sample(args) => run_sample(args, &settings),
        Command::Profile(args) => run_profile(args),
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    if args.path.is_dir() {
        let results = validate_umf_directory(&args.path, UMF_FILE_SUFFIX)?;
        for (path, valid) in &results {
            println!("{} {}", if *valid { "PASS" } else { "FAIL" }, path.display());
        }
        let failed = results.values().filter(|valid| !**valid).count();
        if failed > 0 {
            return Err(CliError::ValidationFailed(failed));
        }
        println!("{} UMF document(s) valid", results.len());
        return Ok(());
    }

    let report = validate_umf_file(&args.path)?;
    for warning in &report.warnings {
        println!("warning: {} at {}", warning.message, warning.path);
        if let Some(hint) = &warning.hint {
            println!("  hint: {hint}");
        }
    }
    for message in report.error_messages() {
        println!("error: {message}");
    }
    if !report.is_ok() {
        return Err(CliError::ValidationFailed(1));
    }
    println!("{} is valid", args.path.display());
    Ok(())
}

fn run_baseline(args: BaselineArgs, settings: &Settings) -> Result<(), CliError> {
    let umf = load_umf_from_yaml(&args.umf)?;
    let strictness = args.strictness.unwrap_or(settings.strictness);
    let source = args.umf.display().to_string();
    let suite = build_expectation_suite(&umf, &source, strictness);
    tracing::info!(
        event = "baseline_built",
        table = %umf.table_name,
        strictness = %strictness,
        expectations = suite.expectations.len()
    );

    let dir = args.out_dir.as_deref().unwrap_or(&settings.suite_dir);
    let Some(upstream_path) = args.merge.as_deref() else {
        if args.stdout {
            return output::emit_text(&suite.to_yaml()?, None);
        }
        let path = save_expectation_suite(&suite, &umf.table_name, dir)?;
        println!("{}", path.display());
        return Ok(());
    };

    let upstream = read_suite_file(upstream_path)?;
    let merged = merge_baseline_expectations(upstream, &suite.expectations)?;
    let report = validate_suite_format(&merged);
    if !report.is_ok() {
        for message in report.error_messages() {
            println!("error: {message}");
        }
        tracing::error!(
            event = "suite_format_invalid",
            path = %upstream_path.display(),
            errors = report.errors.len()
        );
        return Err(CliError::InvalidSuite(report.errors.len()));
    }

    if args.stdout {
        return output::emit_text(&serde_yaml::to_string(&merged)?, None);
    }
    let path = save_suite_document(&merged, &umf.table_name, dir)?;
    println!("{}", path.display());
    Ok(())
}

fn run_emit(args: EmitArgs, settings: &Settings) -> Result<(), CliError> {
    let mut umf = load_umf_from_yaml(&args.umf)?;
    if args.apply_defaults {
        apply_default_specifications(&mut umf, &settings.defaults);
    }

    let rendered = match args.target {
        EmitTarget::Ddl => generate_sql_ddl(&umf)?,
        EmitTarget::Pyspark => generate_pyspark_schema(&umf)?,
        EmitTarget::JsonSchema => render_json_schema(&umf)?,
    };
    tracing::info!(event = "schema_emitted", table = %umf.table_name, format = ?args.target);
    output::emit_text(&rendered, args.out.as_deref())
}

fn run_constraints(args: ConstraintsArgs, settings: &Settings) -> Result<(), CliError> {
    let dir = args.suite_dir.as_deref().unwrap_or(&settings.suite_dir);
    let suite = load_suite(&args.table, dir)?;
    let constraints = extract_column_constraints(Some(&suite));
    output::emit_text(&serde_json::to_string_pretty(&constraints)?, None)
}

fn run_sample(args: SampleArgs, settings: &Settings) -> Result<(), CliError> {
    let seed = args.seed.or(settings.seed).unwrap_or_else(rand::random);
    tracing::info!(event = "sampling_started", seed, count = args.count);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    if let Some(pattern) = args.pattern.as_deref() {
        let samples: Vec<String> = (0..args.count)
            .map(|_| generate_sample_with(pattern, &mut rng))
            .collect();
        return output::emit_text(&samples.join("\n"), None);
    }

    let Some(table) = args.table.as_deref() else {
        return Err(CliError::InvalidConfig(
            "either a table or --pattern is required".to_string(),
        ));
    };
    let dir = args.suite_dir.as_deref().unwrap_or(&settings.suite_dir);
    let suite = load_suite(table, dir)?;
    let columns = if args.columns.is_empty() {
        extract_column_constraints(Some(&suite)).into_keys().collect()
    } else {
        args.columns
    };

    let mut rows = Vec::with_capacity(args.count);
    for _ in 0..args.count {
        let mut row = Map::new();
        for column in &columns {
            let value = sample_value_for_column(Some(&suite), column, &mut rng)
                .map_or(Value::Null, Value::String);
            row.insert(column.clone(), value);
        }
        rows.push(serde_json::to_string(&Value::Object(row))?);
    }
    output::emit_text(&rows.join("\n"), None)
}

fn run_profile(args: ProfileArgs) -> Result<(), CliError> {
    let mut umf: Umf = load_umf_from_yaml(&args.umf)?;
    let content = std::fs::read_to_string(&args.profile)?;
    let profile: DataFrameProfile = serde_json::from_str(&content)?;

    fix_duplicate_column_names(&mut umf);
    enrich_umf_with_profiling(&mut umf, &profile, args.sample_size);

    let target = args.out.as_deref().unwrap_or(&args.umf);
    save_umf_to_yaml(&umf, target)?;
    tracing::info!(
        event = "umf_profiled",
        table = %umf.table_name,
        rows = profile.num_records,
        path = %target.display()
    );
    println!("{}", target.display());
    Ok(())
}

fn load_suite(table: &str, dir: &Path) -> Result<Value, CliError> {
    load_expectations_for_table(table, dir).ok_or_else(|| CliError::SuiteNotFound(table.to_string()))
}
