//! ime-datagen: build-time generator for input-method data files
//!
//! ```text
//! ime-datagen existence --input words.txt --output existence.data --error-rate 0.001
//! ime-datagen segmenter --rules rules.json \
//!     --output-size-info size_info.data --output-ltable ltable.data \
//!     --output-rtable rtable.data --output-bitarray bitarray.data
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ime_datagen::service::{SegmenterBitarrayGenerator, SegmenterOutputPaths};
use ime_datagen::{BoundaryRules, EmitFormat, ExistenceConfigBuilder, ExistenceDataGenerator};

/// Generate existence filters and segmenter bitarrays
#[derive(Parser, Debug)]
#[command(name = "ime-datagen")]
#[command(about = "Build-time generator for input-method data files")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an existence filter from a list of entries (one per line)
    Existence(ExistenceArgs),
    /// Build the segmenter size info, compaction tables and bitarray
    Segmenter(SegmenterArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Raw bytes or an embeddable Rust source fragment
    #[arg(long, value_enum, default_value_t = OutputFormat::Binary)]
    format: OutputFormat,

    /// Module path wrapping source output, e.g. `mozc::rewriter`
    #[arg(long, default_value = "")]
    namespace: String,
}

impl OutputArgs {
    fn emit_format(&self) -> EmitFormat {
        match self.format {
            OutputFormat::Binary => EmitFormat::Binary,
            OutputFormat::Source => EmitFormat::source(self.namespace.clone()),
        }
    }
}

#[derive(Args, Debug)]
struct ExistenceArgs {
    /// Entry list, one UTF-8 entry per line
    #[arg(short, long)]
    input: PathBuf,

    /// Destination file
    #[arg(short, long)]
    output: PathBuf,

    /// Target false positive rate, in (0, 1)
    #[arg(long, default_value_t = 0.01)]
    error_rate: f64,

    #[command(flatten)]
    output_args: OutputArgs,
}

#[derive(Args, Debug)]
struct SegmenterArgs {
    /// JSON boundary rules: {"lsize", "rsize", "default", "exceptions": [[l, r], ...]}
    #[arg(long)]
    rules: PathBuf,

    /// Serialized SegmenterDataSizeInfo
    #[arg(long)]
    output_size_info: PathBuf,

    /// LTable array
    #[arg(long)]
    output_ltable: PathBuf,

    /// RTable array
    #[arg(long)]
    output_rtable: PathBuf,

    /// Segmenter bitarray
    #[arg(long)]
    output_bitarray: PathBuf,

    #[command(flatten)]
    output_args: OutputArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Binary,
    Source,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// One entry per line; `\r` stripped, empty lines skipped
fn parse_entries(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_entries(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read entries from {}", path.display()))?;
    Ok(parse_entries(&text))
}

fn run_existence(args: &ExistenceArgs) -> Result<()> {
    let config = ExistenceConfigBuilder::new()
        .error_rate(args.error_rate)
        .format(args.output_args.emit_format())
        .build()
        .context("Invalid existence filter configuration")?;
    let generator = ExistenceDataGenerator::new(config)?;

    let entries = read_entries(&args.input)?;
    info!(entries = entries.len(), input = %args.input.display(), "Entries loaded");

    generator
        .write_file(&entries, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))
}

fn run_segmenter(args: &SegmenterArgs) -> Result<()> {
    let json = fs::read_to_string(&args.rules)
        .with_context(|| format!("Failed to read rules from {}", args.rules.display()))?;
    let rules = BoundaryRules::from_json(&json)
        .with_context(|| format!("Invalid boundary rules in {}", args.rules.display()))?;

    let generator = SegmenterBitarrayGenerator::new(&args.output_args.emit_format())?;
    let paths = SegmenterOutputPaths {
        size_info: args.output_size_info.clone(),
        ltable: args.output_ltable.clone(),
        rtable: args.output_rtable.clone(),
        bitarray: args.output_bitarray.clone(),
    };

    generator
        .generate_files(rules.lsize, rules.rsize, rules.predicate(), &paths)
        .context("Failed to generate segmenter data")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match &cli.command {
        Command::Existence(args) => run_existence(args),
        Command::Segmenter(args) => run_segmenter(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_entries() {
        let entries = parse_entries("あい\r\n\nうえ\nお\n");
        assert_eq!(entries, vec!["あい", "うえ", "お"]);
        assert!(parse_entries("").is_empty());
    }

    #[test]
    fn test_existence_args() {
        let cli = Cli::try_parse_from([
            "ime-datagen",
            "existence",
            "--input",
            "in.txt",
            "--output",
            "out.h",
            "--format",
            "source",
            "--namespace",
            "mozc::rewriter",
        ])
        .unwrap();
        let Command::Existence(args) = cli.command else {
            panic!("expected existence subcommand");
        };
        assert_eq!(args.error_rate, 0.01);
        assert_eq!(args.output_args.emit_format(), EmitFormat::source("mozc::rewriter"));
    }

    #[test]
    fn test_run_existence_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("words.txt");
        let output = dir.path().join("existence.data");
        fs::write(&input, "a\nb\nc\n").unwrap();

        let args = ExistenceArgs {
            input,
            output: output.clone(),
            error_rate: 0.01,
            output_args: OutputArgs {
                format: OutputFormat::Binary,
                namespace: String::new(),
            },
        };
        run_existence(&args).unwrap();

        let filter = ime_datagen::ExistenceFilter::from_bytes(&fs::read(&output).unwrap()).unwrap();
        assert!(filter.contains(ime_datagen::fingerprint(b"a")));
        assert_eq!(filter.size_bytes(), 4);
    }

    #[test]
    fn test_run_segmenter_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let rules = dir.path().join("rules.json");
        fs::write(&rules, r#"{"lsize":2,"rsize":2,"exceptions":[[0,0]]}"#).unwrap();

        let args = SegmenterArgs {
            rules,
            output_size_info: dir.path().join("size_info.data"),
            output_ltable: dir.path().join("ltable.data"),
            output_rtable: dir.path().join("rtable.data"),
            output_bitarray: dir.path().join("bitarray.data"),
            output_args: OutputArgs {
                format: OutputFormat::Binary,
                namespace: String::new(),
            },
        };
        run_segmenter(&args).unwrap();

        assert_eq!(fs::read(&args.output_bitarray).unwrap(), vec![1]);
        assert_eq!(fs::read(&args.output_size_info).unwrap(), vec![2, 0, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn test_invalid_error_rate_fails() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("existence.data");
        let args = ExistenceArgs {
            input: dir.path().join("missing.txt"),
            output: output.clone(),
            error_rate: 1.5,
            output_args: OutputArgs {
                format: OutputFormat::Binary,
                namespace: String::new(),
            },
        };
        assert!(run_existence(&args).is_err());
        assert!(!output.exists());
    }
}
