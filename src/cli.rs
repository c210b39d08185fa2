//! Command line interface.
//!
//! Argument definitions and the handlers behind each subcommand. Flags given on
//! the command line override values read from the configuration file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use crate::checksum::{
    supported_algorithms, ArtifactListener, ChecksumFile, DigesterRegistry, Execution,
    FailurePolicy, FileSet, LogTarget, LoggingArtifactListener, SummaryChecker, SummaryFile,
};
use crate::config::Config;

/// Compute and check file checksums
#[derive(Parser, Debug)]
#[command(name = "checksum")]
#[command(about = "Compute file checksums and write them to hash files or summaries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to checksum.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet_logs")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long = "quiet-logs", global = true)]
    pub quiet_logs: bool,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet_logs {
            "warn"
        } else {
            "info"
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hash a set of files with the configured algorithms and targets
    Files(FilesArgs),

    /// Print every supported digest of a single file
    File(FileArgs),

    /// Check files against a CSV summary file
    Check(CheckArgs),

    /// List supported algorithms
    Algorithms(AlgorithmsArgs),
}

/// Where the files to process come from
#[derive(Args, Debug, Default)]
pub struct InputArgs {
    /// Files to process
    pub paths: Vec<PathBuf>,

    /// Base directory; explicit paths are reported relative to it and patterns resolve under it
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Glob pattern of files to include, relative to the base directory
    #[arg(short, long)]
    pub include: Vec<String>,

    /// Glob pattern of files to exclude, relative to the base directory
    #[arg(short = 'x', long)]
    pub exclude: Vec<String>,
}

impl InputArgs {
    /// Explicit paths, then files matched by patterns, then configured file sets
    fn resolve(&self, config: &Config) -> Result<Vec<ChecksumFile>> {
        let base = self.directory.clone().unwrap_or_default();
        let mut files: Vec<ChecksumFile> = self
            .paths
            .iter()
            .map(|path| ChecksumFile::new(base.clone(), path))
            .collect();

        if !self.include.is_empty() || (self.paths.is_empty() && self.directory.is_some()) {
            let mut file_set = FileSet::new(self.directory.clone().unwrap_or_else(|| PathBuf::from(".")));
            file_set.includes = self.include.clone();
            file_set.excludes = self.exclude.clone();
            files.extend(file_set.resolve()?);
        }

        files.extend(config.resolve_file_sets()?);
        Ok(files)
    }
}

#[derive(Args, Debug)]
pub struct FilesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Comma separated algorithms, e.g. MD5,SHA-256
    #[arg(short, long, value_delimiter = ',')]
    pub algorithms: Vec<String>,

    /// Log failures and carry on instead of stopping at the first one
    #[arg(long)]
    pub continue_on_error: bool,

    /// Do not write one hash file per file and algorithm
    #[arg(long)]
    pub no_individual_files: bool,

    /// Directory receiving the individual hash files
    #[arg(long)]
    pub individual_files_output_directory: Option<PathBuf>,

    /// Append the file name after the digest in individual hash files
    #[arg(long)]
    pub append_filename: bool,

    /// Write a CSV summary file
    #[arg(long)]
    pub csv_summary: bool,

    /// Write an XML summary file
    #[arg(long)]
    pub xml_summary: bool,

    /// Write a shasum compatible summary file
    #[arg(long)]
    pub shasum_summary: bool,

    /// Directory receiving the summary files
    #[arg(short, long)]
    pub output_directory: Option<PathBuf>,

    /// Path stripped from report paths after the base directory
    #[arg(long)]
    pub sub_path: Option<PathBuf>,

    /// Charset of text outputs
    #[arg(long)]
    pub encoding: Option<String>,

    /// Salt appended to file content (CRC32 only)
    #[arg(long)]
    pub salt: Option<String>,

    /// Do not print digests
    #[arg(long)]
    pub quiet: bool,

    /// Print execution statistics as JSON
    #[arg(long)]
    pub json: bool,
}

impl FilesArgs {
    fn apply(&self, config: &mut Config) {
        if !self.algorithms.is_empty() {
            config.algorithms = self.algorithms.clone();
        }
        if self.continue_on_error {
            config.fail_on_error = false;
        }
        if self.no_individual_files {
            config.individual_files = false;
        }
        if let Some(directory) = &self.individual_files_output_directory {
            config.individual_files_output_directory = Some(directory.clone());
        }
        config.append_filename |= self.append_filename;
        config.csv_summary |= self.csv_summary;
        config.xml_summary |= self.xml_summary;
        config.shasum_summary |= self.shasum_summary;
        config.quiet |= self.quiet;
        if let Some(directory) = &self.output_directory {
            config.output_directory = directory.clone();
        }
        if let Some(sub_path) = &self.sub_path {
            config.sub_path = Some(sub_path.clone());
        }
        if let Some(encoding) = &self.encoding {
            config.encoding = encoding.clone();
        }
        if let Some(salt) = &self.salt {
            config.salt = Some(salt.clone());
        }
    }
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// File to hash
    pub path: PathBuf,

    /// Restrict to these comma separated algorithms
    #[arg(short, long, value_delimiter = ',')]
    pub algorithms: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// CSV summary file to check against
    pub summary: PathBuf,

    #[command(flatten)]
    pub input: InputArgs,

    /// Path stripped from report paths after the base directory
    #[arg(long)]
    pub sub_path: Option<PathBuf>,

    /// Print the check report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AlgorithmsArgs {
    /// Print algorithm details as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse arguments from the process command line
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the parsed command
pub fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Files(args) => {
            let mut config = Config::load_or_default(cli.config.as_deref())?;
            args.apply(&mut config);
            run_files(&config, args)
        }
        Commands::File(args) => run_file(args),
        Commands::Check(args) => {
            let config = Config::load_or_default(cli.config.as_deref())?;
            run_check(&config, args)
        }
        Commands::Algorithms(args) => run_algorithms(args),
    }
}

fn artifact_listeners() -> Vec<Box<dyn ArtifactListener>> {
    vec![Box::new(LoggingArtifactListener)]
}

fn run_files(config: &Config, args: &FilesArgs) -> Result<()> {
    if config.skip {
        info!("Skipping checksum execution");
        return Ok(());
    }

    let files = args.input.resolve(config)?;
    debug!("Resolved {} file(s)", files.len());

    let registry = Arc::new(DigesterRegistry::new());
    let execution = config.execution(registry, files, artifact_listeners)?;
    let stats = execution.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    info!(
        "Computed {} digest(s) for {} file(s) in {:.2}s",
        stats.digests_computed,
        stats.files_processed,
        stats.duration.as_secs_f64()
    );
    if stats.failures > 0 {
        warn!("{} failure(s) during checksum execution", stats.failures);
    }
    Ok(())
}

fn run_file(args: &FileArgs) -> Result<()> {
    let algorithms: Vec<String> = if args.algorithms.is_empty() {
        supported_algorithms().into_iter().map(str::to_string).collect()
    } else {
        args.algorithms.clone()
    };

    let mut execution = Execution::new(Arc::new(DigesterRegistry::new()), FailurePolicy::Abort);
    execution
        .add_file(ChecksumFile::from_path(&args.path))
        .set_algorithms(algorithms)
        .add_target(Box::new(LogTarget::new()));

    execution
        .run()
        .with_context(|| format!("Failed to hash {}", args.path.display()))?;
    Ok(())
}

fn run_check(config: &Config, args: &CheckArgs) -> Result<()> {
    if config.skip {
        info!("Skipping checksum check");
        return Ok(());
    }

    let files = args.input.resolve(config)?;
    let summary = SummaryFile::read(&args.summary)?;
    debug!(
        "Summary {} lists {} file(s) for {}",
        summary.path().display(),
        summary.len(),
        summary.algorithms().join(", ")
    );

    let sub_path = args.sub_path.clone().or_else(|| config.sub_path.clone());
    let checker = SummaryChecker::new(Arc::new(DigesterRegistry::new())).with_sub_path(sub_path);
    let report = checker.check(&summary, &files)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        info!(
            "{} file(s) match {} ({} digest(s))",
            report.files_checked,
            summary.path().display(),
            report.digests_matched
        );
    }
    Ok(())
}

fn run_algorithms(args: &AlgorithmsArgs) -> Result<()> {
    let algorithms = DigesterRegistry::list_algorithms();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&algorithms)?);
        return Ok(());
    }

    for algorithm in algorithms {
        println!(
            "{:<14} {:<14} {:>5} bits",
            algorithm.name, algorithm.extension, algorithm.output_bits
        );
    }
    Ok(())
}
