//! deploy-compress CLI binary.
//!
//! Runs the compress-before-upload step over a build directory.
//!
//! # Commands
//!
//! - `run` - Configure and compress a dist directory, print the outcome as JSON
//! - `check` - Validate configuration without touching any files

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use deploy_compress::{
    config::{Config, ConfigMap, ProjectConfig},
    CompressPlugin, DeployContext, DeployPlugin, VERSION,
};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "deploy-compress")]
#[command(version = VERSION)]
#[command(about = "Compress static build artifacts with gzip/brotli before upload", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress files in a dist directory
    Run {
        /// Build output directory
        #[arg(short, long)]
        dist_dir: PathBuf,

        /// TOML config file with [compress] and [project] tables
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Browser target query (repeatable)
        #[arg(short, long = "browser")]
        browsers: Vec<String>,

        /// Compression token: best, gzip, brotli (repeatable)
        #[arg(long)]
        compression: Vec<String>,

        /// Keep originals next to compressed files
        #[arg(short, long)]
        keep: bool,

        /// Use the zopfli encoder for gzip output
        #[arg(long)]
        zopfli: bool,

        /// Include glob
        #[arg(long)]
        file_pattern: Option<String>,

        /// Exclude glob
        #[arg(long)]
        ignore_pattern: Option<String>,

        /// Files relative to the dist directory (default: every file in it)
        files: Vec<String>,
    },

    /// Validate configuration and list defaulted keys
    Check {
        /// TOML config file with [compress] and [project] tables
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Run {
            dist_dir,
            config,
            browsers,
            compression,
            keep,
            zopfli,
            file_pattern,
            ignore_pattern,
            files,
        } => {
            let overrides = cli_overrides(
                browsers,
                compression,
                keep,
                zopfli,
                file_pattern,
                ignore_pattern,
            );
            cmd_run(dist_dir, config, overrides, files)
        },

        Commands::Check { config } => cmd_check(config),
    }
}

fn cmd_run(
    dist_dir: PathBuf,
    config: Option<PathBuf>,
    overrides: Config,
    files: Vec<String>,
) -> anyhow::Result<()> {
    let config = load_config(config)?.merge(overrides);

    let files = if files.is_empty() {
        list_dist_files(&dist_dir)?
    } else {
        files
    };

    let context = DeployContext::new(&dist_dir, files)
        .with_config(config.compress.clone())
        .with_project(config.project());

    let plugin = CompressPlugin::new("compress");
    plugin.configure(&context)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(plugin.will_upload(&context))?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn cmd_check(config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let context = DeployContext::new(".", Vec::new())
        .with_config(config.compress.clone())
        .with_project(config.project());

    let resolution = CompressPlugin::new("compress").resolve(&context, false)?;

    println!("Configuration OK");
    println!("  filePattern:    {}", resolution.config.display_value("filePattern"));
    println!("  ignorePattern:  {}", resolution.config.display_value("ignorePattern"));
    println!("  compression:    {}", resolution.config.display_value("compression"));
    println!("  zopfli:         {}", resolution.config.display_value("zopfli"));
    println!("  keep:           {}", resolution.config.display_value("keep"));
    if !resolution.defaulted.is_empty() {
        println!();
        println!("Defaulted: {}", resolution.defaulted.join(", "));
    }

    Ok(())
}

// Helper functions

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::from_file(path)?),
        None => Ok(Config::default()),
    }
}

fn cli_overrides(
    browsers: Vec<String>,
    compression: Vec<String>,
    keep: bool,
    zopfli: bool,
    file_pattern: Option<String>,
    ignore_pattern: Option<String>,
) -> Config {
    let mut compress = ConfigMap::new();
    if !compression.is_empty() {
        compress.insert("compression", compression);
    }
    // Flags can only switch these on; absent flags leave the file's value alone.
    if keep {
        compress.insert("keep", true);
    }
    if zopfli {
        compress.insert("zopfli", true);
    }
    if let Some(pattern) = file_pattern {
        compress.insert("filePattern", pattern);
    }
    if let Some(pattern) = ignore_pattern {
        compress.insert("ignorePattern", pattern);
    }

    Config {
        compress,
        project: ProjectConfig {
            name: None,
            browsers: (!browsers.is_empty()).then_some(browsers),
        },
    }
}

/// Every regular file under `dist_dir`, relative and `/`-separated, sorted
fn list_dist_files(dist_dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dist_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", dist_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dist_dir)?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(parts.join("/"));
    }
    Ok(files)
}
