//! mllm-ffi - Native Extension Bootstrap
//!
//! CLI for checking where the native extension is expected and whether it loads.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mllm_ffi::{artifact_name, Bootstrap, BootstrapConfig, DylibLoader, NativeModule};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mllm-ffi")]
#[command(version)]
#[command(about = "Locate and load the MllmFFIExtension native library", long_about = None)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the platform identifier and the artifact name it selects
    Platform {
        /// Platform identifier (default: host)
        #[arg(long)]
        platform: Option<String>,
    },

    /// Print the full path the artifact is loaded from
    Path {
        #[command(flatten)]
        lookup: LookupArgs,

        /// Also save the effective lookup settings to this config file
        #[arg(long, value_name = "FILE")]
        write_config: Option<PathBuf>,
    },

    /// Load the artifact and check exported symbols
    Load {
        #[command(flatten)]
        lookup: LookupArgs,

        /// Symbol that must be exported (repeatable)
        #[arg(long = "symbol", value_name = "NAME")]
        symbols: Vec<String>,
    },
}

#[derive(Args)]
struct LookupArgs {
    /// Config file (default: mllm_ffi.toml in the current directory or a parent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the artifact
    #[arg(long)]
    lib_dir: Option<PathBuf>,

    /// Platform identifier (default: host)
    #[arg(long)]
    platform: Option<String>,
}

impl LookupArgs {
    /// Config file settings with command-line flags applied on top
    fn config(&self) -> Result<BootstrapConfig> {
        let mut config = match &self.config {
            Some(path) => BootstrapConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                BootstrapConfig::find_and_load(&cwd)?
            }
        };

        if let Some(dir) = &self.lib_dir {
            config.bootstrap.lib_dir = Some(dir.clone());
        }
        if let Some(platform) = &self.platform {
            config.bootstrap.platform = Some(platform.clone());
        }
        Ok(config)
    }

    fn bootstrap(&self) -> Result<Bootstrap> {
        Ok(Bootstrap::from_config(&self.config()?))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Platform { platform } => cmd_platform(platform),
        Commands::Path {
            lookup,
            write_config,
        } => cmd_path(&lookup, write_config.as_ref()),
        Commands::Load { lookup, symbols } => cmd_load(&lookup, &symbols),
    }
}

fn cmd_platform(platform: Option<String>) -> Result<()> {
    let mut bootstrap = Bootstrap::new();
    if let Some(platform) = platform {
        bootstrap = bootstrap.with_platform(platform);
    }

    let platform = bootstrap.platform();
    println!("platform: {}", platform);
    println!("artifact: {}", artifact_name(platform));
    Ok(())
}

fn cmd_path(lookup: &LookupArgs, write_config: Option<&PathBuf>) -> Result<()> {
    let mut config = lookup.config()?;
    let path = Bootstrap::from_config(&config)
        .artifact_path()
        .context("Failed to resolve bootstrap location")?;
    println!("{}", path.display());

    if let Some(out) = write_config {
        // Saved directories must not depend on where the file is read from
        if let Some(dir) = config.bootstrap.lib_dir.as_mut() {
            if dir.is_relative() {
                *dir = std::env::current_dir()
                    .context("Failed to read current directory")?
                    .join(&*dir);
            }
        }
        config
            .save(out)
            .with_context(|| format!("Failed to write config {}", out.display()))?;
    }
    Ok(())
}

fn cmd_load(lookup: &LookupArgs, symbols: &[String]) -> Result<()> {
    let module: NativeModule = lookup.bootstrap()?.load(&DylibLoader)?;
    println!("Loaded {}", module.path().display());

    let mut missing = 0;
    for name in symbols {
        if module.has_symbol(name) {
            println!("  {}: found", name);
        } else {
            println!("  {}: missing", name);
            missing += 1;
        }
    }

    if missing > 0 {
        bail!("{} of {} symbols missing", missing, symbols.len());
    }
    Ok(())
}
