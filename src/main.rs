//! andor-probe: load the Andor driver and report the attached cameras.
//!
//! Exit status is 1 when the driver library or one of its exports cannot be
//! resolved, 2 for configuration or driver errors after that, 0 otherwise.

use andor_idus::config::{LoggingConfig, DEFAULT_CONFIG_PATH};
use andor_idus::{discover_cameras, AndorConfig, AndorSdk, DriverLoader};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "andor-probe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Driver library to load, overriding the configuration
    #[arg(short, long)]
    library: Option<PathBuf>,

    /// Directory passed to Initialize (holds detector.ini)
    #[arg(short, long)]
    init_dir: Option<PathBuf>,

    /// Print cameras as JSON
    #[arg(long)]
    json: bool,

    /// Stop after the driver and its exports have been resolved
    #[arg(long)]
    load_only: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("andor-probe: {e:#}");
            return ExitCode::from(2);
        }
    };

    init_tracing(&config.logging);

    let loader = DriverLoader::new();
    let sdk = match loader.load(&config.library.path) {
        Ok(sdk) => sdk,
        Err(e) => {
            debug!(path = %config.library.path.display(), "Driver library unusable");
            eprintln!("andor-probe: {e}");
            return ExitCode::from(1);
        }
    };

    if cli.load_only {
        println!("loaded {}", sdk.source());
        return ExitCode::SUCCESS;
    }

    match report(sdk.as_ref(), &config, cli.json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("andor-probe: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn load_config(cli: &Cli) -> Result<AndorConfig> {
    let mut config = AndorConfig::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(library) = &cli.library {
        config.library.path = library.clone();
    }
    if let Some(init_dir) = &cli.init_dir {
        config.library.init_dir = init_dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("andor_idus={0},andor_probe={0}", logging.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn report(sdk: &dyn AndorSdk, config: &AndorConfig, json: bool) -> Result<()> {
    let cameras = discover_cameras(sdk, &config.library.init_dir)
        .with_context(|| format!("initializing driver from {}", config.library.init_dir.display()))?;
    info!(count = cameras.len(), "Camera discovery complete");

    if json {
        println!("{}", serde_json::to_string_pretty(&cameras)?);
        return Ok(());
    }

    if cameras.is_empty() {
        println!("No Andor cameras detected");
    }
    for camera in &cameras {
        println!(
            "[{}] handle {:>6}  {}",
            camera.index, camera.handle, camera.head_model
        );
    }
    Ok(())
}
