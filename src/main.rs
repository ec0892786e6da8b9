use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use serde_json::json;
use tracing::{debug, info};

use gameconf::config::{self as cfg, GameConfig};
use gameconf::utils::paths;

/// gameconf CLI
#[derive(Debug, Parser)]
#[command(
    name = gameconf::PKG_NAME,
    version = gameconf::PKG_VERSION,
    about = "Inspect, validate and normalize the game INI configuration"
)]
struct Args {
    /// Path to the INI configuration file (defaults to the platform config directory)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Set log level (e.g., trace, debug, info, warn, error). Overrides RUST_LOG.
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Print the default configuration document and exit
    #[arg(long = "print-defaults")]
    print_defaults: bool,

    /// Print the JSON Schema for the configuration record and exit
    #[arg(long = "print-schema")]
    print_schema: bool,

    /// Write the default configuration if the file does not exist yet
    #[arg(long = "init")]
    init: bool,

    /// Rewrite the file in canonical form after a successful load
    #[arg(long = "normalize")]
    normalize: bool,

    /// Print the loaded record and load result as JSON
    #[arg(long = "json")]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // --log-level wins over RUST_LOG.
    match args.log_level.as_deref() {
        Some(level) => gameconf::init_tracing_with_level(
            gameconf::parse_level(level).unwrap_or(tracing::Level::INFO),
        ),
        None => gameconf::init_tracing(),
    }

    if args.print_schema {
        let stdout = std::io::stdout();
        cfg::write_schema_to_writer(stdout.lock())?;
        println!();
        return Ok(());
    }

    if args.print_defaults {
        let text = GameConfig::default_document_text()?;
        print!("{text}");
        return Ok(());
    }

    let path = match args.config {
        Some(path) => path,
        None => paths::default_config_file()
            .context("No default config location on this platform; pass --config")?,
    };
    info!(
        version = gameconf::PKG_VERSION,
        config = %path.display(),
        "Starting gameconf"
    );

    if args.init && cfg::write_default_if_missing(&path)? {
        info!(config = %path.display(), "Created default configuration");
    }

    let mut config = GameConfig::new();
    let loaded = config.load_file(&path);

    if args.json {
        let out = json!({
            "record": config.record(),
            "controls": config.record().controls(),
            "result": config.result(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", config.result());
    }

    if !loaded {
        bail!("Configuration {} is not valid", path.display());
    }
    debug!(target: "gameconf", "Configuration loaded successfully");

    if args.normalize {
        config
            .save()
            .into_checked()
            .with_context(|| format!("Failed to rewrite {}", path.display()))?;
        info!(config = %path.display(), "Configuration normalized");
    }

    Ok(())
}
