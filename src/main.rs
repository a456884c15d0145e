use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use digipot_control::{ConfigStore, Kernel};

/// Serve digipot current commands read line by line from stdin
#[derive(Debug, Parser)]
#[command(name = "digipot-control", version)]
struct Args {
    /// Configuration file (`key value` per line)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override a configuration value, e.g. `--set alpha_current=1.2`
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    overrides: Vec<(String, String)>,
}

fn parse_override(text: &str) -> Result<(String, String), String> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", text))?;
    if key.trim().is_empty() {
        return Err(format!("missing key in `{}`", text));
    }
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn load_config(args: &Args) -> Result<ConfigStore> {
    let mut config = match &args.config {
        Some(path) => ConfigStore::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ConfigStore::new(),
    };

    for (key, value) in &args.overrides {
        config.set(key, value);
    }

    info!("Configuration has {} values", config.len());
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing on stderr so stdout carries only command replies
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("digipot_control=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut kernel = Kernel::load_modules(&config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read command line")? {
        if line.trim().is_empty() {
            continue;
        }

        let mut reply = String::new();
        match kernel.dispatch_line(&line, &mut reply) {
            Ok(()) => reply.push_str("ok\n"),
            Err(e) => {
                error!("Rejected `{}`: {}", line, e);
                reply.push_str(&format!("error: {}\n", e));
            }
        }

        stdout
            .write_all(reply.as_bytes())
            .await
            .context("Failed to write reply")?;
        stdout.flush().await.context("Failed to flush reply")?;
    }

    info!("Input closed, exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("alpha_current = 1.2"),
            Ok(("alpha_current".to_string(), "1.2".to_string()))
        );
        assert!(parse_override("alpha_current").is_err());
        assert!(parse_override("=1.2").is_err());
    }

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let args = Args::parse_from([
            "digipot-control",
            "--set",
            "currentcontrol_module_enable=true",
            "--set",
            "digipotchip=ad5206",
        ]);
        let config = load_config(&args).unwrap();
        let kernel = Kernel::load_modules(&config);
        assert_eq!(kernel.gcode_listener_count(), 1);
    }
}
