mod cli;
mod commands;
mod error;
mod output;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use airsync_config::Config;
use airsync_core::{DeviceConfig, WifiDevice};

use crate::cli::{Cli, ColorMode, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        mut global,
        command,
    } = cli;

    match command {
        // Config commands don't need the bus
        Command::Config(args) => commands::config_cmd::handle(&args, &global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "airsync", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let config = airsync_config::load_config()?;
            apply_defaults(&mut global, &config)?;
            let device_config = build_device_config(&global, config)?;
            let device = WifiDevice::connect(device_config).await?;

            tracing::debug!(command = ?cmd, device = %device.backend().device_path(), "dispatching command");
            commands::dispatch(cmd, &device, &global).await
        }
    }
}

/// Fill output settings the command line left unset from the config file.
fn apply_defaults(global: &mut GlobalOpts, config: &Config) -> Result<(), CliError> {
    if global.output.is_none() {
        let format = OutputFormat::from_str(&config.defaults.output, true).map_err(|reason| {
            CliError::Validation {
                field: "defaults.output".into(),
                reason,
            }
        })?;
        global.output = Some(format);
    }
    if global.color.is_none() {
        let mode = ColorMode::from_str(&config.defaults.color, true).map_err(|reason| {
            CliError::Validation {
                field: "defaults.color".into(),
                reason,
            }
        })?;
        global.color = Some(mode);
    }
    Ok(())
}

/// Config file + environment, with `--interface` / `--device` on top.
fn build_device_config(global: &GlobalOpts, config: Config) -> Result<DeviceConfig, CliError> {
    let mut section = config.device;
    if let Some(ref interface) = global.interface {
        section.interface.clone_from(interface);
        section.path = None;
    }
    if let Some(ref path) = global.device {
        section.path = Some(path.clone());
    }
    Ok(airsync_config::device_config(&section)?)
}
