//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let config = airsync_config::load_config()?;
            let rendered = airsync_config::to_toml(&config)?;
            output::print_output(rendered.trim_end(), global.quiet);
        }
        ConfigCommand::Path => {
            output::print_output(&airsync_config::config_path().display().to_string(), global.quiet);
        }
    }
    Ok(())
}
