//! `airsync list`: bootstrap once, print, exit.

use airsync_api::Client;
use airsync_core::WifiDevice;
use tracing::debug;

use crate::cli::{FilterArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    device: &WifiDevice<Client>,
    args: &FilterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let report = device.start().await?;
    debug!(?report, "bootstrap finished");

    let selected = super::select(&device.snapshot(), &args.filters());
    device.shutdown().await?;

    let rendered = output::render_access_points(&global.format(), &selected)?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
