//! `airsync scan`

use airsync_api::Client;
use airsync_core::WifiDevice;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(device: &WifiDevice<Client>, global: &GlobalOpts) -> Result<(), CliError> {
    device.request_scan().await?;
    output::status(
        "Scan requested; results arrive asynchronously",
        output::should_color(&global.color_mode()),
        global.quiet,
    );
    Ok(())
}
