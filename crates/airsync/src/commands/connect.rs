//! `airsync connect <profile>`

use airsync_api::Client;
use airsync_core::{CoreError, WifiDevice};

use crate::cli::{ConnectArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    device: &WifiDevice<Client>,
    args: &ConnectArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let active = device
        .activate_connection(&args.profile)
        .await
        .map_err(|e| match e {
            CoreError::Transport(ref t)
                if matches!(t, airsync_api::Error::Dbus(_) | airsync_api::Error::Fdo(_))
                    && !t.is_access_denied() =>
            {
                CliError::ActivationFailed {
                    profile: args.profile.clone(),
                    source: e,
                }
            }
            other => other.into(),
        })?;

    output::print_output(&active, global.quiet);
    Ok(())
}
