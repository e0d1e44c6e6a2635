//! Command dispatch: bridges CLI args -> device operations -> output formatting.

pub mod config_cmd;
pub mod connect;
pub mod list;
pub mod scan;
pub mod watch;

use std::sync::Arc;

use airsync_api::Client;
use airsync_core::{AccessPoint, AccessPointFilter, Snapshot, WifiDevice};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    device: &WifiDevice<Client>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => list::handle(device, &args, global).await,
        Command::Watch(args) => watch::handle(device, &args, global).await,
        Command::Scan => scan::handle(device, global).await,
        Command::Connect(args) => connect::handle(device, &args, global).await,
        // Config and Completions never reach a device
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Strongest-first records matching every filter.
pub(crate) fn select(snapshot: &Snapshot, filters: &[AccessPointFilter]) -> Vec<Arc<AccessPoint>> {
    let mut selected = AccessPointFilter::All.apply(snapshot);
    selected.retain(|ap| filters.iter().all(|f| f.matches(ap)));
    selected
}
