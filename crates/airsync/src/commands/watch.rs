//! `airsync watch`: re-render on every published snapshot until Ctrl-C.

use airsync_api::Client;
use airsync_core::{AccessPointFilter, SnapshotStream, WifiDevice};

use crate::cli::{FilterArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    device: &WifiDevice<Client>,
    args: &FilterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    device.start().await?;
    let mut stream = device.access_points();

    let result = follow(&mut stream, &args.filters(), global).await;
    device.shutdown().await?;
    result
}

async fn follow(
    stream: &mut SnapshotStream,
    filters: &[AccessPointFilter],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color_mode());
    let mut updates = 0u64;
    emit(stream, filters, global, color, updates)?;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            snapshot = stream.changed() => {
                if snapshot.is_none() {
                    break;
                }
                updates += 1;
                emit(stream, filters, global, color, updates)?;
            }
        }
    }
    Ok(())
}

fn emit(
    stream: &SnapshotStream,
    filters: &[AccessPointFilter],
    global: &GlobalOpts,
    color: bool,
    updates: u64,
) -> Result<(), CliError> {
    let selected = super::select(stream.current(), filters);
    let format = global.format();
    if format == OutputFormat::Table {
        output::status(
            &format!("── {} access points (update {updates}) ──", selected.len()),
            color,
            global.quiet,
        );
    }
    let rendered = output::render_access_points(&format, &selected)?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
