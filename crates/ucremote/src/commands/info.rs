//! Info command: the device card plus what the remote reports about itself.

use serde::Serialize;
use ucremote_core::{DeviceInfo, Platform};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct InfoView {
    entry_id: String,
    title: String,
    endpoint: String,
    #[serde(flatten)]
    device: DeviceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    core_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    os_version: Option<String>,
    platforms: Vec<Platform>,
}

fn detail(v: &InfoView) -> String {
    let or_dash = |s: &Option<String>| s.clone().unwrap_or_else(|| "-".into());
    output::detail_lines(&[
        ("Entry", v.entry_id.clone()),
        ("Title", v.title.clone()),
        ("Name", v.device.name.clone()),
        ("Identifier", v.device.identifier.to_string()),
        ("Manufacturer", v.device.manufacturer.clone()),
        ("Model", v.device.model.clone()),
        ("Endpoint", v.endpoint.clone()),
        ("Hostname", or_dash(&v.hostname)),
        ("API version", or_dash(&v.device.sw_version)),
        ("Core version", or_dash(&v.core_version)),
        ("OS version", or_dash(&v.os_version)),
        (
            "Platforms",
            v.platforms
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
    ])
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::open_session(global).await?;
    let device = &session.device;
    let version = device.version();

    let view = InfoView {
        entry_id: session.entry.entry_id.clone(),
        title: device.title().to_owned(),
        endpoint: device.endpoint().to_string(),
        device: device.device_info().await,
        hostname: version.hostname.clone(),
        core_version: version.core.clone(),
        os_version: version.os.clone(),
        platforms: session.host.platforms(&session.entry.entry_id),
    };

    let format = output::format(global, &session.config);
    let out = output::render_single(format, &view, detail, |v| v.device.identifier.to_string());
    output::print_output(&out, global.quiet);
    Ok(())
}
