//! Activities command: poll the remote once through its entity.

use serde::Serialize;
use tabled::Tabled;
use ucremote_core::remote;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct ActivityView {
    name: String,
    current: bool,
}

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "Activity")]
    name: String,
    #[tabled(rename = "State")]
    state: &'static str,
}

impl From<&ActivityView> for ActivityRow {
    fn from(a: &ActivityView) -> Self {
        Self {
            name: a.name.clone(),
            state: if a.current { "on" } else { "" },
        }
    }
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::open_session(global).await?;
    let entities = remote::setup_entry(&session.integration, &session.entry).await?;

    let mut views = Vec::new();
    for entity in &entities {
        let Some(list) = entity.activity_list().filter(|_| entity.available()) else {
            return Err(CliError::ConnectionFailed {
                url: session.device.endpoint().to_string(),
                reason: "the activity list could not be read".into(),
            });
        };
        views.extend(list.iter().map(|name| ActivityView {
            name: name.clone(),
            current: entity.current_activity() == Some(name.as_str()),
        }));
    }

    let format = output::format(global, &session.config);
    let out = output::render_list(
        format,
        &views,
        |a| ActivityRow::from(a),
        |a| a.name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
