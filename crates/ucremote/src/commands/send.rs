//! Send command: forward IR commands through the remote entity.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;
use ucremote_core::{RemoteEntity, SendOptions, SendReport};

use crate::cli::{GlobalOpts, SendArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct CommandResult {
    command: String,
    sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct CommandRow {
    #[tabled(rename = "Command")]
    command: String,
    #[tabled(rename = "Result")]
    result: String,
}

impl From<&CommandResult> for CommandRow {
    fn from(r: &CommandResult) -> Self {
        Self {
            command: r.command.clone(),
            result: r.error.clone().unwrap_or_else(|| "sent".into()),
        }
    }
}

fn results(report: &SendReport) -> Vec<CommandResult> {
    report
        .outcomes
        .iter()
        .map(|o| CommandResult {
            command: o.command.clone(),
            sent: o.is_sent(),
            error: o.error.as_ref().map(ToString::to_string),
        })
        .collect()
}

pub async fn handle(args: SendArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let delay = Duration::try_from_secs_f64(args.delay).map_err(|e| CliError::Validation {
        field: "delay".into(),
        reason: e.to_string(),
    })?;
    let mut options = SendOptions::to_device(args.device)
        .with_repeats(args.repeats)
        .with_delay(delay);
    if let Some(emitter) = args.emitter {
        options = options.with_emitter(emitter);
    }

    let session = util::open_session(global).await?;
    let entity = RemoteEntity::new(Arc::clone(&session.device));

    let report = util::with_spinner(
        global,
        format!("Sending to {}", entity.name()),
        entity.send_command(&args.commands, &options),
    )
    .await?;

    let format = output::format(global, &session.config);
    let rows = results(&report);
    let out = output::render_list(
        format,
        &rows,
        |r| CommandRow::from(r),
        |r| format!("{}\t{}", r.command, if r.sent { "sent" } else { "failed" }),
    );
    output::print_output(&out, global.quiet);

    if report.all_sent() {
        Ok(())
    } else {
        Err(CliError::CommandsFailed {
            failed: report.failed().count(),
            total: report.outcomes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use ucremote_api::Error as ApiError;
    use ucremote_core::CommandOutcome;

    use super::*;

    #[test]
    fn rows_follow_dispatch_order() {
        let report = SendReport {
            outcomes: vec![
                CommandOutcome {
                    command: "A".into(),
                    error: Some(ApiError::CodeSetNotFound {
                        target: "TV".into(),
                    }),
                },
                CommandOutcome {
                    command: "B".into(),
                    error: None,
                },
            ],
        };

        let rows = results(&report);
        let order: Vec<_> = rows.iter().map(|r| (r.command.as_str(), r.sent)).collect();
        assert_eq!(order, [("A", false), ("B", true)]);
        assert!(rows[0].error.is_some());
        assert_eq!(CommandRow::from(&rows[1]).result, "sent");
    }
}
