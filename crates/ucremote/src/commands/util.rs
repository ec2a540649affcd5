//! Shared helpers for command handlers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use ucremote_api::TransportConfig;
use ucremote_config::{self as config, Config};
use ucremote_core::{ConfigEntry, Connector, Host, HttpConnector, Integration, RemoteDevice};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::host::CliHost;

/// A loaded config, the integration built on it and the active entry set up.
pub struct Session {
    pub config: Config,
    pub host: Arc<CliHost>,
    pub integration: Integration,
    pub entry: ConfigEntry,
    pub device: Arc<RemoteDevice>,
}

/// Integration wired to the CLI host and real HTTP clients.
pub fn integration(global: &GlobalOpts, cfg: &Config) -> (Arc<CliHost>, Integration) {
    let host = Arc::new(CliHost::from_config(cfg));
    let timeout = global
        .timeout
        .map_or_else(|| cfg.timeout(), Duration::from_secs);
    let connector = HttpConnector::new(TransportConfig::default().with_timeout(timeout));
    let integration = Integration::new(
        Arc::clone(&host) as Arc<dyn Host>,
        Arc::new(connector) as Arc<dyn Connector>,
    );
    (host, integration)
}

/// Load the config, resolve the entry from `--entry` and set its device up.
pub async fn open_session(global: &GlobalOpts) -> Result<Session, CliError> {
    let cfg = config::load_config()?;
    let entry_id = cfg.resolve_entry_id(global.entry.as_deref())?;
    let entry = config::load_entry(&cfg, &entry_id)?;
    let (host, integration) = integration(global, &cfg);

    let device = with_spinner(
        global,
        format!("Connecting to {}", entry.title),
        integration.setup_entry(entry.clone()),
    )
    .await?;

    Ok(Session {
        config: cfg,
        host,
        integration,
        entry,
        device,
    })
}

/// Run `fut` behind a spinner on stderr. No spinner in quiet mode.
pub async fn with_spinner<F, T>(global: &GlobalOpts, message: String, fut: F) -> T
where
    F: Future<Output = T>,
{
    if global.quiet {
        return fut.await;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = fut.await;
    spinner.finish_and_clear();
    out
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|_| CliError::NonInteractiveRequiresYes {
            action: message.into(),
        })
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Redact all but the first four characters of a secret.
pub fn redact(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".into()
    } else {
        format!("{visible}****")
    }
}
