//! Entries command handlers.

use serde::Serialize;
use tabled::Tabled;
use tracing::warn;
use ucremote_config::{self as config, Config, StoredEntry};
use ucremote_core::{ConfigEntry, DeviceIdentifier};

use crate::cli::{EntriesArgs, EntriesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct EntryView {
    id: String,
    title: String,
    url: String,
    unique_id: String,
    api_key_name: String,
    device_type: String,
    key_storage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    default: bool,
}

impl EntryView {
    fn new(cfg: &Config, id: &str, stored: &StoredEntry) -> Self {
        Self {
            id: id.to_owned(),
            title: stored.title.clone(),
            url: stored.url.clone(),
            unique_id: stored.unique_id.clone(),
            api_key_name: stored.api_key_name.clone(),
            device_type: stored.device_type.clone(),
            key_storage: if stored.api_key.is_some() { "config" } else { "keyring" },
            api_key: stored.api_key.as_deref().map(util::redact),
            default: cfg.default_entry.as_deref() == Some(id),
        }
    }
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Key")]
    key_storage: &'static str,
}

impl From<&EntryView> for EntryRow {
    fn from(v: &EntryView) -> Self {
        Self {
            marker: if v.default { "*" } else { "" },
            id: v.id.clone(),
            title: v.title.clone(),
            url: v.url.clone(),
            key_storage: v.key_storage,
        }
    }
}

fn detail(v: &EntryView) -> String {
    output::detail_lines(&[
        ("ID", v.id.clone()),
        ("Title", v.title.clone()),
        ("URL", v.url.clone()),
        ("Unique ID", v.unique_id.clone()),
        ("Device type", v.device_type.clone()),
        ("API key name", v.api_key_name.clone()),
        (
            "API key",
            v.api_key
                .clone()
                .unwrap_or_else(|| "(system keyring)".into()),
        ),
        ("Default", v.default.to_string()),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: EntriesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config()?;
    let format = output::format(global, &cfg);

    match args.command {
        EntriesCommand::List => {
            let views: Vec<EntryView> = cfg
                .entries
                .iter()
                .map(|(id, stored)| EntryView::new(&cfg, id, stored))
                .collect();
            let out = output::render_list(format, &views, |v| EntryRow::from(v), |v| v.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntriesCommand::Show { id } => {
            let id = cfg.resolve_entry_id(id.as_deref().or(global.entry.as_deref()))?;
            let view = EntryView::new(&cfg, &id, cfg.entry(&id)?);
            let out = output::render_single(format, &view, detail, |v| v.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntriesCommand::Remove { id } => {
            let title = cfg.entry(&id)?.title.clone();
            if !util::confirm(&format!("Forget remote '{title}' ({id})?"), global.yes)? {
                return Ok(());
            }

            if let Err(e) = config::delete_api_key(&id) {
                warn!(entry_id = %id, error = %e, "API key left in the keyring");
            }
            cfg.entries.remove(&id);
            if cfg.default_entry.as_deref() == Some(id.as_str()) {
                cfg.default_entry = None;
            }
            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("Entry '{id}' removed");
            }
            Ok(())
        }

        EntriesCommand::Rename { id, title } => rename(&mut cfg, &id, &title, global).await,

        EntriesCommand::Use { id } => {
            cfg.entry(&id)?;
            cfg.default_entry = Some(id.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Default entry set to '{id}'");
            }
            Ok(())
        }
    }
}

/// Store the new title, then pass the edit through the integration so the
/// device picks up its new name. The remote being offline only skips the
/// second half.
async fn rename(
    cfg: &mut Config,
    id: &str,
    title: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CliError::Validation {
            field: "title".into(),
            reason: "cannot be empty".into(),
        });
    }

    let previous = config::load_entry(cfg, id);
    cfg.entry_mut(id)?.title = title.to_owned();
    config::save_config(cfg)?;

    let renamed = match previous {
        Ok(entry) => propagate_rename(cfg, entry, title, global).await,
        Err(e) => {
            warn!(entry_id = id, error = %e, "stored entry cannot be set up");
            None
        }
    };

    if !global.quiet {
        match renamed {
            Some(name) => eprintln!("Entry '{id}' renamed; device now shows as '{name}'"),
            None => eprintln!("Entry '{id}' renamed"),
        }
    }
    Ok(())
}

async fn propagate_rename(
    cfg: &Config,
    entry: ConfigEntry,
    title: &str,
    global: &GlobalOpts,
) -> Option<String> {
    let (host, integration) = util::integration(global, cfg);
    let identifier = DeviceIdentifier::new(entry.unique_id.as_str());
    let updated = ConfigEntry {
        title: title.to_owned(),
        ..entry.clone()
    };

    let result = util::with_spinner(global, format!("Updating {title}"), async {
        match integration.setup_entry(entry).await {
            Ok(_) => integration.entry_updated(updated).await,
            Err(e) => Err(e),
        }
    })
    .await;

    match result {
        Ok(()) => host.device_name(&identifier),
        Err(e) => {
            warn!(error = %e, "remote not updated");
            None
        }
    }
}
