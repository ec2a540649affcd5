//! Pair command: drive the pairing wizard from flags or prompts, then store
//! the issued key and check that the new entry sets up.

use dialoguer::Input;
use secrecy::SecretString;
use serde::Serialize;
use tracing::debug;
use ucremote_config::{self as config, StoredEntry};
use ucremote_core::flow::{Auth, Entry, Finish};
use ucremote_core::{
    AuthOutcome, DiscoveryOutcome, EntryOutcome, FlowError, Integration, PairingFlow,
    ZeroconfInfo,
};

use crate::cli::{GlobalOpts, PairArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Summary view ────────────────────────────────────────────────────

#[derive(Serialize)]
struct Paired {
    entry_id: String,
    title: String,
    url: String,
    device_name: String,
    api_key_name: String,
    key_storage: &'static str,
    default: bool,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: PairArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config()?;
    let (_host, integration) = util::integration(global, &cfg);

    let auth = submit_endpoint(&integration, &args, global).await?;
    let device_name = auth.device_name().to_owned();
    let finish = submit_pin(auth, &args, global).await?;
    let new_entry = submit_name(finish, &args, global)?;

    let entry_id = cfg.allocate_entry_id(&new_entry.title);
    if !args.plaintext_key {
        config::store_api_key(&entry_id, &new_entry.profile.api_key)?;
    }
    cfg.entries.insert(
        entry_id.clone(),
        StoredEntry::from_new_entry(&new_entry, args.plaintext_key),
    );
    let is_default = cfg.default_entry.is_none();
    if is_default {
        cfg.default_entry = Some(entry_id.clone());
    }
    config::save_config(&cfg)?;
    debug!(%entry_id, "entry stored");

    let entry = new_entry.into_entry(entry_id.clone());
    let summary = Paired {
        entry_id,
        title: entry.title.clone(),
        url: entry.profile.url.to_string(),
        device_name,
        api_key_name: entry.profile.api_key_name.clone(),
        key_storage: if args.plaintext_key { "config" } else { "keyring" },
        default: is_default,
    };

    util::with_spinner(
        global,
        format!("Checking {}", entry.title),
        integration.setup_entry(entry),
    )
    .await?;

    let cfg_format = output::format(global, &cfg);
    let out = output::render_single(
        cfg_format,
        &summary,
        |p| {
            output::detail_lines(&[
                ("Entry", p.entry_id.clone()),
                ("Title", p.title.clone()),
                ("URL", p.url.clone()),
                ("Device", p.device_name.clone()),
                ("API key", p.api_key_name.clone()),
                ("Stored in", p.key_storage.to_owned()),
                ("Default", p.default.to_string()),
            ])
        },
        |p| p.entry_id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Steps ───────────────────────────────────────────────────────────

/// Reach the `auth` step. Flags are tried once; prompted addresses are
/// asked again after a failure.
async fn submit_endpoint(
    integration: &Integration,
    args: &PairArgs,
    global: &GlobalOpts,
) -> Result<PairingFlow<Auth>, CliError> {
    if let Some(ip_address) = args.host {
        let discovery = ZeroconfInfo {
            ip_address,
            port: args.port,
        };
        let url = discovery.endpoint();
        let outcome = util::with_spinner(
            global,
            format!("Contacting {url}"),
            PairingFlow::zeroconf(integration, discovery),
        )
        .await;
        return match outcome {
            DiscoveryOutcome::Advance(auth) => Ok(auth),
            DiscoveryOutcome::Abort(reason) => Err(CliError::from_abort(reason, &url)),
        };
    }

    let mut flow: PairingFlow<Entry> = PairingFlow::user(integration);
    let mut preset = args.url.clone();
    loop {
        let prompted = preset.is_none();
        let url = match preset.take() {
            Some(url) => url,
            None => Input::<String>::new()
                .with_prompt("Remote address")
                .interact_text()
                .map_err(util::prompt_err)?,
        };

        let outcome = util::with_spinner(
            global,
            format!("Contacting {url}"),
            flow.submit_endpoint(&url),
        )
        .await;
        match outcome {
            EntryOutcome::Advance(auth) => return Ok(auth),
            EntryOutcome::Abort(reason) => return Err(CliError::from_abort(reason, &url)),
            EntryOutcome::Retry(_, code) if !prompted => {
                return Err(CliError::from_flow(code, &url));
            }
            EntryOutcome::Retry(back, code) => {
                eprintln!("   ✗ {}", form_message(code));
                flow = back;
            }
        }
    }
}

/// Trade the PIN for an API key.
async fn submit_pin(
    mut flow: PairingFlow<Auth>,
    args: &PairArgs,
    global: &GlobalOpts,
) -> Result<PairingFlow<Finish>, CliError> {
    let mut preset = args.pin.clone();
    if preset.is_none() && !global.quiet {
        eprintln!(
            "Enable the web configurator on {} and enter the PIN it shows.",
            flow.device_name()
        );
    }

    loop {
        let prompted = preset.is_none();
        let pin = match preset.take() {
            Some(pin) => pin,
            None => rpassword::prompt_password("PIN: ").map_err(util::prompt_err)?,
        };
        let url = flow.endpoint().to_string();

        let outcome = util::with_spinner(
            global,
            "Requesting an API key".to_owned(),
            flow.submit_pin(SecretString::from(pin)),
        )
        .await;
        match outcome {
            AuthOutcome::Advance(finish) => return Ok(finish),
            AuthOutcome::Retry(_, code) if !prompted => {
                return Err(CliError::from_flow(code, &url));
            }
            AuthOutcome::Retry(back, code) => {
                eprintln!("   ✗ {}", form_message(code));
                flow = back;
            }
        }
    }
}

/// Pick the display name. `--yes` accepts the remote's own name.
fn submit_name(
    flow: PairingFlow<Finish>,
    args: &PairArgs,
    global: &GlobalOpts,
) -> Result<ucremote_core::NewEntry, CliError> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None if global.yes => String::new(),
        None => Input::<String>::new()
            .with_prompt("Name")
            .default(flow.default_name().to_owned())
            .interact_text()
            .map_err(util::prompt_err)?,
    };
    Ok(flow.submit_name(&name))
}

fn form_message(code: FlowError) -> &'static str {
    match code {
        FlowError::Connection => "No Remote Two answered at that address",
        FlowError::Auth => "The remote rejected the PIN",
        FlowError::Timeout => "The remote did not answer in time",
        FlowError::CannotConnect => "Could not open a connection to the remote",
    }
}
