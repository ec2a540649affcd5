//! Clap derive structures for the `ucremote` CLI.

use std::net::IpAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ucremote -- pair and drive Unfolded Circle Remote Two devices
#[derive(Debug, Parser)]
#[command(
    name = "ucremote",
    version,
    about = "Pair and drive Unfolded Circle Remote Two devices",
    long_about = "Pairs Remote Two devices over their local REST API, stores the issued\n\
        API keys, and sends IR commands to the appliances the remotes know.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Paired remote to act on (entry id)
    #[arg(long, short = 'e', env = "UCREMOTE_ENTRY", global = true)]
    pub entry: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "UCREMOTE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds [default: from config, else 10]
    #[arg(long, env = "UCREMOTE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pair a new remote and store its API key
    Pair(PairArgs),

    /// Manage paired remotes
    #[command(alias = "e")]
    Entries(EntriesArgs),

    /// List the remote's activities and the one running
    #[command(alias = "act")]
    Activities,

    /// Send IR commands to an appliance through the remote
    Send(SendArgs),

    /// Show device information of the remote
    Info,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Pair ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PairArgs {
    /// Remote address (e.g. 192.168.1.20 or http://remote-two.local/api/)
    #[arg(long, conflicts_with = "host")]
    pub url: Option<String>,

    /// Announced IP address of the remote, as seen in a service discovery
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port of the announced remote (with --host)
    #[arg(long, default_value = "80")]
    pub port: u16,

    /// Web configurator PIN shown on the remote
    #[arg(long, env = "UCREMOTE_PIN", hide_env_values = true)]
    pub pin: Option<String>,

    /// Display name for the new entry [default: the remote's own name]
    #[arg(long)]
    pub name: Option<String>,

    /// Save the API key in the config file instead of the system keyring
    #[arg(long)]
    pub plaintext_key: bool,
}

// ── Entries ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EntriesArgs {
    #[command(subcommand)]
    pub command: EntriesCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntriesCommand {
    /// List paired remotes
    #[command(alias = "ls")]
    List,

    /// Show one paired remote (API key redacted)
    Show {
        /// Entry id [default: the active entry]
        id: Option<String>,
    },

    /// Forget a paired remote and delete its stored API key
    #[command(alias = "rm")]
    Remove {
        /// Entry id
        id: String,
    },

    /// Change the display name of a paired remote
    Rename {
        /// Entry id
        id: String,
        /// New display name
        title: String,
    },

    /// Make an entry the default
    Use {
        /// Entry id
        id: String,
    },
}

// ── Send ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Command names, sent in order (e.g. VOLUME_UP MUTE)
    #[arg(required = true)]
    pub commands: Vec<String>,

    /// Appliance to address, by its name on the remote
    #[arg(long, short = 'd')]
    pub device: String,

    /// IR emitter to fire from [default: the only one present]
    #[arg(long)]
    pub emitter: Option<String>,

    /// How many times to send the whole command list
    #[arg(long, short = 'r', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub repeats: u32,

    /// Seconds to wait between two commands
    #[arg(long, default_value = "0")]
    pub delay: f64,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
