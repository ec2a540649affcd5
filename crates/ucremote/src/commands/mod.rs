//! Command handlers, one module per top-level subcommand.

pub mod activities;
pub mod entries;
pub mod info;
pub mod pair;
pub mod send;
pub mod util;
