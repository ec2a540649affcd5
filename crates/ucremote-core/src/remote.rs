// ── Remote entity ──
//
// The `remote` platform: one entity per set-up device. Polls the activity
// list, forwards IR commands and tracks availability. Nothing here raises
// on a device failure; polls flip `available`, command failures are logged
// and collected.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};
use ucremote_api::{DeviceGroup, Error as ApiError, IrTarget, RemoteApi};

use crate::device::RemoteDevice;
use crate::error::CoreError;
use crate::integration::Integration;
use crate::model::{ConfigEntry, DeviceInfo};

// ── Send options ─────────────────────────────────────────────────────

/// Service data accepted by [`RemoteEntity::send_command`].
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Appliance to address, by its name on the remote. Required.
    pub device: Option<String>,
    /// Emitter to fire from; defaults to the remote's only emitter.
    pub emitter: Option<String>,
    /// How many times to send the whole command list.
    pub num_repeats: u32,
    /// Pause between two consecutive commands.
    pub delay: Duration,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            device: None,
            emitter: None,
            num_repeats: 1,
            delay: Duration::ZERO,
        }
    }
}

impl SendOptions {
    pub fn to_device(device: impl Into<String>) -> Self {
        Self {
            device: Some(device.into()),
            ..Self::default()
        }
    }

    pub fn with_emitter(mut self, emitter: impl Into<String>) -> Self {
        self.emitter = Some(emitter.into());
        self
    }

    pub fn with_repeats(mut self, num_repeats: u32) -> Self {
        self.num_repeats = num_repeats;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// What happened to one dispatched command.
#[derive(Debug)]
pub struct CommandOutcome {
    pub command: String,
    pub error: Option<ApiError>,
}

impl CommandOutcome {
    pub fn is_sent(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-command outcome of one `send_command` call, in send order.
#[derive(Debug, Default)]
pub struct SendReport {
    pub outcomes: Vec<CommandOutcome>,
}

impl SendReport {
    pub fn all_sent(&self) -> bool {
        self.outcomes.iter().all(CommandOutcome::is_sent)
    }

    /// Commands that went out, in send order.
    pub fn sent(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_sent())
            .map(|o| o.command.as_str())
            .collect()
    }

    pub fn failed(&self) -> impl Iterator<Item = &CommandOutcome> {
        self.outcomes.iter().filter(|o| !o.is_sent())
    }
}

// ── Entity ───────────────────────────────────────────────────────────

pub struct RemoteEntity {
    device: Arc<RemoteDevice>,
    api: Arc<dyn RemoteApi>,
    group: DeviceGroup,
    available: bool,
    current_activity: Option<String>,
    activity_list: Option<Vec<String>>,
}

/// Create the entry's entities, each updated once before it is handed back.
pub async fn setup_entry(
    integration: &Integration,
    entry: &ConfigEntry,
) -> Result<Vec<RemoteEntity>, CoreError> {
    let device = integration
        .device(&entry.entry_id)
        .ok_or_else(|| CoreError::NotSetUp {
            entry_id: entry.entry_id.clone(),
        })?;

    let mut entity = RemoteEntity::new(device);
    entity.update().await;
    Ok(vec![entity])
}

impl RemoteEntity {
    pub fn new(device: Arc<RemoteDevice>) -> Self {
        let api = device.api();
        Self {
            group: DeviceGroup::single(Arc::clone(&api)),
            api,
            device,
            available: true,
            current_activity: None,
            activity_list: None,
        }
    }

    /// Same as the owning device's unique id: the endpoint.
    pub fn unique_id(&self) -> &str {
        self.device.unique_id()
    }

    pub fn name(&self) -> &str {
        self.device.title()
    }

    pub fn available(&self) -> bool {
        self.available
    }

    /// Remotes have no power state; always on.
    pub fn is_on(&self) -> bool {
        true
    }

    pub fn current_activity(&self) -> Option<&str> {
        self.current_activity.as_deref()
    }

    /// Activity names from the last successful poll; `None` before one.
    pub fn activity_list(&self) -> Option<&[String]> {
        self.activity_list.as_deref()
    }

    pub async fn device_info(&self) -> DeviceInfo {
        self.device.device_info().await
    }

    /// Poll the remote's activities.
    pub async fn update(&mut self) {
        match self.api.activities().await {
            Ok(activities) => {
                self.activity_list = Some(
                    activities
                        .iter()
                        .map(|a| a.display_name().to_owned())
                        .collect(),
                );
                self.current_activity = activities
                    .iter()
                    .find(|a| a.is_on())
                    .map(|a| a.display_name().to_owned());
                self.available = true;
            }
            Err(e) => {
                error!(
                    remote = self.name(),
                    error = %e,
                    "error retrieving activities"
                );
                self.available = false;
            }
        }
    }

    /// Send each command to the `device` in `options`, in order.
    ///
    /// Fails only when no device is given. Every other problem is logged
    /// against its command and the remaining commands still go out.
    pub async fn send_command(
        &self,
        commands: &[String],
        options: &SendOptions,
    ) -> Result<SendReport, CoreError> {
        let Some(device) = options
            .device
            .as_deref()
            .filter(|d| !d.trim().is_empty())
        else {
            return Err(CoreError::MissingTarget);
        };
        let mut target = IrTarget::new(device);
        if let Some(emitter) = &options.emitter {
            target = target.with_emitter(emitter.as_str());
        }

        let mut report = SendReport::default();
        let mut first = true;
        for _ in 0..options.num_repeats.max(1) {
            for command in commands {
                if !first && !options.delay.is_zero() {
                    tokio::time::sleep(options.delay).await;
                }
                first = false;

                let error = match self.group.send_ir_command(&target, command, None).await {
                    Ok(()) => {
                        debug!(command = %command, appliance = device, "IR command sent");
                        None
                    }
                    Err(e) => {
                        self.log_failure(command, device, &e);
                        Some(e)
                    }
                };
                report.outcomes.push(CommandOutcome {
                    command: command.clone(),
                    error,
                });
            }
        }
        Ok(report)
    }

    fn log_failure(&self, command: &str, appliance: &str, err: &ApiError) {
        let remote = self.name();
        match err {
            ApiError::CodeSetNotFound { .. } => {
                warn!(command, appliance, remote, "target not found on remote");
            }
            ApiError::NoDefaultEmitter { .. } | ApiError::EmitterNotFound { .. } => {
                warn!(command, appliance, remote, error = %err, "unable to determine IR emitter");
            }
            ApiError::Connection { .. }
            | ApiError::Timeout { .. }
            | ApiError::InvalidUrl(_)
            | ApiError::Authentication { .. }
            | ApiError::Api { .. }
            | ApiError::Deserialization { .. } => {
                warn!(command, appliance, remote, error = %err, "error sending IR command");
            }
        }
    }
}

impl std::fmt::Debug for RemoteEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEntity")
            .field("unique_id", &self.unique_id())
            .field("available", &self.available)
            .field("current_activity", &self.current_activity)
            .field("activity_list", &self.activity_list)
            .finish_non_exhaustive()
    }
}
