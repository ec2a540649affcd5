use std::sync::Arc;

use tracing::trace;

use crate::error::Error;
use crate::models::IrTarget;
use crate::remote_api::RemoteApi;

/// A set of remotes addressed as one IR sender.
///
/// A command goes to the first member that knows the target's code-set;
/// members answering [`Error::CodeSetNotFound`] are skipped. Any other
/// error stops the search and is returned as is.
#[derive(Clone)]
pub struct DeviceGroup {
    members: Vec<Arc<dyn RemoteApi>>,
}

impl DeviceGroup {
    pub fn new(members: Vec<Arc<dyn RemoteApi>>) -> Self {
        Self { members }
    }

    pub fn single(member: Arc<dyn RemoteApi>) -> Self {
        Self::new(vec![member])
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub async fn send_ir_command(
        &self,
        target: &IrTarget,
        command: &str,
        repeat: Option<u32>,
    ) -> Result<(), Error> {
        for member in &self.members {
            match member.send_ir_command(target, command, repeat).await {
                Err(Error::CodeSetNotFound { .. }) => {
                    trace!(endpoint = %member.endpoint(), device = %target.device, "code-set not on member");
                }
                other => return other,
            }
        }
        Err(Error::CodeSetNotFound {
            target: target.device.clone(),
        })
    }
}

impl std::fmt::Debug for DeviceGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.members.iter().map(|m| m.endpoint().as_str()))
            .finish()
    }
}
