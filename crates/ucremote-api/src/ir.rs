// IR command dispatch
//
// Resolves a human target (remote name + optional emitter name) into the
// code-set id and emitter device id the send endpoint needs.

use tracing::debug;

use crate::client::RemoteClient;
use crate::error::Error;
use crate::models::{Emitter, IrSend, IrTarget};

impl RemoteClient {
    /// Find the code-set id of the remote whose name (in any locale)
    /// equals `device`.
    pub async fn resolve_codeset(&self, device: &str) -> Result<String, Error> {
        let remotes = self.list_remotes().await?;
        let remote = remotes
            .iter()
            .find(|r| r.name.matches(device) || r.entity_id == device)
            .ok_or_else(|| Error::CodeSetNotFound {
                target: device.to_owned(),
            })?;

        let codeset = self
            .get_remote_codeset(&remote.entity_id)
            .await?
            .ok_or_else(|| Error::CodeSetNotFound {
                target: device.to_owned(),
            })?;

        debug!(device, codeset = %codeset.id, "resolved IR code-set");
        Ok(codeset.id)
    }

    /// Pick the emitter named `name`, or the only emitter if none is named.
    pub async fn resolve_emitter(&self, name: Option<&str>) -> Result<Emitter, Error> {
        let emitters = self.list_emitters().await?;
        select_emitter(emitters, name)
    }

    /// Resolve `target` and fire `command` from the chosen emitter.
    pub async fn send_ir_command(
        &self,
        target: &IrTarget,
        command: &str,
        repeat: Option<u32>,
    ) -> Result<(), Error> {
        let codeset_id = self.resolve_codeset(&target.device).await?;
        let emitter = self.resolve_emitter(target.emitter.as_deref()).await?;

        debug!(
            device = %target.device,
            emitter = %emitter.name,
            command,
            "sending IR command"
        );
        self.send_ir(
            &emitter.device_id,
            &IrSend {
                codeset_id: &codeset_id,
                cmd_id: command,
                repeat,
            },
        )
        .await
    }
}

fn select_emitter(emitters: Vec<Emitter>, name: Option<&str>) -> Result<Emitter, Error> {
    match name {
        Some(wanted) => emitters
            .into_iter()
            .find(|e| e.name == wanted || e.device_id == wanted)
            .ok_or_else(|| Error::EmitterNotFound {
                name: wanted.to_owned(),
            }),
        None => {
            let available = emitters.len();
            let mut iter = emitters.into_iter();
            match (iter.next(), iter.next()) {
                (Some(only), None) => Ok(only),
                _ => Err(Error::NoDefaultEmitter { available }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter(id: &str, name: &str) -> Emitter {
        Emitter {
            device_id: id.into(),
            name: name.into(),
        }
    }

    #[test]
    fn single_emitter_is_the_default() {
        let picked = select_emitter(vec![emitter("e1", "Dock")], None).expect("default");
        assert_eq!(picked.device_id, "e1");
    }

    #[test]
    fn several_emitters_need_a_name() {
        let result = select_emitter(vec![emitter("e1", "Dock"), emitter("e2", "Blaster")], None);
        assert!(matches!(result, Err(Error::NoDefaultEmitter { available: 2 })));

        let result = select_emitter(Vec::new(), None);
        assert!(matches!(result, Err(Error::NoDefaultEmitter { available: 0 })));
    }

    #[test]
    fn named_emitter_must_exist() {
        let emitters = vec![emitter("e1", "Dock"), emitter("e2", "Blaster")];
        let picked = select_emitter(emitters.clone(), Some("Blaster")).expect("named");
        assert_eq!(picked.device_id, "e2");

        let result = select_emitter(emitters, Some("Kitchen"));
        assert!(matches!(result, Err(Error::EmitterNotFound { ref name }) if name == "Kitchen"));
    }
}
