use std::sync::Arc;

use remo_client::SignalDirectory;
use shared::{
    domain::{find_appliance, Signal},
    error::{ConfigError, ControllerError},
};
use tokio::sync::RwLock;
use tracing::info;

/// Cycles through a fixed sequence of signals on one appliance.
///
/// The only mutable state is the index of the last signal sent. It moves
/// only after the remote side confirms a transmission, so a failed request
/// never changes what fires next.
pub struct SelectionController {
    appliance: String,
    signal_names: Vec<String>,
    directory: Arc<dyn SignalDirectory>,
    current: RwLock<usize>,
}

impl SelectionController {
    pub fn new(
        directory: Arc<dyn SignalDirectory>,
        appliance: impl Into<String>,
        signal_names: Vec<String>,
    ) -> Result<Self, ConfigError> {
        if signal_names.is_empty() {
            return Err(ConfigError::EmptySignalList);
        }
        Ok(Self {
            appliance: appliance.into(),
            signal_names,
            directory,
            current: RwLock::new(0),
        })
    }

    pub fn appliance(&self) -> &str {
        &self.appliance
    }

    pub fn signal_names(&self) -> &[String] {
        &self.signal_names
    }

    pub async fn current_index(&self) -> usize {
        *self.current.read().await
    }

    /// Sends the named signal and makes it the current selection.
    ///
    /// Names outside the configured sequence are rejected before any remote
    /// call is made.
    pub async fn activate_by_name(&self, name: &str) -> Result<(), ControllerError> {
        if name.is_empty() {
            return Err(ControllerError::EmptySignalName);
        }
        let position = self
            .signal_names
            .iter()
            .position(|candidate| candidate == name)
            .ok_or_else(|| ControllerError::UnknownSignal(name.to_string()))?;

        self.transmit(position).await?;

        *self.current.write().await = position;
        info!(signal = %name, index = position, "signal activated by name");
        Ok(())
    }

    /// Sends the signal after the current one, wrapping at the end.
    pub async fn activate_next(&self) -> Result<(), ControllerError> {
        let position = {
            let current = self.current.read().await;
            (*current + 1) % self.signal_names.len()
        };

        self.transmit(position).await?;

        // Advance from whatever is stored now so a racing request still counts.
        let index = {
            let mut current = self.current.write().await;
            *current = (*current + 1) % self.signal_names.len();
            *current
        };
        info!(
            signal = %self.signal_names[position],
            index,
            "signal activated in sequence"
        );
        Ok(())
    }

    async fn transmit(&self, position: usize) -> Result<(), ControllerError> {
        let signal = self.resolve_signal(&self.signal_names[position]).await?;
        self.directory
            .send_signal(&signal)
            .await
            .map_err(|cause| ControllerError::Transmission {
                signal: signal.name.clone(),
                cause,
            })
    }

    /// Looks the signal up again on every call; nothing is cached.
    async fn resolve_signal(&self, name: &str) -> Result<Signal, ControllerError> {
        let appliances = self
            .directory
            .list_appliances()
            .await
            .map_err(ControllerError::Directory)?;
        let appliance = find_appliance(&appliances, &self.appliance)
            .ok_or_else(|| ControllerError::ApplianceNotFound(self.appliance.clone()))?;
        appliance
            .find_signal(name)
            .cloned()
            .ok_or_else(|| ControllerError::SignalNotFound {
                appliance: self.appliance.clone(),
                signal: name.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
