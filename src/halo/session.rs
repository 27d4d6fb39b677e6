use crate::halo::command::{parse_response, HaloCommand, PkeysResponse, SignResponse};
use crate::halo::executor::TagExecutor;
use crate::halo::relay::PairingRelay;
use crate::halo::status::{SessionStatus, StatusSink};
use crate::prelude::Result;
use crate::signature::SignatureComponents;
use crate::unsigned::Digest;
use crate::Error;
use ethers::types::Address;
use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// Cancels an in-flight session call. Once fired, the call resolves with
/// [`Error::SigningCancelled`] and whatever the tag or relay eventually
/// returns is dropped.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        CancelToken {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                // sender gone without cancelling: never fires
                std::future::pending::<()>().await;
            }
        }
    }
}

/// The tag is attached to this device.
#[derive(Debug, Clone)]
pub struct LocalSession<T> {
    tag: Arc<T>,
}

impl<T: TagExecutor> LocalSession<T> {
    pub fn new(tag: Arc<T>) -> Self {
        LocalSession { tag }
    }

    async fn execute(&self, command: &HaloCommand, status: &StatusSink) -> Result<Value> {
        self.tag.exec(command, status).await
    }
}

/// The tag is tapped against a phone paired through the gateway. Every
/// command gets its own pairing.
#[derive(Debug, Clone)]
pub struct RelaySession {
    gateway_url: String,
}

impl RelaySession {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        RelaySession {
            gateway_url: gateway_url.into(),
        }
    }

    async fn execute(&self, command: &HaloCommand, status: &StatusSink) -> Result<Value> {
        let mut relay = PairingRelay::new(self.gateway_url.clone());
        let pair_info = relay.start_pairing().await?;
        let _ = status.send(SessionStatus::PairingReady {
            exec_url: pair_info.exec_url,
        });

        relay.wait_connected().await?;
        let _ = status.send(SessionStatus::PeerConnected);

        relay.exec_command(command).await
    }
}

/// Where the tag is, chosen once per attempt.
#[derive(Debug, Clone)]
pub enum SigningSession<T> {
    Local(LocalSession<T>),
    Relay(RelaySession),
}

impl<T: TagExecutor> SigningSession<T> {
    async fn dispatch(&self, command: &HaloCommand, status: &StatusSink) -> Result<Value> {
        match self {
            SigningSession::Local(session) => session.execute(command, status).await,
            SigningSession::Relay(session) => session.execute(command, status).await,
        }
    }

    /// Runs one tag command, racing it against `cancel`.
    pub async fn execute(
        &self,
        command: &HaloCommand,
        status: &StatusSink,
        cancel: &CancelToken,
    ) -> Result<Value> {
        if cancel.is_cancelled() {
            return Err(Error::SigningCancelled);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Tag command cancelled, discarding any late result");
                Err(Error::SigningCancelled)
            }
            result = self.dispatch(command, status) => result,
        }
    }

    /// Reads the address held in `key_no`.
    pub async fn retrieve_address(
        &self,
        key_no: u8,
        status: &StatusSink,
        cancel: &CancelToken,
    ) -> Result<Address> {
        let payload = self.execute(&HaloCommand::GetPkeys, status, cancel).await?;
        let response: PkeysResponse = parse_response(payload)?;
        let address = response.address_at(key_no)?;
        info!("Tag address in slot {key_no}: {address:?}");
        Ok(address)
    }

    /// Has the tag sign `digest` with the key in `key_no`.
    pub async fn sign(
        &self,
        digest: &Digest,
        key_no: u8,
        status: &StatusSink,
        cancel: &CancelToken,
    ) -> Result<SignatureComponents> {
        let command = HaloCommand::Sign {
            key_no,
            digest: digest.to_hex(),
        };
        let payload = self.execute(&command, status, cancel).await?;
        let response: SignResponse = parse_response(payload)?;
        debug!("Tag signature: {}", response.signature.ether);
        SignatureComponents::from_raw(&response.signature.raw)
    }
}
