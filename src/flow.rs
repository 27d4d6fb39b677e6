//! The three user-triggered stages of the demo: get address, sign, send.
//!
//! State lives in a caller-owned [`DemoState`] passed by `&mut` into each
//! stage. Each field has one writer: `get_address` writes the address, the
//! signing stage writes transaction and signature, sending writes the hash.
//! `status_text` is shared display output.

use crate::config::Config;
use crate::halo::{
    CancelToken, LocalSession, RelaySession, SigningSession, StatusSink, TagExecutor,
};
use crate::prelude::Result;
use crate::rpc::NodeRpc;
use crate::signature::SignatureComponents;
use crate::signed::Broadcaster;
use crate::unsigned::{compute_digest, UnsignedTransaction, UnsignedTransactionBuilder};
use crate::Error;
use ethers::types::{Address, H256};
use log::{error, info, warn};
use std::sync::Arc;

pub const SCAN_SUCCESS_TEXT: &str = "Scan successful! Continue to Profile!";

/// Where the tag is read: on this device, or on a phone paired via QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceMode {
    Mobile,
    #[default]
    Desktop,
}

#[derive(Debug, Clone, Default)]
pub struct DemoState {
    pub address: Option<Address>,
    pub transaction: Option<UnsignedTransaction>,
    pub signature: Option<SignatureComponents>,
    pub signature_display: String,
    pub transaction_hash: Option<H256>,
    pub status_text: String,
}

impl DemoState {
    fn clear_signing(&mut self) {
        self.transaction = None;
        self.signature = None;
        self.signature_display.clear();
        self.transaction_hash = None;
    }
}

fn scan_failure_text(e: &Error) -> String {
    format!("Scanning failed, click on the button again to retry. Details: {e}")
}

#[derive(Debug)]
pub struct Demo<R, T> {
    config: Config,
    mode: DeviceMode,
    tag: Option<Arc<T>>,
    builder: UnsignedTransactionBuilder<R>,
    broadcaster: Broadcaster<R>,
}

impl<R: NodeRpc + Clone, T: TagExecutor> Demo<R, T> {
    /// `tag` is only needed in [`DeviceMode::Mobile`].
    pub fn new(config: Config, rpc: R, mode: DeviceMode, tag: Option<Arc<T>>) -> Self {
        Demo {
            config,
            mode,
            tag,
            builder: UnsignedTransactionBuilder::new(rpc.clone()),
            broadcaster: Broadcaster::new(rpc),
        }
    }

    pub fn mode(&self) -> DeviceMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DeviceMode) {
        self.mode = mode;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A fresh session for one attempt.
    fn session(&self) -> Result<SigningSession<T>> {
        match self.mode {
            DeviceMode::Desktop => Ok(SigningSession::Relay(RelaySession::new(
                self.config.gateway_url.clone(),
            ))),
            DeviceMode::Mobile => {
                let tag = self.tag.clone().ok_or_else(|| {
                    Error::Config("mobile mode needs a tag reader on this device".to_string())
                })?;
                Ok(SigningSession::Local(LocalSession::new(tag)))
            }
        }
    }

    pub async fn get_address(
        &self,
        state: &mut DemoState,
        status: &StatusSink,
        cancel: &CancelToken,
    ) -> Result<Address> {
        info!("Getting address in {:?} mode", self.mode);
        let result = match self.session() {
            Ok(session) => {
                session
                    .retrieve_address(self.config.key_no, status, cancel)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(address) => {
                state.clear_signing();
                state.address = Some(address);
                state.status_text = SCAN_SUCCESS_TEXT.to_string();
                Ok(address)
            }
            Err(e) => {
                warn!("Address retrieval failed: {e}");
                state.status_text = scan_failure_text(&e);
                Err(e)
            }
        }
    }

    pub async fn sign_transaction(
        &self,
        state: &mut DemoState,
        status: &StatusSink,
        cancel: &CancelToken,
    ) -> Result<SignatureComponents> {
        let address = match state.address {
            Some(address) => address,
            None => {
                state.status_text = Error::MissingAddress.to_string();
                return Err(Error::MissingAddress);
            }
        };
        info!("Signing transaction in {:?} mode for {address:?}", self.mode);
        state.clear_signing();

        match self.build_and_sign(address, status, cancel).await {
            Ok((transaction, signature)) => {
                state.signature_display = signature.to_ether_string();
                state.transaction = Some(transaction);
                state.signature = Some(signature);
                state.status_text.clear();
                Ok(signature)
            }
            Err(e) => {
                warn!("Signing failed: {e}");
                state.status_text = scan_failure_text(&e);
                Err(e)
            }
        }
    }

    async fn build_and_sign(
        &self,
        address: Address,
        status: &StatusSink,
        cancel: &CancelToken,
    ) -> Result<(UnsignedTransaction, SignatureComponents)> {
        let transaction = self.builder.build(address).await?;
        let digest = compute_digest(&transaction);
        info!("Digest to sign: {digest}");

        let session = self.session()?;
        let signature = session
            .sign(&digest, self.config.key_no, status, cancel)
            .await?;

        let signer = signature.recover(&digest)?;
        if signer != address {
            return Err(Error::SigningFailed(format!(
                "tag signed with {signer:?}, expected {address:?}"
            )));
        }
        Ok((transaction, signature))
    }

    pub async fn send_transaction(&self, state: &mut DemoState) -> Result<H256> {
        let (transaction, signature) = match (&state.transaction, &state.signature) {
            (Some(transaction), Some(signature)) => (transaction, signature),
            _ => {
                state.status_text = Error::MissingSignedTransaction.to_string();
                return Err(Error::MissingSignedTransaction);
            }
        };

        // the signature must still cover exactly this transaction and address
        let signer = signature.recover(&compute_digest(transaction)).ok();
        if signer.is_none() || signer != state.address {
            let e = Error::SigningFailed(format!(
                "signature recovers to {signer:?}, not the current address"
            ));
            error!("Refusing to send: {e}");
            state.status_text = format!("Error sending transaction: {e}");
            return Err(e);
        }

        match self.broadcaster.broadcast(transaction, signature).await {
            Ok(hash) => {
                state.transaction_hash = Some(hash);
                state.status_text = self.config.explorer_url(&format!("{hash:#x}"));
                Ok(hash)
            }
            Err(e) => {
                error!("Error sending transaction: {e}");
                state.status_text = format!("Error sending transaction: {e}");
                Err(e)
            }
        }
    }
}
