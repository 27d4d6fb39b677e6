use crate::halo::command::{HaloCommand, TagSignature};
use crate::halo::executor::TagExecutor;
use crate::halo::status::{SessionStatus, StatusSink};
use crate::prelude::Result;
use crate::signature::RawSignature;
use crate::Error;
use ethers::core::rand::thread_rng;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256, U256};
use ethers::utils::to_checksum;
use log::debug;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;

fn scalar_hex(value: U256) -> String {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    hex::encode(bytes)
}

/// A tag emulated in memory, one secp256k1 key per slot (slot 1 is the
/// first key). Answers with the same payload shapes as a physical tag.
#[derive(Debug, Clone)]
pub struct SoftTag {
    keys: Vec<LocalWallet>,
}

impl SoftTag {
    pub fn new(keys: Vec<LocalWallet>) -> Self {
        SoftTag { keys }
    }

    pub fn random(slots: usize) -> Self {
        let mut rng = thread_rng();
        SoftTag {
            keys: (0..slots).map(|_| LocalWallet::new(&mut rng)).collect(),
        }
    }

    pub fn address(&self, key_no: u8) -> Option<Address> {
        self.key(key_no).map(|wallet| wallet.address())
    }

    fn key(&self, key_no: u8) -> Option<&LocalWallet> {
        (key_no as usize)
            .checked_sub(1)
            .and_then(|index| self.keys.get(index))
    }

    fn respond(&self, command: &HaloCommand) -> Result<Value> {
        match command {
            HaloCommand::GetPkeys => {
                let ether_addresses: HashMap<String, String> = self
                    .keys
                    .iter()
                    .enumerate()
                    .map(|(index, wallet)| {
                        ((index + 1).to_string(), to_checksum(&wallet.address(), None))
                    })
                    .collect();
                Ok(json!({ "etherAddresses": ether_addresses }))
            }
            HaloCommand::Sign { key_no, digest } => {
                let wallet = self
                    .key(*key_no)
                    .ok_or_else(|| Error::SigningFailed(format!("no key in slot {key_no}")))?;
                let bytes = hex::decode(digest)
                    .map_err(|e| Error::SigningFailed(format!("digest is not hex: {e}")))?;
                if bytes.len() != 32 {
                    return Err(Error::SigningFailed(format!(
                        "digest must be 32 bytes, got {}",
                        bytes.len()
                    )));
                }
                let signature = wallet
                    .sign_hash(H256::from_slice(&bytes))
                    .map_err(|e| Error::SigningFailed(e.to_string()))?;
                let tag_signature = TagSignature {
                    raw: RawSignature {
                        v: signature.v,
                        r: scalar_hex(signature.r),
                        s: scalar_hex(signature.s),
                    },
                    ether: format!("0x{signature}"),
                };
                Ok(json!({
                    "input": { "keyNo": key_no, "digest": digest },
                    "signature": tag_signature,
                }))
            }
        }
    }
}

impl TagExecutor for SoftTag {
    fn exec(
        &self,
        command: &HaloCommand,
        status: &StatusSink,
    ) -> impl Future<Output = Result<Value>> + Send {
        let _ = status.send(SessionStatus::from_cause("init"));
        debug!("Soft tag executing {command:?}");
        let response = self.respond(command);
        if response.is_ok() {
            let _ = status.send(SessionStatus::from_cause("scanned"));
        }
        async move { response }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::halo::command::{parse_response, PkeysResponse, SignResponse};
    use crate::signature::SignatureComponents;
    use crate::unsigned::Digest;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_get_pkeys_lists_every_slot() {
        let tag = SoftTag::random(3);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let payload = tag.exec(&HaloCommand::GetPkeys, &tx).await.unwrap();
        let response: PkeysResponse = parse_response(payload).unwrap();

        for slot in 1..=3u8 {
            assert_eq!(response.address_at(slot).unwrap(), tag.address(slot).unwrap());
        }
        assert_eq!(rx.recv().await, Some(SessionStatus::AwaitingTap));
        assert_eq!(rx.recv().await, Some(SessionStatus::TagScanned));
    }

    #[tokio::test]
    async fn test_sign_produces_recoverable_signature() {
        let tag = SoftTag::random(2);
        let (tx, _rx) = mpsc::unbounded_channel();
        let digest = Digest::from(H256::repeat_byte(0x07));

        let payload = tag
            .exec(
                &HaloCommand::Sign {
                    key_no: 2,
                    digest: digest.to_hex(),
                },
                &tx,
            )
            .await
            .unwrap();
        let response: SignResponse = parse_response(payload).unwrap();
        let signature = SignatureComponents::from_raw(&response.signature.raw).unwrap();

        assert_eq!(signature.recover(&digest).unwrap(), tag.address(2).unwrap());
        assert_eq!(signature.to_ether_string(), response.signature.ether);
    }

    #[tokio::test]
    async fn test_sign_with_missing_slot_fails() {
        let tag = SoftTag::random(1);
        let (tx, _rx) = mpsc::unbounded_channel();

        let result = tag
            .exec(
                &HaloCommand::Sign {
                    key_no: 0,
                    digest: "00".repeat(32),
                },
                &tx,
            )
            .await;
        assert!(matches!(result, Err(Error::SigningFailed(_))));
    }
}
