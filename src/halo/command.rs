use crate::address::parse_address;
use crate::prelude::Result;
use crate::signature::RawSignature;
use crate::Error;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Commands understood by the tag, serialized the way the tag expects them:
/// `{"name":"get_pkeys"}` and `{"name":"sign","keyNo":1,"digest":"…"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum HaloCommand {
    GetPkeys,
    Sign {
        #[serde(rename = "keyNo")]
        key_no: u8,
        digest: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PkeysResponse {
    /// Addresses keyed by slot number ("1", "2", ...)
    pub ether_addresses: HashMap<String, String>,
}

impl PkeysResponse {
    pub fn address_at(&self, key_no: u8) -> Result<Address> {
        let address = self
            .ether_addresses
            .get(&key_no.to_string())
            .ok_or_else(|| Error::SigningFailed(format!("tag has no address in key slot {key_no}")))?;
        parse_address(address)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TagSignature {
    pub raw: RawSignature,
    /// `0x`-prefixed 65-byte signature, display only
    pub ether: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignResponse {
    pub signature: TagSignature,
}

/// Reads a typed response out of the tag's JSON payload. Tag payloads carry
/// extra fields (public keys, input echo) which are ignored.
pub fn parse_response<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| Error::SigningFailed(format!("malformed tag response: {e}")))
}
