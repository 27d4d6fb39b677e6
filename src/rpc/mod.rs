//! Node JSON-RPC boundary: nonce lookup and raw transaction broadcast.

mod client;
#[cfg(test)]
pub(crate) mod mock;

pub use client::NodeClient;

use crate::prelude::Result;
use ethers::types::{Address, Bytes, H256, U256};
use std::future::Future;

pub trait NodeRpc: Send + Sync {
    /// `eth_getTransactionCount` at the latest block.
    fn transaction_count(&self, address: Address) -> impl Future<Output = Result<U256>> + Send;

    /// `eth_sendRawTransaction`. A node-side rejection is
    /// [`Error::BroadcastRejected`](crate::Error::BroadcastRejected).
    fn send_raw_transaction(&self, raw: Bytes) -> impl Future<Output = Result<H256>> + Send;
}
