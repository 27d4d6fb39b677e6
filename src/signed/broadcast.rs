use crate::prelude::Result;
use crate::rpc::NodeRpc;
use crate::signature::SignatureComponents;
use crate::signed::assembler::SignedTransaction;
use crate::unsigned::UnsignedTransaction;
use ethers::types::H256;
use log::info;

/// Submits signed transactions to the node. One attempt per call.
#[derive(Debug, Clone)]
pub struct Broadcaster<R> {
    rpc: R,
}

impl<R: NodeRpc> Broadcaster<R> {
    pub fn new(rpc: R) -> Self {
        Broadcaster { rpc }
    }

    /// Returns the node-assigned transaction hash. A node-side rejection
    /// comes back as [`Error::BroadcastRejected`](crate::Error::BroadcastRejected);
    /// resubmitting needs a freshly built transaction.
    pub async fn broadcast(
        &self,
        transaction: &UnsignedTransaction,
        signature: &SignatureComponents,
    ) -> Result<H256> {
        let signed = SignedTransaction::new(transaction.clone(), *signature);
        let raw = signed.encode();
        info!("SENDING SIGNED TX {raw}");
        self.rpc.send_raw_transaction(raw).await
    }
}
