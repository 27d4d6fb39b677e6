use crate::address::parse_address;
use crate::config::CHAIN_ID;
use crate::prelude::Result;
use crate::rpc::NodeRpc;
use crate::unsigned::contract::{
    store_number_call_data, store_number_contract, GAS_LIMIT, MAX_FEE_PER_GAS,
    MAX_PRIORITY_FEE_PER_GAS, STORED_NUMBER,
};
use crate::unsigned::UnsignedTransaction;
use ethers::types::{Address, U256};
use log::{debug, info};

/// The demo transaction for a given nonce: a `storeNumber(12321)` call with
/// fixed gas parameters and zero value.
pub fn store_number_transaction(nonce: U256) -> UnsignedTransaction {
    UnsignedTransaction {
        recipient: store_number_contract(),
        value: U256::zero(),
        gas_limit: U256::from(GAS_LIMIT),
        max_fee_per_gas: U256::from(MAX_FEE_PER_GAS),
        max_priority_fee_per_gas: U256::from(MAX_PRIORITY_FEE_PER_GAS),
        data: store_number_call_data(U256::from(STORED_NUMBER)),
        nonce,
        chain_id: CHAIN_ID,
    }
}

#[derive(Debug, Clone)]
pub struct UnsignedTransactionBuilder<R> {
    rpc: R,
}

impl<R: NodeRpc> UnsignedTransactionBuilder<R> {
    pub fn new(rpc: R) -> Self {
        UnsignedTransactionBuilder { rpc }
    }

    /// Builds the demo transaction for `sender`. The sender is only used to
    /// look up its nonce; a failed lookup is an error, never nonce zero.
    pub async fn build(&self, sender: Address) -> Result<UnsignedTransaction> {
        let nonce = self.rpc.transaction_count(sender).await?;
        debug!("Nonce for {sender:?}: {nonce}");
        let tx = store_number_transaction(nonce);
        info!("Built unsigned transaction for {sender:?} with nonce {nonce}");
        Ok(tx)
    }

    pub async fn build_for(&self, sender: &str) -> Result<UnsignedTransaction> {
        let sender = parse_address(sender)?;
        self.build(sender).await
    }
}
