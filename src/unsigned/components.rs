use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, Eip1559TransactionRequest, U256};

/// EIP-2718 type byte of a fee-market (EIP-1559) transaction.
pub const FEE_MARKET_TX_TYPE: u8 = 0x02;

/// A type-2 transaction waiting for a signature.
///
/// Only the builder and the signed-transaction decoder create one; outside
/// the crate it is read-only, so a signature computed over it stays bound to
/// these exact values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub(crate) recipient: Address,
    pub(crate) value: U256,
    pub(crate) gas_limit: U256,
    pub(crate) max_fee_per_gas: U256,
    pub(crate) max_priority_fee_per_gas: U256,
    pub(crate) data: Bytes,
    pub(crate) nonce: U256,
    pub(crate) chain_id: u64,
}

impl UnsignedTransaction {
    pub fn tx_type(&self) -> u8 {
        FEE_MARKET_TX_TYPE
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn gas_limit(&self) -> U256 {
        self.gas_limit
    }

    pub fn max_fee_per_gas(&self) -> U256 {
        self.max_fee_per_gas
    }

    pub fn max_priority_fee_per_gas(&self) -> U256 {
        self.max_priority_fee_per_gas
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn nonce(&self) -> U256 {
        self.nonce
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub(crate) fn to_typed_transaction(&self) -> TypedTransaction {
        let request = Eip1559TransactionRequest::new()
            .to(self.recipient)
            .value(self.value)
            .gas(self.gas_limit)
            .max_fee_per_gas(self.max_fee_per_gas)
            .max_priority_fee_per_gas(self.max_priority_fee_per_gas)
            .data(self.data.clone())
            .nonce(self.nonce)
            .chain_id(self.chain_id);
        TypedTransaction::Eip1559(request)
    }
}
