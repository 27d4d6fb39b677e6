use crate::prelude::Result;
use crate::signature::SignatureComponents;
use crate::unsigned::{UnsignedTransaction, FEE_MARKET_TX_TYPE};
use crate::Error;
use ethers::types::{Address, Bytes, H256, U256};
use ethers::utils::keccak256;
use ethers::utils::rlp::{DecoderError, Rlp};

/// Number of list items in a signed type-2 payload: nine transaction fields
/// plus y-parity, r, s.
const SIGNED_FIELD_COUNT: usize = 12;

/// A transaction together with the signature computed over its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: UnsignedTransaction,
    pub signature: SignatureComponents,
}

impl SignedTransaction {
    pub fn new(transaction: UnsignedTransaction, signature: SignatureComponents) -> Self {
        SignedTransaction {
            transaction,
            signature,
        }
    }

    /// `0x02 || rlp([..fields, y_parity, r, s])`
    pub fn encode(&self) -> Bytes {
        encode_signed(&self.transaction, &self.signature)
    }

    /// The hash the network will assign: keccak-256 of the signed encoding.
    pub fn hash(&self) -> H256 {
        H256::from(keccak256(self.encode()))
    }
}

pub fn encode_signed(tx: &UnsignedTransaction, signature: &SignatureComponents) -> Bytes {
    tx.to_typed_transaction()
        .rlp_signed(&signature.to_envelope_signature())
}

fn decode_err(e: DecoderError) -> Error {
    Error::InvalidSignature(format!("undecodable signed transaction: {e}"))
}

/// Parses a signed type-2 transaction back into its parts.
pub fn decode_signed(raw: &[u8]) -> Result<SignedTransaction> {
    let (tx_type, body) = raw
        .split_first()
        .ok_or_else(|| Error::InvalidSignature("empty transaction".to_string()))?;
    if *tx_type != FEE_MARKET_TX_TYPE {
        return Err(Error::InvalidSignature(format!(
            "expected a type {FEE_MARKET_TX_TYPE} transaction, got type {tx_type}"
        )));
    }

    let rlp = Rlp::new(body);
    let count = rlp.item_count().map_err(decode_err)?;
    if count != SIGNED_FIELD_COUNT {
        return Err(Error::InvalidSignature(format!(
            "expected {SIGNED_FIELD_COUNT} fields, got {count}"
        )));
    }
    if rlp.at(8).map_err(decode_err)?.item_count().map_err(decode_err)? != 0 {
        return Err(Error::InvalidSignature(
            "access lists are not produced by this signer".to_string(),
        ));
    }

    let transaction = UnsignedTransaction {
        chain_id: rlp.val_at(0).map_err(decode_err)?,
        nonce: rlp.val_at(1).map_err(decode_err)?,
        max_priority_fee_per_gas: rlp.val_at(2).map_err(decode_err)?,
        max_fee_per_gas: rlp.val_at(3).map_err(decode_err)?,
        gas_limit: rlp.val_at(4).map_err(decode_err)?,
        recipient: rlp.val_at::<Address>(5).map_err(decode_err)?,
        value: rlp.val_at(6).map_err(decode_err)?,
        data: rlp.val_at::<Vec<u8>>(7).map_err(decode_err)?.into(),
    };

    let y_parity: u64 = rlp.val_at(9).map_err(decode_err)?;
    let r: U256 = rlp.val_at(10).map_err(decode_err)?;
    let s: U256 = rlp.val_at(11).map_err(decode_err)?;
    let mut r_bytes = [0u8; 32];
    let mut s_bytes = [0u8; 32];
    r.to_big_endian(&mut r_bytes);
    s.to_big_endian(&mut s_bytes);
    let signature = SignatureComponents::new(y_parity, H256(r_bytes), H256(s_bytes))?;

    Ok(SignedTransaction::new(transaction, signature))
}
