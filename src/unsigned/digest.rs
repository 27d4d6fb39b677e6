use crate::unsigned::UnsignedTransaction;
use ethers::types::{Bytes, H256};
use std::fmt;

/// keccak-256 of a transaction's signing payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(H256);

impl Digest {
    pub fn as_h256(&self) -> H256 {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_fixed_bytes()
    }

    /// 64 lowercase hex characters, no `0x`: the form the tag's `sign`
    /// command expects.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<H256> for Digest {
    fn from(hash: H256) -> Self {
        Digest(hash)
    }
}

/// `0x02 || rlp([chain_id, nonce, max_priority_fee_per_gas, max_fee_per_gas,
/// gas_limit, to, value, data, access_list])`
pub fn encode_unsigned(tx: &UnsignedTransaction) -> Bytes {
    tx.to_typed_transaction().rlp()
}

pub fn compute_digest(tx: &UnsignedTransaction) -> Digest {
    Digest(tx.to_typed_transaction().sighash())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unsigned::builder::store_number_transaction;
    use ethers::types::{Address, U256};
    use ethers::utils::{keccak256, rlp::Rlp};

    fn sample_tx(nonce: u64) -> UnsignedTransaction {
        store_number_transaction(U256::from(nonce))
    }

    #[test]
    fn test_digest_is_deterministic() {
        let tx = sample_tx(5);
        let first = compute_digest(&tx);
        for _ in 0..10 {
            assert_eq!(compute_digest(&tx.clone()), first);
        }
    }

    #[test]
    fn test_digest_is_keccak_of_typed_encoding() {
        let tx = sample_tx(5);
        let encoded = encode_unsigned(&tx);
        assert_eq!(encoded[0], 0x02);
        assert_eq!(compute_digest(&tx).as_bytes(), &keccak256(&encoded));
    }

    #[test]
    fn test_unsigned_encoding_field_order() {
        let tx = sample_tx(7);
        let encoded = encode_unsigned(&tx);
        let rlp = Rlp::new(&encoded[1..]);

        assert_eq!(rlp.item_count().unwrap(), 9);
        assert_eq!(rlp.val_at::<u64>(0).unwrap(), 11_155_111);
        assert_eq!(rlp.val_at::<U256>(1).unwrap(), U256::from(7));
        assert_eq!(rlp.val_at::<U256>(2).unwrap(), tx.max_priority_fee_per_gas);
        assert_eq!(rlp.val_at::<U256>(3).unwrap(), tx.max_fee_per_gas);
        assert_eq!(rlp.val_at::<U256>(4).unwrap(), U256::from(25_000));
        assert_eq!(rlp.val_at::<Address>(5).unwrap(), tx.recipient);
        // zero value is the empty string, not 0x00
        assert_eq!(rlp.at(6).unwrap().as_raw(), &[0x80]);
        assert_eq!(rlp.val_at::<Vec<u8>>(7).unwrap(), tx.data.to_vec());
        assert_eq!(rlp.at(8).unwrap().item_count().unwrap(), 0);
    }

    #[test]
    fn test_digest_changes_with_any_field() {
        let base = sample_tx(5);
        let base_digest = compute_digest(&base);

        let mut other_nonce = base.clone();
        other_nonce.nonce = U256::from(6);
        let mut other_chain = base.clone();
        other_chain.chain_id = 1;
        let mut other_data = base.clone();
        other_data.data = vec![0xde, 0xad].into();

        for tx in [other_nonce, other_chain, other_data] {
            assert_ne!(compute_digest(&tx), base_digest);
        }
    }

    #[test]
    fn test_hex_has_no_prefix() {
        let hex = compute_digest(&sample_tx(0)).to_hex();
        assert_eq!(hex.len(), 64);
        assert!(!hex.starts_with("0x"));
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
