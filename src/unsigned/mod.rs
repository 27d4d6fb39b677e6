pub mod builder;
mod components;
pub mod contract;
pub mod digest;

pub use builder::{store_number_transaction, UnsignedTransactionBuilder};
pub use components::{UnsignedTransaction, FEE_MARKET_TX_TYPE};
pub use digest::{compute_digest, encode_unsigned, Digest};
