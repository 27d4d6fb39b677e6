//! The demo contract on Sepolia and the single call the demo makes to it.
//!
//! ```solidity
//! function storeNumber(uint256 _number) public {
//!     emit CallSuccess(_number);
//! }
//! ```

use ethers::abi::{encode, Token};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::id;
use lazy_static::lazy_static;

/// Contract deployed on Sepolia exposing `storeNumber(uint256)`
pub const STORE_NUMBER_CONTRACT: &str = "0x585Ab35e3Ffe0e2A048352f34fa0B58B80299ED5";

pub const STORE_NUMBER_SIGNATURE: &str = "storeNumber(uint256)";

/// Argument passed to `storeNumber`
pub const STORED_NUMBER: u64 = 12321;

/// Gas parameters. A plain transfer needs 21k; the contract call needs a bit more.
pub const GAS_LIMIT: u64 = 25_000;
pub const MAX_FEE_PER_GAS: u64 = 20_000_000_000;
pub const MAX_PRIORITY_FEE_PER_GAS: u64 = 2_000_000_000;

lazy_static! {
    static ref CONTRACT_ADDRESS: Address = STORE_NUMBER_CONTRACT.parse().unwrap();
}

pub fn store_number_contract() -> Address {
    *CONTRACT_ADDRESS
}

/// ABI-encoded call data for `storeNumber(number)`
pub fn store_number_call_data(number: U256) -> Bytes {
    let selector = id(STORE_NUMBER_SIGNATURE);
    let mut data = selector.to_vec();
    data.extend(encode(&[Token::Uint(number)]));
    data.into()
}
