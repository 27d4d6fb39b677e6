use crate::prelude::Result;
use crate::Error;
use ethers::types::Address;
use ethers::utils::to_checksum;

/// Parses a `0x`-prefixed 20-byte hex address.
///
/// All-lowercase and all-uppercase forms are accepted as-is. Mixed case is
/// treated as an EIP-55 checksum and must match.
pub fn parse_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidAddress("address is empty".to_string()));
    }

    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| Error::InvalidAddress(format!("{trimmed} is missing the 0x prefix")))?;

    if digits.len() != 40 {
        return Err(Error::InvalidAddress(format!(
            "{trimmed} has {} hex digits, expected 40",
            digits.len()
        )));
    }

    let bytes = hex::decode(digits)
        .map_err(|e| Error::InvalidAddress(format!("{trimmed}: {e}")))?;
    let address = Address::from_slice(&bytes);

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        let checksummed = to_checksum(&address, None);
        if checksummed[2..] != *digits {
            return Err(Error::InvalidAddress(format!(
                "{trimmed} has an invalid checksum, expected {checksummed}"
            )));
        }
    }

    Ok(address)
}
