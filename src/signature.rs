use crate::prelude::Result;
use crate::unsigned::Digest;
use crate::Error;
use ethers::types::{Address, Signature, H256, U256};
use serde::{Deserialize, Serialize};

/// Raw signature exactly as the tag reports it: `r`/`s` as bare hex,
/// `v` as 27/28.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawSignature {
    pub v: u64,
    pub r: String,
    pub s: String,
}

/// A validated recoverable secp256k1 signature.
///
/// The recovery indicator is kept as a y-parity, so the same signature
/// compares equal whether it came from the tag (27/28) or from a decoded
/// envelope (0/1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureComponents {
    y_parity: u64,
    r: H256,
    s: H256,
}

/// Order of the secp256k1 group.
const SECP256K1_N: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// `n / 2`; EIP-2 rejects any `s` above it.
const SECP256K1_HALF_N: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

fn parse_scalar(name: &str, value: &str) -> Result<H256> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.len() != 64 {
        return Err(Error::InvalidSignature(format!(
            "{name} must be 64 hex characters, got {}",
            digits.len()
        )));
    }
    let bytes =
        hex::decode(digits).map_err(|e| Error::InvalidSignature(format!("{name}: {e}")))?;
    Ok(H256::from_slice(&bytes))
}

impl SignatureComponents {
    /// Accepts `v` as a y-parity (0/1) or in the legacy 27/28 form.
    /// `r` must lie in `[1, n)` and `s` in `[1, n/2]`.
    pub fn new(v: u64, r: H256, s: H256) -> Result<Self> {
        let y_parity = match v {
            0 | 1 => v,
            27 | 28 => v - 27,
            other => {
                return Err(Error::InvalidSignature(format!(
                    "recovery indicator {other} is not one of 0, 1, 27, 28"
                )))
            }
        };
        if r.is_zero() || s.is_zero() {
            return Err(Error::InvalidSignature("r and s must be non-zero".to_string()));
        }
        if r.as_bytes() >= &SECP256K1_N[..] {
            return Err(Error::InvalidSignature(
                "r is not below the curve order".to_string(),
            ));
        }
        if s.as_bytes() > &SECP256K1_HALF_N[..] {
            return Err(Error::InvalidSignature(
                "s is in the upper half of the curve order".to_string(),
            ));
        }
        Ok(SignatureComponents { y_parity, r, s })
    }

    pub fn from_raw(raw: &RawSignature) -> Result<Self> {
        let r = parse_scalar("r", &raw.r)?;
        let s = parse_scalar("s", &raw.s)?;
        Self::new(raw.v, r, s)
    }

    pub fn r(&self) -> H256 {
        self.r
    }

    pub fn s(&self) -> H256 {
        self.s
    }

    pub fn y_parity(&self) -> u64 {
        self.y_parity
    }

    /// Signature in the form the typed-transaction envelope carries
    /// (`v` is the y-parity).
    pub(crate) fn to_envelope_signature(&self) -> Signature {
        Signature {
            r: U256::from_big_endian(self.r.as_bytes()),
            s: U256::from_big_endian(self.s.as_bytes()),
            v: self.y_parity(),
        }
    }

    pub fn recover(&self, digest: &Digest) -> Result<Address> {
        let signature = Signature {
            v: self.y_parity() + 27,
            ..self.to_envelope_signature()
        };
        signature
            .recover(digest.as_h256())
            .map_err(|e| Error::InvalidSignature(e.to_string()))
    }

    /// `0x || r || s || v`, the 65-byte display form.
    pub fn to_ether_string(&self) -> String {
        format!(
            "0x{}{}{:02x}",
            hex::encode(self.r.as_bytes()),
            hex::encode(self.s.as_bytes()),
            self.y_parity() + 27
        )
    }
}
