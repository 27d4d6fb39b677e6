#![deny(unreachable_pub)]
//! Sign EIP-1559 transactions with a HaLo NFC tag.
//!
//! The tag is either read on this device ([`LocalSession`]) or tapped
//! against a phone paired through the HaLo gateway ([`RelaySession`]).
//! Either way the flow is: build an [`UnsignedTransaction`], send its
//! [`Digest`] to the tag, validate the returned [`SignatureComponents`],
//! and broadcast the [`SignedTransaction`].

pub mod address;
pub mod config;
mod errors;
pub mod flow;
pub mod halo;
pub mod prelude;
pub mod rpc;
pub mod signature;
pub mod signed;
pub mod unsigned;

pub use address::parse_address;
pub use config::{Config, CHAIN_ID};
pub use errors::Error;
pub use flow::{Demo, DemoState, DeviceMode};
pub use halo::{
    CancelToken, HaloCommand, LocalSession, PairInfo, PairingRelay, RelaySession, RelayState,
    SessionStatus, SigningSession, SoftTag, TagExecutor,
};
pub use rpc::{NodeClient, NodeRpc};
pub use signature::{RawSignature, SignatureComponents};
pub use signed::{decode_signed, encode_signed, Broadcaster, SignedTransaction};
pub use unsigned::{
    compute_digest, encode_unsigned, Digest, UnsignedTransaction, UnsignedTransactionBuilder,
};
