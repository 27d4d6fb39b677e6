pub mod assembler;
mod broadcast;

pub use assembler::{decode_signed, encode_signed, SignedTransaction};
pub use broadcast::Broadcaster;
