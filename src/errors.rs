use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The node could not be reached, or answered with something other than
    /// a JSON-RPC response.
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),
    /// The tag or the relay failed to produce a response (scan aborted,
    /// peer gone, malformed payload).
    #[error("Signing failed: {0}")]
    SigningFailed(String),
    #[error("Signing cancelled")]
    SigningCancelled,
    #[error("Pairing with the mobile device failed: {0}")]
    PeeringFailed(String),
    /// The node accepted the call but rejected the transaction itself.
    #[error("Broadcast rejected by node (code {code}): {message}")]
    BroadcastRejected { code: i64, message: String },
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Relay session is {state}, cannot {action}")]
    InvalidRelayState { state: String, action: String },
    #[error("Relay session already used, start a new pairing")]
    SessionSpent,
    #[error("Please get address first")]
    MissingAddress,
    #[error("Please sign the transaction first")]
    MissingSignedTransaction,
    #[error("Json parse error {0:?}")]
    JsonParse(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
