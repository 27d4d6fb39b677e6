use std::fmt;
use tokio::sync::mpsc;

/// Progress notifications for the UI. Informational only; nothing here is
/// retried by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    AwaitingTap,
    RetryNeeded,
    TagScanned,
    /// Relay pairing started; `exec_url` is meant to be shown as a QR code.
    PairingReady { exec_url: String },
    PeerConnected,
    Info(String),
}

pub type StatusSink = mpsc::UnboundedSender<SessionStatus>;

impl SessionStatus {
    /// Maps the tag library's status cause strings.
    pub fn from_cause(cause: &str) -> Self {
        match cause {
            "init" => SessionStatus::AwaitingTap,
            "retry" => SessionStatus::RetryNeeded,
            "scanned" => SessionStatus::TagScanned,
            other => SessionStatus::Info(other.to_string()),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::AwaitingTap => {
                write!(f, "Please tap the tag to the back of your smartphone and hold it...")
            }
            SessionStatus::RetryNeeded => {
                write!(f, "Something went wrong, please try to tap the tag again...")
            }
            SessionStatus::TagScanned => {
                write!(f, "Tag scanned successfully, post-processing the result...")
            }
            SessionStatus::PairingReady { exec_url } => {
                write!(f, "Scan this with your smartphone: {exec_url}")
            }
            SessionStatus::PeerConnected => write!(f, "Smartphone connected, tap the tag..."),
            SessionStatus::Info(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cause() {
        assert_eq!(SessionStatus::from_cause("init"), SessionStatus::AwaitingTap);
        assert_eq!(SessionStatus::from_cause("retry"), SessionStatus::RetryNeeded);
        assert_eq!(SessionStatus::from_cause("scanned"), SessionStatus::TagScanned);
        assert_eq!(
            SessionStatus::from_cause("again"),
            SessionStatus::Info("again".to_string())
        );
    }

    #[test]
    fn test_unknown_cause_is_shown_verbatim() {
        assert_eq!(SessionStatus::from_cause("hold still").to_string(), "hold still");
    }
}
