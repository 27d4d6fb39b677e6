//! Browser side of the HaLo gateway: pair with a phone through an
//! out-of-band exec URL, forward exactly one tag command, return its result.
//!
//! ```text
//! Idle --start_pairing--> PairedPending --wait_connected--> WaitingConnected
//!      --executor_connected--> Connected --exec_command--> CommandInFlight
//!      --result_cmd--> Completed
//! ```
//!
//! Any transport error, disconnect, or malformed frame moves the session to
//! `Failed`. `Completed` and `Failed` are terminal: a relay carries one
//! command and is then discarded.

use crate::halo::command::HaloCommand;
use crate::prelude::Result;
use crate::Error;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use uuid::Uuid;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    PairedPending,
    WaitingConnected,
    Connected,
    CommandInFlight,
    Completed,
    Failed,
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelayState::Idle => "idle",
            RelayState::PairedPending => "paired-pending",
            RelayState::WaitingConnected => "waiting-connected",
            RelayState::Connected => "connected",
            RelayState::CommandInFlight => "command-in-flight",
            RelayState::Completed => "completed",
            RelayState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Handed to the caller after pairing starts. `exec_url` is opaque: render
/// it, don't parse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairInfo {
    pub session_id: String,
    pub exec_url: String,
}

/// Frames exchanged with the gateway.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayMessage {
    ExecutorConnected,
    ExecutorDisconnected,
    RequestCmd { uid: u64, payload: Value },
    ResultCmd { uid: u64, payload: Value },
    ErrorCmd { uid: u64, message: String },
}

/// `wss://host` -> `https://host/e?session=<id>`
pub fn exec_url_for(gateway_url: &str, session_id: &str) -> Result<String> {
    let base = gateway_url.trim_end_matches('/');
    let http_base = if let Some(rest) = base.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = base.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        return Err(Error::Config(format!(
            "gateway url must start with ws:// or wss://, got {gateway_url}"
        )));
    };
    Ok(format!("{http_base}/e?session={session_id}"))
}

fn requestor_url(gateway_url: &str, session_id: &str) -> String {
    format!(
        "{}/ws?side=requestor&session={session_id}",
        gateway_url.trim_end_matches('/')
    )
}

pub struct PairingRelay {
    gateway_url: String,
    state: RelayState,
    pair_info: Option<PairInfo>,
    socket: Option<Socket>,
    next_uid: u64,
}

impl fmt::Debug for PairingRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairingRelay")
            .field("gateway_url", &self.gateway_url)
            .field("state", &self.state)
            .field("pair_info", &self.pair_info)
            .finish()
    }
}

impl PairingRelay {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        PairingRelay {
            gateway_url: gateway_url.into(),
            state: RelayState::Idle,
            pair_info: None,
            socket: None,
            next_uid: 1,
        }
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn pair_info(&self) -> Option<&PairInfo> {
        self.pair_info.as_ref()
    }

    fn check_state(&self, expected: RelayState, action: &str) -> Result<()> {
        match self.state {
            state if state == expected => Ok(()),
            RelayState::Completed | RelayState::Failed => Err(Error::SessionSpent),
            state => Err(Error::InvalidRelayState {
                state: state.to_string(),
                action: action.to_string(),
            }),
        }
    }

    fn fail(&mut self) {
        self.state = RelayState::Failed;
        // dropping the stream closes the connection
        self.socket = None;
    }

    /// Opens the requestor connection and returns the handoff token.
    pub async fn start_pairing(&mut self) -> Result<PairInfo> {
        self.check_state(RelayState::Idle, "start pairing")?;

        let session_id = Uuid::new_v4().to_string();
        let exec_url = match exec_url_for(&self.gateway_url, &session_id) {
            Ok(url) => url,
            Err(e) => {
                self.fail();
                return Err(e);
            }
        };
        let url = requestor_url(&self.gateway_url, &session_id);
        debug!("Connecting to gateway {url}");

        let (socket, _response) = match connect_async(url.as_str()).await {
            Ok(connection) => connection,
            Err(e) => {
                warn!("Gateway connection failed: {e}");
                self.fail();
                return Err(Error::PeeringFailed(e.to_string()));
            }
        };

        let pair_info = PairInfo {
            session_id,
            exec_url,
        };
        info!("Pairing session {} started", pair_info.session_id);
        self.socket = Some(socket);
        self.pair_info = Some(pair_info.clone());
        self.state = RelayState::PairedPending;
        Ok(pair_info)
    }

    /// Blocks until the phone attaches to the session. There is no timeout;
    /// callers that give up simply drop the relay.
    pub async fn wait_connected(&mut self) -> Result<()> {
        self.check_state(RelayState::PairedPending, "wait for a peer")?;
        self.state = RelayState::WaitingConnected;
        info!("Waiting for smartphone to connect...");

        match self.next_message().await {
            Ok(GatewayMessage::ExecutorConnected) => {
                info!("Smartphone connected");
                self.state = RelayState::Connected;
                Ok(())
            }
            Ok(other) => {
                self.fail();
                Err(Error::PeeringFailed(format!(
                    "unexpected gateway message while pairing: {other:?}"
                )))
            }
            Err(reason) => {
                warn!("Pairing failed: {reason}");
                self.fail();
                Err(Error::PeeringFailed(reason))
            }
        }
    }

    /// Forwards `command` to the phone and returns its response verbatim.
    /// Succeeds at most once per relay.
    pub async fn exec_command(&mut self, command: &HaloCommand) -> Result<Value> {
        self.check_state(RelayState::Connected, "execute a command")?;

        let uid = self.next_uid;
        self.next_uid += 1;
        let payload = serde_json::to_value(command).map_err(|e| Error::JsonParse(e.to_string()))?;
        let frame = serde_json::to_string(&GatewayMessage::RequestCmd { uid, payload })
            .map_err(|e| Error::JsonParse(e.to_string()))?;

        self.state = RelayState::CommandInFlight;
        let sent = match self.socket.as_mut() {
            Some(socket) => socket
                .send(Message::Text(frame))
                .await
                .map_err(|e| e.to_string()),
            None => Err("no gateway connection".to_string()),
        };
        if let Err(reason) = sent {
            self.fail();
            return Err(Error::SigningFailed(reason));
        }
        debug!("Sent command {uid} to smartphone");

        match self.next_message().await {
            Ok(GatewayMessage::ResultCmd {
                uid: result_uid,
                payload,
            }) if result_uid == uid => {
                self.state = RelayState::Completed;
                if let Some(mut socket) = self.socket.take() {
                    let _ = socket.close(None).await;
                }
                info!("Command {uid} completed");
                Ok(payload)
            }
            Ok(GatewayMessage::ErrorCmd { message, .. }) => {
                self.fail();
                Err(Error::SigningFailed(message))
            }
            Ok(GatewayMessage::ExecutorDisconnected) => {
                self.fail();
                Err(Error::SigningFailed("smartphone disconnected".to_string()))
            }
            Ok(other) => {
                self.fail();
                Err(Error::SigningFailed(format!(
                    "unexpected gateway message: {other:?}"
                )))
            }
            Err(reason) => {
                self.fail();
                Err(Error::SigningFailed(reason))
            }
        }
    }

    async fn next_message(&mut self) -> std::result::Result<GatewayMessage, String> {
        let socket = self
            .socket
            .as_mut()
            .ok_or_else(|| "no gateway connection".to_string())?;
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => {
                    debug!("Gateway: {text}");
                    return serde_json::from_str(&text)
                        .map_err(|e| format!("malformed gateway message: {e}"));
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Close(frame))) => {
                    return Err(format!("gateway closed the connection: {frame:?}"))
                }
                Some(Ok(other)) => return Err(format!("unexpected gateway frame: {other:?}")),
                Some(Err(e)) => return Err(e.to_string()),
                None => return Err("gateway connection ended".to_string()),
            }
        }
    }
}
