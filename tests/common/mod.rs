#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use halo_signer::halo::{GatewayMessage, HaloCommand, SoftTag, TagExecutor};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// How the phone on the other side of the mock gateway behaves.
#[derive(Clone)]
pub enum Peer {
    /// Attaches and answers with a soft tag.
    Serve(Arc<SoftTag>),
    /// Gateway hangs up before any phone attaches.
    CloseBeforeConnect,
    /// Attaches, then reports a failed scan.
    Fail(String),
    /// Attaches, then drops off mid-command.
    Disconnect,
    /// Attaches, then answers with something that is not a gateway frame.
    Garbage,
}

pub struct MockGateway {
    pub url: String,
    received: Arc<Mutex<Vec<GatewayMessage>>>,
}

impl MockGateway {
    /// Every frame the browser side sent, across all connections.
    pub fn received(&self) -> Vec<GatewayMessage> {
        self.received.lock().unwrap().clone()
    }
}

pub async fn spawn_gateway(peer: Peer) -> MockGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));

    let log = received.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(handle_requestor(stream, peer.clone(), log.clone()));
        }
    });

    MockGateway {
        url: format!("ws://{addr}"),
        received,
    }
}

fn frame(message: &GatewayMessage) -> Message {
    Message::Text(serde_json::to_string(message).unwrap())
}

async fn handle_requestor(
    stream: TcpStream,
    peer: Peer,
    received: Arc<Mutex<Vec<GatewayMessage>>>,
) {
    let mut ws = accept_async(stream).await.unwrap();
    if let Peer::CloseBeforeConnect = peer {
        let _ = ws.close(None).await;
        return;
    }
    if ws.send(frame(&GatewayMessage::ExecutorConnected)).await.is_err() {
        return;
    }

    while let Some(Ok(message)) = ws.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        let request: GatewayMessage = serde_json::from_str(&text).unwrap();
        received.lock().unwrap().push(request.clone());
        let GatewayMessage::RequestCmd { uid, payload } = request else {
            continue;
        };

        let reply = match &peer {
            Peer::Serve(tag) => {
                let command: HaloCommand = serde_json::from_value(payload).unwrap();
                let (status, _rx) = mpsc::unbounded_channel();
                match tag.exec(&command, &status).await {
                    Ok(payload) => GatewayMessage::ResultCmd { uid, payload },
                    Err(e) => GatewayMessage::ErrorCmd {
                        uid,
                        message: e.to_string(),
                    },
                }
            }
            Peer::Fail(message) => GatewayMessage::ErrorCmd {
                uid,
                message: message.clone(),
            },
            Peer::Disconnect => GatewayMessage::ExecutorDisconnected,
            Peer::Garbage => {
                let _ = ws.send(Message::Text("not a frame".to_string())).await;
                continue;
            }
            Peer::CloseBeforeConnect => unreachable!(),
        };
        let _ = ws.send(frame(&reply)).await;
    }
}

/// JSON-RPC node answering over plain HTTP/1.1, one request per connection.
pub struct MockNode {
    pub url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockNode {
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, method: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|request| request["method"] == method)
            .collect()
    }
}

/// `broadcast` is the JSON-RPC member returned for `eth_sendRawTransaction`,
/// either `{"result": ...}` or `{"error": ...}`.
pub async fn spawn_node(nonce: u64, broadcast: Value) -> MockNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let log = requests.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let Some(body) = read_http_body(&mut socket).await else {
                continue;
            };
            let request: Value = serde_json::from_str(&body).unwrap();
            log.lock().unwrap().push(request.clone());

            let mut response = match request["method"].as_str() {
                Some("eth_getTransactionCount") => json!({ "result": format!("{nonce:#x}") }),
                Some("eth_sendRawTransaction") => broadcast.clone(),
                _ => json!({ "error": { "code": -32601, "message": "method not found" } }),
            };
            response["jsonrpc"] = json!("2.0");
            response["id"] = request["id"].clone();

            let body = response.to_string();
            let reply = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    MockNode {
        url: format!("http://{addr}"),
        requests,
    }
}

async fn read_http_body(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(split) = text.find("\r\n\r\n") {
            let content_length = text[..split]
                .lines()
                .find_map(|line| {
                    line.to_ascii_lowercase()
                        .strip_prefix("content-length:")
                        .and_then(|v| v.trim().parse::<usize>().ok())
                })
                .unwrap_or(0);
            if buf.len() >= split + 4 + content_length {
                return Some(text[split + 4..].to_string());
            }
        }
    }
}
