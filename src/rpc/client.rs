use crate::prelude::Result;
use crate::rpc::NodeRpc;
use crate::Error;
use ethers::types::{Address, Bytes, H256, U256};
use log::{debug, error, info};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Serialize, Debug)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize, Debug)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct RpcErrorObject {
    code: i64,
    message: String,
}

/// HTTP JSON-RPC client for the configured node.
#[derive(Debug, Clone)]
pub struct NodeClient {
    pub client: Client,
    pub rpc_url: String,
    next_id: Arc<AtomicU64>,
}

async fn read_body(response: Response) -> Result<(u16, String)> {
    let status_code = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| Error::NetworkUnavailable(e.to_string()))?;
    Ok((status_code, text))
}

impl NodeClient {
    pub fn new(client: Option<Client>, rpc_url: impl Into<String>) -> Self {
        NodeClient {
            client: client.unwrap_or_default(),
            rpc_url: rpc_url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Performs one JSON-RPC call. The outer error covers transport and
    /// framing problems; the inner one is the node's own error object.
    async fn call<P: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<std::result::Result<T, RpcErrorObject>> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let body =
            serde_json::to_string(&request).map_err(|e| Error::JsonParse(e.to_string()))?;
        debug!("-> {}: {body}", self.rpc_url);

        let request = self
            .client
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .body(body)
            .build()
            .map_err(|e| Error::NetworkUnavailable(e.to_string()))?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::NetworkUnavailable(e.to_string()))?;
        let (status_code, text) = read_body(response).await?;
        debug!("<- {status_code}: {text}");

        let parsed: RpcResponse<T> = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if status_code >= 400 => {
                error!("{method} failed with HTTP {status_code}: {text}");
                return Err(Error::NetworkUnavailable(format!(
                    "HTTP {status_code}: {text}"
                )));
            }
            Err(e) => {
                return Err(Error::NetworkUnavailable(format!(
                    "unreadable JSON-RPC response to {method}: {e}"
                )))
            }
        };

        match (parsed.result, parsed.error) {
            (_, Some(rpc_error)) => Ok(Err(rpc_error)),
            (Some(result), None) => Ok(Ok(result)),
            (None, None) => Err(Error::NetworkUnavailable(format!(
                "{method} returned neither result nor error"
            ))),
        }
    }
}

impl NodeRpc for NodeClient {
    fn transaction_count(&self, address: Address) -> impl Future<Output = Result<U256>> + Send {
        async move {
            self.call("eth_getTransactionCount", (address, "latest"))
                .await?
                .map_err(|e| {
                    Error::NetworkUnavailable(format!(
                        "eth_getTransactionCount failed (code {}): {}",
                        e.code, e.message
                    ))
                })
        }
    }

    fn send_raw_transaction(&self, raw: Bytes) -> impl Future<Output = Result<H256>> + Send {
        async move {
            match self.call("eth_sendRawTransaction", [raw]).await? {
                Ok(hash) => {
                    info!("Transaction hash: {hash:#x}");
                    Ok(hash)
                }
                Err(RpcErrorObject { code, message }) => {
                    error!("Error sending transaction: {message}");
                    Err(Error::BroadcastRejected { code, message })
                }
            }
        }
    }
}
