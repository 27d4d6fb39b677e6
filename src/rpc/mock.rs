use crate::prelude::Result;
use crate::rpc::NodeRpc;
use crate::Error;
use ethers::types::{Address, Bytes, H256, U256};
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Recorded {
    nonce_queries: Vec<Address>,
    broadcasts: Vec<Bytes>,
}

/// In-memory node: fixed nonce, scripted broadcast outcome, and a log of
/// every call it saw.
#[derive(Debug, Clone)]
pub(crate) struct MockRpc {
    nonce: Option<u64>,
    broadcast: std::result::Result<H256, Error>,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockRpc {
    pub(crate) fn with_nonce(nonce: u64) -> Self {
        MockRpc {
            nonce: Some(nonce),
            broadcast: Ok(H256::repeat_byte(0x11)),
            recorded: Arc::default(),
        }
    }

    pub(crate) fn unreachable() -> Self {
        MockRpc {
            nonce: None,
            broadcast: Err(Error::NetworkUnavailable("connection refused".to_string())),
            recorded: Arc::default(),
        }
    }

    pub(crate) fn rejecting(mut self, message: &str) -> Self {
        self.broadcast = Err(Error::BroadcastRejected {
            code: -32000,
            message: message.to_string(),
        });
        self
    }

    pub(crate) fn nonce_queries(&self) -> Vec<Address> {
        self.recorded.lock().unwrap().nonce_queries.clone()
    }

    pub(crate) fn broadcasts(&self) -> Vec<Bytes> {
        self.recorded.lock().unwrap().broadcasts.clone()
    }
}

impl NodeRpc for MockRpc {
    fn transaction_count(&self, address: Address) -> impl Future<Output = Result<U256>> + Send {
        self.recorded.lock().unwrap().nonce_queries.push(address);
        let nonce = self
            .nonce
            .map(U256::from)
            .ok_or_else(|| Error::NetworkUnavailable("connection refused".to_string()));
        async move { nonce }
    }

    fn send_raw_transaction(&self, raw: Bytes) -> impl Future<Output = Result<H256>> + Send {
        self.recorded.lock().unwrap().broadcasts.push(raw);
        let outcome = self.broadcast.clone();
        async move { outcome }
    }
}
