use crate::halo::command::HaloCommand;
use crate::halo::status::StatusSink;
use crate::prelude::Result;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// A tag reachable from this device.
///
/// Implementations run one command against the tag and resolve with its raw
/// JSON response. Retrying a failed tap is the implementation's business;
/// it reports progress through `status` and fails with
/// [`Error::SigningFailed`](crate::Error::SigningFailed) once it gives up.
pub trait TagExecutor: Send + Sync {
    fn exec(
        &self,
        command: &HaloCommand,
        status: &StatusSink,
    ) -> impl Future<Output = Result<Value>> + Send;
}

impl<T: TagExecutor> TagExecutor for Arc<T> {
    fn exec(
        &self,
        command: &HaloCommand,
        status: &StatusSink,
    ) -> impl Future<Output = Result<Value>> + Send {
        (**self).exec(command, status)
    }
}
