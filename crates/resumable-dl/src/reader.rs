use bytes::Bytes;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::TransferError;

/// Resolved name of the remote object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectId {
    pub account: String,
    pub container: String,
    pub object_name: String,
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.account, self.container, self.object_name)
    }
}

/// Remote object with the length captured by the probe.
///
/// The length is assumed stable for the whole session (no concurrent writer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectLocation {
    pub id: ObjectId,
    pub object_length: u64,
}

/// Ranged access to a storage backend.
///
/// Implementations map backend failures onto [`TransferError::Network`] and
/// [`TransferError::NotFound`]. Reads have no side effects besides the network
/// call and may be abandoned at any `.await` point.
pub trait RemoteObjectReader {
    /// Metadata probe: current length of the object in bytes.
    fn probe_length(
        &self,
        object: &ObjectId,
    ) -> impl Future<Output = Result<u64, TransferError>> + Send;

    /// Reads exactly `length` bytes starting at `offset`.
    fn read_range(
        &self,
        location: &ObjectLocation,
        offset: u64,
        length: u64,
    ) -> impl Future<Output = Result<Bytes, TransferError>> + Send;
}

impl<T> RemoteObjectReader for Arc<T>
where
    T: RemoteObjectReader + Send + Sync,
{
    fn probe_length(
        &self,
        object: &ObjectId,
    ) -> impl Future<Output = Result<u64, TransferError>> + Send {
        (**self).probe_length(object)
    }

    fn read_range(
        &self,
        location: &ObjectLocation,
        offset: u64,
        length: u64,
    ) -> impl Future<Output = Result<Bytes, TransferError>> + Send {
        (**self).read_range(location, offset, length)
    }
}
