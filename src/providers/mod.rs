//! Storage providers behind a single [`RemoteObjectReader`]

mod azure;
mod s3;

pub use azure::{AzureBlobReader, AzureConfig};
pub use s3::{S3Config, S3ObjectReader, DEFAULT_REGION};

use bytes::Bytes;
use resumable_dl::{ObjectId, ObjectLocation, RemoteObjectReader, TransferError};

use crate::AppResult;

/// Provider-specific connection settings for one download.
#[derive(Clone)]
pub enum DownloadConfig {
    Azure(AzureConfig),
    S3(S3Config),
}

impl DownloadConfig {
    pub fn provider_name(&self) -> &'static str {
        match self {
            DownloadConfig::Azure(_) => "azure",
            DownloadConfig::S3(_) => "s3",
        }
    }
}

pub enum BlobReader {
    Azure(AzureBlobReader),
    S3(S3ObjectReader),
}

impl BlobReader {
    pub fn connect(config: &DownloadConfig) -> AppResult<Self> {
        Ok(match config {
            DownloadConfig::Azure(azure) => BlobReader::Azure(AzureBlobReader::new(azure)?),
            DownloadConfig::S3(s3) => BlobReader::S3(S3ObjectReader::new(s3)?),
        })
    }
}

impl RemoteObjectReader for BlobReader {
    async fn probe_length(&self, object: &ObjectId) -> Result<u64, TransferError> {
        match self {
            BlobReader::Azure(reader) => reader.probe_length(object).await,
            BlobReader::S3(reader) => reader.probe_length(object).await,
        }
    }

    async fn read_range(
        &self,
        location: &ObjectLocation,
        offset: u64,
        length: u64,
    ) -> Result<Bytes, TransferError> {
        match self {
            BlobReader::Azure(reader) => reader.read_range(location, offset, length).await,
            BlobReader::S3(reader) => reader.read_range(location, offset, length).await,
        }
    }
}
