mod auth;
mod reader;

pub use reader::AzureBlobReader;

use crate::location::BlobLocation;

#[derive(Clone)]
pub struct AzureConfig {
    pub location: BlobLocation,
    /// Base64 storage account key; SAS or anonymous access when `None`.
    pub account_key: Option<String>,
}
