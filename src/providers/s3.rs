//! S3-compatible object reader (AWS, R2, MinIO) built on aws-sdk-s3

use aws_config::Region;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::Client;
use bytes::Bytes;
use log::debug;
use resumable_dl::{ObjectId, ObjectLocation, RemoteObjectReader, TransferError};

use crate::location::BlobLocation;
use crate::AppResult;

pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Clone)]
pub struct S3Config {
    pub location: BlobLocation,
    pub region: String,
    /// Custom endpoint for S3-compatible services; AWS when `None`.
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub force_path_style: bool,
}

fn create_s3_client(config: &S3Config) -> AppResult<Client> {
    if config.access_key_id.is_empty() || config.secret_access_key.is_empty() {
        return Err("S3 downloads need an access key id and a secret access key".into());
    }

    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "bigblob",
    );

    let mut builder = S3ConfigBuilder::new()
        .credentials_provider(credentials)
        .region(Region::new(config.region.clone()));

    if let Some(endpoint_url) = config.endpoint.as_deref() {
        builder = builder.endpoint_url(endpoint_url);
    }

    if config.force_path_style {
        builder = builder.force_path_style(true);
    }

    Ok(Client::from_conf(builder.build()))
}

pub struct S3ObjectReader {
    client: Client,
}

impl S3ObjectReader {
    pub fn new(config: &S3Config) -> AppResult<Self> {
        Ok(Self {
            client: create_s3_client(config)?,
        })
    }
}

impl RemoteObjectReader for S3ObjectReader {
    async fn probe_length(&self, object: &ObjectId) -> Result<u64, TransferError> {
        let output = self
            .client
            .head_object()
            .bucket(&object.container)
            .key(&object.object_name)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().is_some_and(|e| e.is_not_found()) {
                    TransferError::NotFound(object.to_string())
                } else {
                    TransferError::network(format!("HeadObject {} failed", object), err)
                }
            })?;

        let length = output.content_length().ok_or_else(|| {
            TransferError::network_msg(format!("HeadObject {} returned no content length", object))
        })?;
        debug!("HeadObject {}: {} bytes", object, length);
        u64::try_from(length).map_err(|_| {
            TransferError::network_msg(format!("HeadObject {} returned length {}", object, length))
        })
    }

    async fn read_range(
        &self,
        location: &ObjectLocation,
        offset: u64,
        length: u64,
    ) -> Result<Bytes, TransferError> {
        if length == 0 {
            return Ok(Bytes::new());
        }
        let object = &location.id;
        let range = format!("bytes={}-{}", offset, offset + length - 1);

        let output = self
            .client
            .get_object()
            .bucket(&object.container)
            .key(&object.object_name)
            .range(&range)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    TransferError::NotFound(object.to_string())
                } else {
                    TransferError::network(format!("GetObject {} {} failed", object, range), err)
                }
            })?;

        let body = output.body.collect().await.map_err(|err| {
            TransferError::network(format!("Reading body of {} {} failed", object, range), err)
        })?;
        Ok(body.into_bytes())
    }
}
