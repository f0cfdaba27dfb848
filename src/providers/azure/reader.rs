use bytes::Bytes;
use chrono::Utc;
use log::debug;
use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use resumable_dl::{ObjectId, ObjectLocation, RemoteObjectReader, TransferError};

use super::auth::{
    encode_uri_path, request_date, string_to_sign, SharedKeyCredential, STORAGE_API_VERSION,
};
use super::AzureConfig;
use crate::AppResult;

/// Reads block and page blobs through the Blob service REST API.
///
/// Requests are signed with Shared Key when an account key is configured,
/// carry the SAS token when the URL had one, and are anonymous otherwise.
pub struct AzureBlobReader {
    client: Client,
    endpoint: String,
    path_style: bool,
    sas_token: Option<String>,
    credential: Option<SharedKeyCredential>,
}

impl AzureBlobReader {
    pub fn new(config: &AzureConfig) -> AppResult<Self> {
        let location = &config.location;
        let credential = match config.account_key.as_deref().filter(|key| !key.is_empty()) {
            Some(key) => Some(SharedKeyCredential::new(&location.account, key)?),
            None => None,
        };
        let client = Client::builder()
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: location.endpoint(),
            path_style: location.path_style,
            sas_token: location.sas_token.clone(),
            credential,
        })
    }

    fn blob_path(&self, object: &ObjectId) -> String {
        let blob = encode_uri_path(&object.object_name);
        if self.path_style {
            format!("/{}/{}/{}", object.account, object.container, blob)
        } else {
            format!("/{}/{}", object.container, blob)
        }
    }

    fn request(
        &self,
        method: Method,
        object: &ObjectId,
        mut headers: Vec<(&'static str, String)>,
    ) -> RequestBuilder {
        let path = self.blob_path(object);
        let mut url = format!("{}{}", self.endpoint, path);
        if let Some(sas) = &self.sas_token {
            url.push('?');
            url.push_str(sas);
        }

        headers.push(("x-ms-date", request_date(Utc::now())));
        headers.push(("x-ms-version", STORAGE_API_VERSION.to_string()));

        let mut builder = self.client.request(method.clone(), url);
        if let (None, Some(credential)) = (&self.sas_token, &self.credential) {
            let pairs: Vec<(&str, &str)> = headers
                .iter()
                .map(|(name, value)| (*name, value.as_str()))
                .collect();
            let canonical_resource = format!("/{}{}", object.account, path);
            let sts = string_to_sign(method.as_str(), &pairs, &canonical_resource);
            builder = builder.header("Authorization", credential.authorization(&sts));
        }
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        builder
    }
}

/// Blob length from the `Content-Length` header of a Get Blob Properties response.
fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.trim().parse().ok()
}

fn check_status(response: &Response, object: &ObjectId) -> Result<(), TransferError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let error_code = response
        .headers()
        .get("x-ms-error-code")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    if status == StatusCode::NOT_FOUND {
        return Err(TransferError::NotFound(format!("{} ({})", object, error_code)));
    }
    Err(TransferError::network_msg(format!(
        "{} returned {} ({})",
        object, status, error_code
    )))
}

impl RemoteObjectReader for AzureBlobReader {
    async fn probe_length(&self, object: &ObjectId) -> Result<u64, TransferError> {
        let response = self
            .request(Method::HEAD, object, Vec::new())
            .send()
            .await
            .map_err(|e| TransferError::network(format!("Get properties of {} failed", object), e))?;
        check_status(&response, object)?;

        let length = content_length(response.headers()).ok_or_else(|| {
            TransferError::network_msg(format!("No Content-Length in properties of {}", object))
        })?;
        debug!("Blob {} is {} bytes", object, length);
        Ok(length)
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

        let response = self
            .request(Method::GET, object, vec![("x-ms-range", range.clone())])
            .send()
            .await
            .map_err(|e| TransferError::network(format!("Get {} {} failed", object, range), e))?;
        check_status(&response, object)?;

        response
            .bytes()
            .await
            .map_err(|e| TransferError::network(format!("Reading {} {} failed", object, range), e))
    }
}
