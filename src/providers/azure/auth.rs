//! Azure Storage Shared Key request signing
//!
//! See <https://learn.microsoft.com/rest/api/storageservices/authorize-with-shared-key>.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::AppResult;

type HmacSha256 = Hmac<Sha256>;

/// Storage service version sent as `x-ms-version` on every request.
pub const STORAGE_API_VERSION: &str = "2021-08-06";

/// Account name plus the decoded account key.
#[derive(Clone)]
pub struct SharedKeyCredential {
    account: String,
    key: Vec<u8>,
}

impl SharedKeyCredential {
    pub fn new(account: &str, account_key: &str) -> AppResult<Self> {
        let key = BASE64
            .decode(account_key.trim())
            .map_err(|e| format!("Account key is not valid base64: {}", e))?;
        Ok(Self {
            account: account.to_string(),
            key,
        })
    }

    /// `Authorization` header value for an already built string-to-sign.
    pub fn authorization(&self, string_to_sign: &str) -> String {
        let signature = BASE64.encode(hmac_sha256(&self.key, string_to_sign.as_bytes()));
        format!("SharedKey {}:{}", self.account, signature)
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// `x-ms-date` value (RFC 1123, GMT).
pub fn request_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Encode URI path - encode each segment individually, keep / as separator
pub fn encode_uri_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// String-to-sign for a bodiless request that carries only `x-ms-*` headers.
///
/// The eleven standard headers (Content-Encoding through Range) are all empty:
/// ranges travel in `x-ms-range`, which is part of the canonicalized headers.
pub fn string_to_sign(method: &str, ms_headers: &[(&str, &str)], canonical_resource: &str) -> String {
    let mut headers: Vec<(String, &str)> = ms_headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim()))
        .collect();
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();

    format!(
        "{}\n{}{}{}",
        method,
        "\n".repeat(11),
        canonical_headers,
        canonical_resource
    )
}
