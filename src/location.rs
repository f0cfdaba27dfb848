//! Blob location parsing
//!
//! Accepted forms:
//! - `https://{account}.blob.core.windows.net/{container}/{blob...}`
//! - `http://127.0.0.1:10000/{account}/{container}/{blob...}` (path-style endpoints)
//! - `s3://{bucket}/{key...}`

use resumable_dl::ObjectId;

use crate::AppResult;

/// Account label used for S3 objects, which have no storage account.
const S3_ACCOUNT: &str = "s3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Azure,
    S3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLocation {
    pub kind: LocationKind,
    pub scheme: String,
    /// Host with optional port; empty for `s3://` locations.
    pub host: String,
    pub account: String,
    pub container: String,
    pub object_name: String,
    /// Account is the first path segment instead of the first host label.
    pub path_style: bool,
    /// Query string of the URL, used as a SAS token.
    pub sas_token: Option<String>,
}

impl BlobLocation {
    /// Sanitizes and parses a blob URL. Does not check that the object exists.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let sanitized = raw.trim().replace('\\', "/");
        let sanitized = sanitized.trim_matches('/');
        if sanitized.is_empty() {
            return Err("Blob URL is empty".into());
        }

        let (scheme, rest) = match sanitized.split_once("://") {
            Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
            None => ("http".to_string(), sanitized),
        };

        match scheme.as_str() {
            "s3" => Self::parse_s3(rest),
            "http" | "https" => Self::parse_http(scheme, rest),
            other => Err(format!("Unsupported URL scheme '{}' in {}", other, raw).into()),
        }
    }

    fn parse_s3(rest: &str) -> AppResult<Self> {
        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| format!("S3 URL needs a bucket and a key: s3://{}", rest))?;
        let key = key.trim_matches('/');
        if bucket.is_empty() || key.is_empty() {
            return Err(format!("S3 URL needs a bucket and a key: s3://{}", rest).into());
        }

        Ok(Self {
            kind: LocationKind::S3,
            scheme: "s3".to_string(),
            host: String::new(),
            account: S3_ACCOUNT.to_string(),
            container: bucket.to_string(),
            object_name: decode_object_name(key)?,
            path_style: false,
            sas_token: None,
        })
    }

    fn parse_http(scheme: String, rest: &str) -> AppResult<Self> {
        let (rest, sas_token) = match rest.split_once('?') {
            Some((rest, query)) if !query.is_empty() => (rest, Some(query.to_string())),
            Some((rest, _)) => (rest, None),
            None => (rest, None),
        };

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        let host = authority.to_ascii_lowercase();
        if host.is_empty() {
            return Err(format!("Blob URL has no host: {}", rest).into());
        }

        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let path_style = !host.contains(".blob.");
        let account = if path_style {
            segments
                .next()
                .ok_or_else(|| format!("Blob URL has no account segment: {}", rest))?
                .to_string()
        } else {
            host.split('.').next().unwrap_or_default().to_string()
        };

        let container = segments
            .next()
            .ok_or_else(|| format!("Blob URL has no container: {}", rest))?
            .to_ascii_lowercase();
        let object_name = segments.collect::<Vec<_>>().join("/");
        if object_name.is_empty() {
            return Err(format!("Blob URL has no blob name: {}", rest).into());
        }

        Ok(Self {
            kind: LocationKind::Azure,
            scheme,
            host,
            account,
            container,
            object_name: decode_object_name(&object_name)?,
            path_style,
            sas_token,
        })
    }

    /// `scheme://host` for Azure locations.
    pub fn endpoint(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    pub fn object_id(&self) -> ObjectId {
        ObjectId {
            account: self.account.clone(),
            container: self.container.clone(),
            object_name: self.object_name.clone(),
        }
    }
}

fn decode_object_name(raw: &str) -> AppResult<String> {
    let decoded = urlencoding::decode(raw)
        .map_err(|e| format!("Blob name is not valid UTF-8 after decoding: {}", e))?;
    Ok(decoded.into_owned())
}
