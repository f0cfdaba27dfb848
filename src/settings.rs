//! Download settings: JSON or `key=value` settings file, overlaid by command-line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use resumable_dl::{ObjectId, TransferOptions};
use serde::{Deserialize, Serialize};

use crate::location::{BlobLocation, LocationKind};
use crate::providers::{AzureConfig, DownloadConfig, S3Config, DEFAULT_REGION};
use crate::AppResult;

/// How many leading characters of a secret are logged.
const VISIBLE_SECRET_CHARS: usize = 20;

const BOOL_KEYS: &[&str] = &["retryOnError", "pauseAtEnd", "forcePathStyle"];
const NUMBER_KEYS: &[&str] = &[
    "delayBeetweenChunksInSeconds",
    "delayBetweenChunksInSeconds",
    "chunkSize",
    "chunkTimeoutSeconds",
    "retryBackoffSeconds",
    "maxAttempts",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Azure,
    S3,
}

/// Settings as read from a settings file. Every field is optional so that
/// command-line flags can fill or override it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DownloadSettings {
    pub provider: Option<Provider>,
    pub blob_url: Option<String>,
    pub account_key: Option<String>,
    pub local_file_path: Option<PathBuf>,
    /// `Block` or `Page`; both are read the same way.
    pub blob_is_block_or_page: Option<String>,
    pub retry_on_error: Option<bool>,
    #[serde(alias = "delayBeetweenChunksInSeconds")]
    pub delay_between_chunks_in_seconds: Option<u64>,
    pub chunk_size: Option<u64>,
    pub chunk_timeout_seconds: Option<u64>,
    pub retry_backoff_seconds: Option<u64>,
    pub max_attempts: Option<u32>,
    pub pause_at_end: Option<bool>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub force_path_style: Option<bool>,
}

/// Everything a download needs, validated.
#[derive(Clone)]
pub struct ResolvedDownload {
    pub object: ObjectId,
    pub local_file: PathBuf,
    pub config: DownloadConfig,
    pub options: TransferOptions,
    pub pause_at_end: bool,
}

impl DownloadSettings {
    /// Loads the settings file, or empty settings when no file is given.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file {}: {}", path.display(), e))?;
        Self::parse(&content)
            .map_err(|e| format!("Invalid settings file {}: {}", path.display(), e).into())
    }

    /// JSON when the content starts with `{`, `key=value` lines otherwise.
    pub fn parse(content: &str) -> AppResult<Self> {
        if content.trim_start().starts_with('{') {
            Self::from_json(content)
        } else {
            Self::from_key_values(content)
        }
    }

    pub fn from_json(content: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads `key=value` lines using the same camelCase keys as the JSON form.
    /// Blank lines, `#`/`;` comments and `[section]` headers are skipped.
    pub fn from_key_values(content: &str) -> AppResult<Self> {
        let mut map = serde_json::Map::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(['#', ';', '[']) {
                continue;
            }
            // Split on the first '=' only; base64 keys end with '='.
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| format!("line {}: expected key=value", index + 1))?;
            let (key, value) = (key.trim(), value.trim());
            let value = if BOOL_KEYS.contains(&key) {
                parse_bool(value)
                    .map(serde_json::Value::Bool)
                    .ok_or_else(|| format!("line {}: {} must be true or false", index + 1, key))?
            } else if NUMBER_KEYS.contains(&key) {
                value
                    .parse::<u64>()
                    .map(serde_json::Value::from)
                    .map_err(|e| format!("line {}: {}: {}", index + 1, key, e))?
            } else if key == "provider" {
                serde_json::Value::String(value.to_ascii_lowercase())
            } else {
                serde_json::Value::String(value.to_string())
            };
            map.insert(key.to_string(), value);
        }
        Ok(serde_json::from_value(serde_json::Value::Object(map))?)
    }

    /// Engine options; unset values keep the engine defaults.
    pub fn transfer_options(&self) -> TransferOptions {
        let defaults = TransferOptions::default();
        TransferOptions {
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            delay_between_chunks: self
                .delay_between_chunks_in_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.delay_between_chunks),
            chunk_timeout: self
                .chunk_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.chunk_timeout),
            retry_backoff: self
                .retry_backoff_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.retry_backoff),
            retry_on_error: self.retry_on_error.unwrap_or(defaults.retry_on_error),
            max_attempts: self.max_attempts.or(defaults.max_attempts),
        }
    }

    /// Validates the settings and builds the provider configuration.
    pub fn resolve(&self) -> AppResult<ResolvedDownload> {
        let blob_url = self
            .blob_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or("blobUrl is required")?;
        let location = BlobLocation::parse(blob_url)?;
        let local_file = self
            .local_file_path
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or("localFilePath is required")?;

        if let Some(kind) = self.blob_is_block_or_page.as_deref() {
            if !kind.eq_ignore_ascii_case("block") && !kind.eq_ignore_ascii_case("page") {
                return Err(format!("blobIsBlockOrPage must be Block or Page, got '{}'", kind).into());
            }
        }

        let options = self.transfer_options();
        options.validate()?;

        let provider = self.provider.unwrap_or(match location.kind {
            LocationKind::Azure => Provider::Azure,
            LocationKind::S3 => Provider::S3,
        });
        let object = location.object_id();
        let config = match (provider, location.kind) {
            (Provider::Azure, LocationKind::Azure) => DownloadConfig::Azure(AzureConfig {
                location,
                account_key: self.account_key.clone(),
            }),
            (Provider::S3, LocationKind::S3) => DownloadConfig::S3(S3Config {
                location,
                region: self
                    .region
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REGION.to_string()),
                endpoint: self.endpoint.clone(),
                access_key_id: self.access_key_id.clone().unwrap_or_default(),
                secret_access_key: self.secret_access_key.clone().unwrap_or_default(),
                force_path_style: self.force_path_style.unwrap_or(false),
            }),
            (Provider::Azure, LocationKind::S3) => {
                return Err("The azure provider needs an http(s) blob URL, not s3://".into())
            }
            (Provider::S3, LocationKind::Azure) => {
                return Err("The s3 provider needs an s3://bucket/key URL".into())
            }
        };

        Ok(ResolvedDownload {
            object,
            local_file,
            config,
            options,
            pause_at_end: self.pause_at_end.unwrap_or(false),
        })
    }

    /// Logs the effective settings with secrets masked.
    pub fn log_summary(&self) {
        let options = self.transfer_options();
        info!("Blob URL: {}", self.blob_url.as_deref().unwrap_or(""));
        if let Some(key) = &self.account_key {
            info!("Account key: {}", mask_secret(key));
        }
        if let Some(secret) = &self.secret_access_key {
            info!("Secret access key: {}", mask_secret(secret));
        }
        info!(
            "Local file: {}",
            self.local_file_path
                .as_deref()
                .map(|path| path.display().to_string())
                .unwrap_or_default()
        );
        info!("Retry on error: {}", options.retry_on_error);
        info!(
            "Delay between chunks: {} seconds",
            options.delay_between_chunks.as_secs()
        );
        info!("Chunk size: {} bytes", options.chunk_size);
        info!("Chunk timeout: {} seconds", options.chunk_timeout.as_secs());
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// First characters of a secret followed by a marker, never the full value.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(VISIBLE_SECRET_CHARS).collect();
    if visible.len() < secret.len() {
        format!("{}...hidden", visible)
    } else {
        "...hidden".to_string()
    }
}
