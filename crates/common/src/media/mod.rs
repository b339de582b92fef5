//! Media store client (ImageKit)
//!
//! Uploads binary artifacts to the external object store/CDN, deletes them
//! by identifier, and mints the short-lived upload-auth parameters handed to
//! upload clients. Filename uniqueness is disabled on upload, so re-uploading
//! the same name overwrites the stored object.

use crate::config::MediaConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Short-lived upload-auth parameters.
///
/// `signature` is the hex HMAC-SHA256 of `token + expire` under the private
/// key, so the media store can verify the grant without a callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthParams {
    pub token: String,
    pub expire: u64,
    pub signature: String,
    pub public_key: String,
    pub url_endpoint: String,
}

/// Result of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedMedia {
    pub url: String,
    pub file_id: String,
    pub path: String,
}

/// Per-identifier outcome of a best-effort delete
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub file_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Trait for media store access.
///
/// `delete` returns `Err` only for configuration failures; remote refusals
/// for a single identifier come back as an unsuccessful [`DeleteOutcome`]
/// so callers can continue the batch.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Mint upload-auth parameters; one set per orchestrated operation.
    fn auth_params(&self) -> Result<AuthParams>;

    /// Upload one file into `folder` under `file_name`.
    async fn upload(
        &self,
        auth: &AuthParams,
        bytes: Vec<u8>,
        file_name: &str,
        folder: &str,
        tags: &str,
    ) -> Result<UploadedMedia>;

    /// Delete one stored file by identifier.
    async fn delete(&self, file_id: &str) -> Result<DeleteOutcome>;
}

/// Remote upload response. The service has historically answered with both
/// camelCase and snake_case key spellings, so both are accepted.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
    #[serde(rename = "fileId", alias = "file_id")]
    file_id: String,
    #[serde(rename = "filePath", alias = "file_path", default)]
    file_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    #[serde(default)]
    message: Option<String>,
}

/// ImageKit-backed media store client
#[derive(Clone)]
pub struct ImageKitClient {
    http: reqwest::Client,
    config: MediaConfig,
}

impl ImageKitClient {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn private_key(&self) -> Result<&str> {
        self.config
            .private_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration {
                message: "Missing media store private key".into(),
            })
    }

    fn public_key(&self) -> Result<&str> {
        self.config
            .public_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration {
                message: "Missing media store public key".into(),
            })
    }

    fn url_endpoint(&self) -> Result<&str> {
        self.config
            .url_endpoint
            .as_deref()
            .ok_or_else(|| AppError::Configuration {
                message: "Missing media store URL endpoint".into(),
            })
    }

    async fn remote_message(response: reqwest::Response) -> String {
        response
            .json::<RemoteError>()
            .await
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| "Remote request failed".into())
    }
}

/// Derive a media-store path from a public URL's pathname. Used when a
/// caller hands over a URL without the path the upload response carried.
pub fn path_from_url(url: &str) -> Option<String> {
    reqwest::Url::parse(url).ok().map(|u| u.path().to_string())
}

/// Compute the upload-auth signature for a token + expiry pair.
pub fn sign_auth(private_key: &str, token: &str, expire: u64) -> Result<String> {
    let mut mac =
        HmacSha256::new_from_slice(private_key.as_bytes()).map_err(|_| AppError::Internal {
            message: "Invalid signing key".into(),
        })?;
    mac.update(token.as_bytes());
    mac.update(expire.to_string().as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl MediaStore for ImageKitClient {
    fn auth_params(&self) -> Result<AuthParams> {
        let private_key = self.private_key()?;
        let public_key = self.public_key()?.to_string();
        let url_endpoint = self.url_endpoint()?.to_string();

        let token = Uuid::new_v4().to_string();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Internal {
                message: e.to_string(),
            })?
            .as_secs();
        let expire = now + self.config.auth_expiry_secs;
        let signature = sign_auth(private_key, &token, expire)?;

        Ok(AuthParams {
            token,
            expire,
            signature,
            public_key,
            url_endpoint,
        })
    }

    async fn upload(
        &self,
        auth: &AuthParams,
        bytes: Vec<u8>,
        file_name: &str,
        folder: &str,
        tags: &str,
    ) -> Result<UploadedMedia> {
        debug!(file_name, folder, size_bytes = bytes.len(), "Uploading to media store");

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("fileName", file_name.to_string())
            .text("folder", folder.to_string())
            .text("useUniqueFileName", "false")
            .text("tags", tags.to_string())
            .text("publicKey", auth.public_key.clone())
            .text("token", auth.token.clone())
            .text("expire", auth.expire.to_string())
            .text("signature", auth.signature.clone());

        let response = self
            .http
            .post(&self.config.upload_url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Upstream {
                service: "imagekit".into(),
                message: Self::remote_message(response).await,
            });
        }

        let body: UploadResponse = response.json().await?;

        // The path is required downstream for original/archive rows; fall
        // back to the URL pathname when the response omits it.
        let path = match body.file_path {
            Some(p) => p,
            None => path_from_url(&body.url).ok_or_else(|| AppError::Upstream {
                service: "imagekit".into(),
                message: format!("Upload response carried an unparseable url: {}", body.url),
            })?,
        };

        Ok(UploadedMedia {
            url: body.url,
            file_id: body.file_id,
            path,
        })
    }

    async fn delete(&self, file_id: &str) -> Result<DeleteOutcome> {
        let private_key = self.private_key()?.to_string();

        let url = format!("{}/files/{}", self.config.api_url, file_id);
        let result = self
            .http
            .delete(&url)
            .basic_auth(&private_key, Some(""))
            .send()
            .await;

        let outcome = match result {
            Ok(response) if response.status().is_success() => DeleteOutcome {
                file_id: file_id.to_string(),
                success: true,
                error: None,
            },
            Ok(response) => DeleteOutcome {
                file_id: file_id.to_string(),
                success: false,
                error: Some(Self::remote_message(response).await),
            },
            Err(e) => DeleteOutcome {
                file_id: file_id.to_string(),
                success: false,
                error: Some(e.to_string()),
            },
        };

        if !outcome.success {
            warn!(
                file_id,
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "Media delete failed"
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> MediaConfig {
        MediaConfig {
            private_key: Some("private_test_key".into()),
            public_key: Some("public_test_key".into()),
            url_endpoint: Some("https://ik.example.com/demo".into()),
            upload_url: "https://upload.example.com/upload".into(),
            api_url: "https://api.example.com/v1".into(),
            auth_expiry_secs: 2400,
        }
    }

    #[test]
    fn test_auth_params_are_signed() {
        let client = ImageKitClient::new(test_config());
        let auth = client.auth_params().unwrap();

        assert_eq!(auth.public_key, "public_test_key");
        assert_eq!(auth.url_endpoint, "https://ik.example.com/demo");
        // Signature must verify against the returned token + expire.
        let expected = sign_auth("private_test_key", &auth.token, auth.expire).unwrap();
        assert_eq!(auth.signature, expected);
    }

    #[test]
    fn test_auth_expiry_window() {
        let client = ImageKitClient::new(test_config());
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let auth = client.auth_params().unwrap();
        assert!(auth.expire >= now + 2400 && auth.expire <= now + 2410);
    }

    #[test]
    fn test_auth_params_require_credentials() {
        let client = ImageKitClient::new(MediaConfig {
            private_key: None,
            ..test_config()
        });
        let err = client.auth_params().unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_path_from_url() {
        assert_eq!(
            path_from_url("https://ik.example.com/news/2024/05/01/x.pdf").as_deref(),
            Some("/news/2024/05/01/x.pdf")
        );
        assert_eq!(path_from_url("not a url"), None);
    }

    #[test]
    fn test_signature_is_deterministic() {
        let a = sign_auth("key", "token", 1700000000).unwrap();
        let b = sign_auth("key", "token", 1700000000).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, sign_auth("key", "token", 1700000001).unwrap());
    }
}
