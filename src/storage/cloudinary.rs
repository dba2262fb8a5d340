//! Cloudinary media store.
//!
//! Uses the signed upload and destroy endpoints of the Cloudinary REST API.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{public_id_from_url, MediaStore};
use crate::config::CloudinaryConfig;
use crate::{ClassHubError, Result};

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Media store backed by a Cloudinary account.
#[derive(Clone)]
pub struct CloudinaryStore {
    client: Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    delete_resource_type: String,
}

impl CloudinaryStore {
    /// Create a store from the `[storage.cloudinary]` section.
    pub fn new(config: &CloudinaryConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassHubError::Storage(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            delete_resource_type: config.delete_resource_type.clone(),
        })
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!("{}/{}/{}/{}", self.api_base, self.cloud_name, resource_type, action)
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    /// Sign a set of request parameters.
    ///
    /// Parameters are sorted by name, joined as `k=v` pairs with `&`, suffixed
    /// with the API secret and hashed with SHA-256.
    pub fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let joined = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let digest = Sha256::digest(format!("{joined}{}", self.api_secret).as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    async fn destroy(&self, public_id: &str, resource_type: &str) -> Result<()> {
        let timestamp = Self::timestamp();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let params = [
            ("public_id", public_id),
            ("api_key", self.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .client
            .post(self.endpoint(resource_type, "destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| ClassHubError::Storage(format!("destroy request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ClassHubError::Storage(Self::error_message(response).await));
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| ClassHubError::Storage(format!("invalid destroy response: {e}")))?;

        if body.result != "ok" {
            return Err(ClassHubError::Storage(format!(
                "destroy of {public_id} returned {:?}",
                body.result
            )));
        }

        debug!(public_id, resource_type, "Deleted from Cloudinary");
        Ok(())
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => format!("{} (status: {status})", body.error.message),
            Err(_) => format!("HTTP error: {status}"),
        }
    }
}

/// Resource type (`image`, `video` or `raw`) of a delivery URL, read from
/// the path segment before `upload`.
fn resource_type_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    segments
        .windows(2)
        .find(|pair| pair[1] == "upload" && matches!(pair[0], "image" | "video" | "raw"))
        .map(|pair| pair[0].to_string())
}

fn raw_public_id_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    (!last.is_empty()).then(|| last.to_string())
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ClassHubError::Storage(format!("failed to read {}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload")
            .to_string();

        let timestamp = Self::timestamp();
        let signature = self.sign(&[("timestamp", &timestamp)]);

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClassHubError::Storage(format!("upload request failed: {e}")))?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            warn!(path = %path.display(), error = %message, "Cloudinary upload rejected");
            return Err(ClassHubError::Storage(message));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ClassHubError::Storage(format!("invalid upload response: {e}")))?;

        let url = body
            .secure_url
            .or(body.url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ClassHubError::Storage("upload response has no URL".to_string()))?;

        debug!(url = %url, "Uploaded to Cloudinary");
        Ok(url)
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        self.destroy(public_id, &self.delete_resource_type).await
    }

    async fn delete_url(&self, url: &str) -> Result<()> {
        let Some(resource_type) = resource_type_from_url(url) else {
            return self.delete(&public_id_from_url(url)).await;
        };
        // Raw assets keep their extension in the public id.
        let public_id = if resource_type == "raw" {
            raw_public_id_from_url(url).unwrap_or_else(|| public_id_from_url(url))
        } else {
            public_id_from_url(url)
        };
        self.destroy(&public_id, &resource_type).await
    }

    fn name(&self) -> &'static str {
        "cloudinary"
    }
}
