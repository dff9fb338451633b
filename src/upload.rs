use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::debug;

use crate::error::UploadError;
use crate::record::Photo;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Unsigned Cloudinary image upload.
///
/// The collaborator is opaque to the rest of the system: it takes image bytes
/// and yields the three-URL photo structure, which is stored verbatim and
/// never fetched or inspected afterwards.
#[derive(Debug, Clone)]
pub struct CloudinaryUploader {
    client: reqwest::Client,
    cloud_name: String,
    upload_preset: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

impl CloudinaryUploader {
    pub fn new(
        cloud_name: impl Into<String>,
        upload_preset: impl Into<String>,
    ) -> Result<Self, UploadError> {
        // An explicit timeout: an upload that exceeds it is an UploadError,
        // never a hung submission.
        let client = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(CloudinaryUploader {
            client,
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        )
    }

    /// Upload an image and return the stored photo variant.
    ///
    /// Transient failures (timeout, transport, 5xx) are retried with capped
    /// exponential backoff; client errors are surfaced immediately.
    pub async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<Photo, UploadError> {
        let url = self.endpoint();
        let strategy = ExponentialBackoff::from_millis(500).map(jitter).take(2);

        RetryIf::spawn(
            strategy,
            || self.try_upload(&url, bytes.clone(), filename),
            |err: &UploadError| is_transient(err),
        )
        .await
    }

    async fn try_upload(
        &self,
        url: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<Photo, UploadError> {
        debug!(url, filename, size = bytes.len(), "uploading photo");

        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status.as_u16()));
        }

        let body: UploadResponse = response.json().await.map_err(map_reqwest)?;
        let secure_url = body.secure_url.ok_or(UploadError::MalformedResponse)?;
        Ok(asset_from_secure_url(&secure_url))
    }
}

fn map_reqwest(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        UploadError::Timeout
    } else {
        UploadError::Transport(err)
    }
}

fn is_transient(err: &UploadError) -> bool {
    match err {
        UploadError::Timeout | UploadError::Transport(_) => true,
        UploadError::Status(code) => *code >= 500,
        UploadError::MalformedResponse => false,
    }
}

/// Derive the optimized and thumbnail renditions from Cloudinary's secure
/// URL by splicing transform segments into the upload path.
pub fn asset_from_secure_url(secure_url: &str) -> Photo {
    Photo::Asset {
        original: secure_url.to_string(),
        optimized: secure_url.replacen("/upload/", "/upload/q_auto,f_auto,w_800/", 1),
        thumbnail: secure_url.replacen("/upload/", "/upload/c_fill,w_200,h_200,q_auto/", 1),
    }
}
