use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use std::time::Duration;

use crate::config::UploaderConfig;
use crate::error::UploadError;

/// One outbound transmission. Consumed by `ApiClient::post_image`.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub image_data: Vec<u8>,
    pub file_name: String,
}

/// Outcome handed to `ImgurUploader::handle_reply`: the raw body, or the
/// transport's error.
pub type Reply = std::result::Result<Vec<u8>, UploadError>;

pub struct ApiClient {
    client: Client,
    upload_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(config: &UploaderConfig) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(format!("imgbb-uploader/{}", env!("CARGO_PKG_VERSION")));

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> std::result::Result<Url, UploadError> {
        Url::parse_with_params(&self.upload_url, &[("key", self.api_key.as_str())])
            .map_err(|e| UploadError::Transport(format!("Invalid upload URL: {}", e)))
    }

    pub async fn post_image(&self, request: UploadRequest) -> Reply {
        let url = self.endpoint()?;

        let part = Part::bytes(request.image_data)
            .file_name(request.file_name)
            .mime_str("image/png")
            .map_err(|e| self.transport_error(e))?;
        let form = Form::new().part("image", part);

        // Never log the full URL, it carries the key
        log::info!("Posting capture to {}", self.upload_url);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| self.transport_error(e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        Ok(body.to_vec())
    }

    fn transport_error(&self, err: reqwest::Error) -> UploadError {
        match UploadError::from_transport(err) {
            UploadError::Transport(message) if !self.api_key.is_empty() => {
                UploadError::Transport(message.replace(&self.api_key, "[redacted]"))
            }
            other => other,
        }
    }
}
