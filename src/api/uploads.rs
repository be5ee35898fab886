use anyhow::Result;
use image::DynamicImage;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::client::{ApiClient, Reply, UploadRequest};
use crate::config::UploaderConfig;
use crate::error::UploadError;
use crate::screenshots::encoding;
use crate::storage::history::History;
use crate::utils::browser::{SystemBrowser, UrlOpener};
use crate::utils::filename::FilenameHandler;
use crate::utils::notification::{LogNotifier, Notifier};

/// Provider tag written into every history identifier.
pub const PROVIDER: &str = "imgur";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// Any loading indicator for the upload can go away.
    LoadingFinished,
    UploadSucceeded(String),
    UploadFailed(String),
    DeletionCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploaderState {
    Idle,
    AwaitingReply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub url: String,
    pub delete_token: String,
}

struct SharedState {
    status: UploaderState,
    image_url: String,
    display_name: String,
    history_name: String,
    capture_data: Vec<u8>,
}

struct UploaderInner {
    config: UploaderConfig,
    client: ApiClient,
    filename: FilenameHandler,
    history: Arc<dyn History>,
    notifier: Arc<dyn Notifier>,
    browser: Arc<dyn UrlOpener>,
    events: UnboundedSender<UploadEvent>,
    state: Mutex<SharedState>,
}

/// imgbb upload backend. Cloning yields another handle to the same uploader.
#[derive(Clone)]
pub struct ImgurUploader {
    inner: Arc<UploaderInner>,
}

impl ImgurUploader {
    pub fn new(
        config: UploaderConfig,
        history: Arc<dyn History>,
    ) -> Result<(Self, UnboundedReceiver<UploadEvent>)> {
        Self::with_collaborators(
            config,
            history,
            Arc::new(LogNotifier::new()),
            Arc::new(SystemBrowser::default()),
        )
    }

    pub fn with_collaborators(
        config: UploaderConfig,
        history: Arc<dyn History>,
        notifier: Arc<dyn Notifier>,
        browser: Arc<dyn UrlOpener>,
    ) -> Result<(Self, UnboundedReceiver<UploadEvent>)> {
        let client = ApiClient::new(&config)?;
        let filename = FilenameHandler::new(&config.filename_pattern);
        let (events, receiver) = mpsc::unbounded_channel();

        let inner = UploaderInner {
            config,
            client,
            filename,
            history,
            notifier,
            browser,
            events,
            state: Mutex::new(SharedState {
                status: UploaderState::Idle,
                image_url: String::new(),
                display_name: String::new(),
                history_name: String::new(),
                capture_data: Vec::new(),
            }),
        };

        Ok((
            Self {
                inner: Arc::new(inner),
            },
            receiver,
        ))
    }

    pub fn state(&self) -> UploaderState {
        self.lock_state().status
    }

    /// Hosted URL of the last successful upload.
    pub fn image_url(&self) -> String {
        self.lock_state().image_url.clone()
    }

    pub fn display_name(&self) -> String {
        self.lock_state().display_name.clone()
    }

    /// Packed history identifier of the last successful upload.
    pub fn history_name(&self) -> String {
        self.lock_state().history_name.clone()
    }

    /// Encodes the capture and posts it in the background. The outcome
    /// arrives on the event channel; only rejections before anything is sent
    /// are returned here.
    pub async fn upload(&self, capture: &DynamicImage) -> Result<(), UploadError> {
        let image_data = encoding::encode_png(capture)?;

        {
            let mut state = self.lock_state();
            if state.status == UploaderState::AwaitingReply {
                log::warn!("Upload requested while another one is in flight");
                return Err(UploadError::Busy);
            }
            state.status = UploaderState::AwaitingReply;
            state.capture_data = image_data.clone();
        }

        let request = UploadRequest {
            image_data,
            file_name: self.inner.filename.pattern(),
        };
        log::debug!(
            "Uploading {} ({} bytes)",
            request.file_name,
            request.image_data.len()
        );

        let uploader = self.clone();
        let request_task = tokio::spawn(async move {
            let reply = uploader.inner.client.post_image(request).await;
            uploader.handle_reply(reply);
        });

        // A task that dies before replying must not leave us AwaitingReply
        let watcher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = request_task.await {
                log::error!("Upload task failed: {}", e);
                watcher.handle_reply(Err(UploadError::Transport(format!(
                    "Upload task ended without a reply: {}",
                    e
                ))));
            }
        });

        Ok(())
    }

    /// Completes an upload. Not idempotent: delivering the same reply twice
    /// records it in history twice.
    pub fn handle_reply(&self, reply: Reply) {
        self.emit(UploadEvent::LoadingFinished);

        let capture_data = {
            let mut state = self.lock_state();
            state.display_name.clear();
            state.history_name.clear();
            state.status = UploaderState::Idle;
            state.capture_data.clone()
        };

        let strict = self.inner.config.strict_response;
        match reply.and_then(|body| parse_response(&body, strict)) {
            Ok(response) => self.record_success(response, &capture_data),
            Err(e) => {
                log::error!("Upload failed: {}", e);
                self.emit(UploadEvent::UploadFailed(e.to_string()));
            }
        }
    }

    fn record_success(&self, response: UploadResponse, capture_data: &[u8]) {
        let display_name = display_file_name(&response.url).to_string();
        let history_name =
            self.inner
                .history
                .pack_file_name(PROVIDER, &response.delete_token, &display_name);

        {
            let mut state = self.lock_state();
            state.image_url = response.url.clone();
            state.display_name = display_name;
            state.history_name = history_name.clone();
        }

        if let Err(e) = self.inner.history.save(capture_data, &history_name) {
            log::error!("{}", UploadError::History(e));
        }

        log::info!("Upload finished: {}", response.url);
        self.emit(UploadEvent::UploadSucceeded(response.url));
    }

    /// Opens the provider's deletion page. The file name is unused because
    /// deletion is driven by the token alone. Completion is reported even
    /// when no browser could be launched.
    pub fn delete_image(&self, _file_name: &str, delete_token: &str) {
        let url = self.inner.config.delete_url(delete_token);

        if let Err(e) = self.inner.browser.open_url(&url) {
            log::error!("Failed to open {}: {}", url, e);
            self.inner
                .notifier
                .show_message(&UploadError::DeletionUnreachable.to_string());
        }

        self.emit(UploadEvent::DeletionCompleted);
    }

    fn emit(&self, event: UploadEvent) {
        if self.inner.events.send(event).is_err() {
            log::debug!("No listener for upload events");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SharedState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Last path segment of the hosted URL, or the whole URL without a `/`.
pub fn display_file_name(url: &str) -> &str {
    match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    }
}

/// Reads `data.url` and `data.deletehash`. In permissive mode anything
/// unreadable degrades to empty fields.
pub fn parse_response(body: &[u8], strict: bool) -> Result<UploadResponse, UploadError> {
    let json: Value = match serde_json::from_slice(body) {
        Ok(json) => json,
        Err(e) if strict => return Err(UploadError::MalformedResponse(e.to_string())),
        Err(e) => {
            log::warn!("Upload response is not JSON: {}", e);
            Value::Null
        }
    };

    let data = &json["data"];
    let url = data["url"].as_str().unwrap_or_default().to_string();
    let delete_token = data["deletehash"].as_str().unwrap_or_default().to_string();

    if url.is_empty() && strict {
        return Err(UploadError::MalformedResponse(
            "missing data.url".to_string(),
        ));
    }

    if delete_token.is_empty() {
        log::warn!("Upload response has no delete hash");
    }

    Ok(UploadResponse { url, delete_token })
}
