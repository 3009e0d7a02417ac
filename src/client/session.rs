//! Client session controller: owns the form state and drives the preview and
//! download flows against a [`StickerApi`].
//!
//! Each flow validates first, then performs exactly one network call, then
//! applies the result. Flows may overlap; every flow carries a sequence number
//! and a response is dropped when a newer request of the same kind was issued
//! in the meantime. Downloads of different formats count as different kinds.
//! The loading flag stays set while any flow is in flight.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::client::api::StickerApi;
use crate::client::blob::{BlobHandle, BlobRegistry};
use crate::client::download::DownloadSink;
use crate::client::notify::{
    LogNotifier, Notifier, DOWNLOAD_FAILED, FIX_FORM_ERRORS, PREVIEW_FAILED, PREVIEW_READY,
};
use crate::sticker::models::{GenerationRequest, OutputFormat};
use crate::validation::{ContactRules, ValidationErrors};

/// Mutable form state of one session.
#[derive(Debug, Default)]
pub struct ClientState {
    pub name: String,
    pub phone: String,
    pub errors: ValidationErrors,
    pub loading: bool,
    preview: Option<BlobHandle>,
    in_flight: usize,
}

/// Read-only copy of [`ClientState`] for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub name: String,
    pub phone: String,
    pub errors: ValidationErrors,
    pub loading: bool,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Input did not pass validation; no request was sent.
    Rejected(ValidationErrors),
    Completed,
    /// Request or save failed; the user was notified.
    Failed,
    /// A newer request of the same kind was issued before this one finished.
    Superseded,
}

/// Clears the loading flag when the last in-flight action ends, however it ends.
struct LoadingGuard<'a> {
    state: &'a Mutex<ClientState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.loading = state.in_flight > 0;
    }
}

pub struct SessionController {
    api: Arc<dyn StickerApi>,
    blobs: Arc<dyn BlobRegistry>,
    sink: Arc<dyn DownloadSink>,
    notifier: Arc<dyn Notifier>,
    rules: ContactRules,
    state: Mutex<ClientState>,
    preview_seq: AtomicU64,
    /// One sequence per output format, indexed by [`download_slot`].
    download_seq: [AtomicU64; 2],
}

fn download_slot(format: OutputFormat) -> usize {
    match format {
        OutputFormat::Png => 0,
        OutputFormat::Pdf => 1,
    }
}

impl SessionController {
    pub fn new(
        api: Arc<dyn StickerApi>,
        blobs: Arc<dyn BlobRegistry>,
        sink: Arc<dyn DownloadSink>,
    ) -> Self {
        Self {
            api,
            blobs,
            sink,
            notifier: Arc::new(LogNotifier),
            rules: ContactRules::default(),
            state: Mutex::new(ClientState::default()),
            preview_seq: AtomicU64::new(0),
            download_seq: [AtomicU64::new(0), AtomicU64::new(0)],
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_rules(mut self, rules: ContactRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.state.lock().name = name.into();
    }

    pub fn set_phone(&self, phone: impl Into<String>) {
        self.state.lock().phone = phone.into();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            name: state.name.clone(),
            phone: state.phone.clone(),
            errors: state.errors.clone(),
            loading: state.loading,
            preview_url: state.preview.as_ref().map(|p| p.url().to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn errors(&self) -> ValidationErrors {
        self.state.lock().errors.clone()
    }

    pub fn preview_url(&self) -> Option<String> {
        self.state.lock().preview.as_ref().map(|p| p.url().to_string())
    }

    /// Release the preview handle at the end of the session.
    pub fn teardown(&self) {
        let preview = self.state.lock().preview.take();
        if let Some(preview) = preview {
            preview.release();
        }
    }

    /// Render a PNG preview of the current form values.
    pub async fn generate_preview(&self) -> ActionOutcome {
        let (request, ticket, _loading) = match self.begin(&self.preview_seq) {
            Ok(started) => started,
            Err(errors) => return ActionOutcome::Rejected(errors),
        };

        let result = self.api.generate(OutputFormat::Png, &request).await;

        let outcome = {
            let mut state = self.state.lock();
            if self.preview_seq.load(Ordering::SeqCst) != ticket {
                log::debug!("Dropping stale preview response #{}", ticket);
                return ActionOutcome::Superseded;
            }
            match result {
                Ok(result) => {
                    if let Some(old) = state.preview.take() {
                        old.release();
                    }
                    let handle =
                        BlobHandle::acquire(self.blobs.clone(), result.body, &result.content_type);
                    log::info!("Preview ready at {}", handle.url());
                    state.preview = Some(handle);
                    ActionOutcome::Completed
                }
                Err(e) => {
                    log::warn!("Preview generation failed: {}", e);
                    ActionOutcome::Failed
                }
            }
        };

        match outcome {
            ActionOutcome::Completed => self.notifier.success(PREVIEW_READY),
            _ => self.notifier.error(PREVIEW_FAILED),
        }
        outcome
    }

    /// Fetch the sticker in `format` and hand it to the download sink.
    pub async fn download(&self, format: OutputFormat) -> ActionOutcome {
        let seq = &self.download_seq[download_slot(format)];
        let (request, ticket, _loading) = match self.begin(seq) {
            Ok(started) => started,
            Err(errors) => return ActionOutcome::Rejected(errors),
        };

        let result = self.api.generate(format, &request).await;

        if seq.load(Ordering::SeqCst) != ticket {
            log::debug!("Dropping stale {} download #{}", format, ticket);
            return ActionOutcome::Superseded;
        }

        let saved = match result {
            Ok(result) => {
                let blob = BlobHandle::acquire(self.blobs.clone(), result.body, &result.content_type);
                let saved = self.sink.save(&blob, &format.download_filename());
                blob.release();
                saved.map_err(|e| log::warn!("Saving {} download failed: {}", format, e))
            }
            Err(e) => {
                log::warn!("{} download failed: {}", format, e);
                Err(())
            }
        };

        match saved {
            Ok(()) => ActionOutcome::Completed,
            Err(()) => {
                self.notifier.error(DOWNLOAD_FAILED);
                ActionOutcome::Failed
            }
        }
    }

    /// Validation gate shared by both flows. On success the action is counted
    /// as in flight until the returned guard drops.
    fn begin(
        &self,
        seq: &AtomicU64,
    ) -> Result<(GenerationRequest, u64, LoadingGuard<'_>), ValidationErrors> {
        let mut state = self.state.lock();

        let errors = self.rules.check(&state.name, &state.phone);
        if !errors.is_empty() {
            state.errors = errors.clone();
            drop(state);
            self.notifier.error(FIX_FORM_ERRORS);
            return Err(errors);
        }

        state.errors = ValidationErrors::new();
        state.in_flight += 1;
        state.loading = true;
        let ticket = seq.fetch_add(1, Ordering::SeqCst) + 1;
        let request = GenerationRequest::new(state.name.clone(), state.phone.clone());

        Ok((
            request,
            ticket,
            LoadingGuard {
                state: &self.state,
            },
        ))
    }
}
