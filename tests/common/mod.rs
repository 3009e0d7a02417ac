#![allow(dead_code)]

use actix_web::web::Bytes;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;

use sticker_gateway::client::{
    BlobHandle, ClientError, DownloadSink, MemoryBlobRegistry, Notifier, SessionController,
    StickerApi,
};
use sticker_gateway::sticker::{GenerationRequest, GenerationResult, OutputFormat};

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-sticker";
pub const PDF_BYTES: &[u8] = b"%PDF-1.4 fake-sticker";

pub enum Reply {
    Ok(&'static [u8], &'static str),
    Status(u16),
}

struct Step {
    reply: Reply,
    gate: Option<oneshot::Receiver<()>>,
}

/// Replays canned replies in order and records every call it receives.
#[derive(Default)]
pub struct ScriptedApi {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(OutputFormat, GenerationRequest)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, reply: Reply) {
        self.steps.lock().push_back(Step { reply, gate: None });
    }

    /// Queue a reply that is held back until the returned sender fires.
    pub fn gated_reply(&self, reply: Reply) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.steps.lock().push_back(Step {
            reply,
            gate: Some(rx),
        });
        tx
    }

    pub fn calls(&self) -> Vec<(OutputFormat, GenerationRequest)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl StickerApi for ScriptedApi {
    async fn generate(
        &self,
        format: OutputFormat,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ClientError> {
        self.calls.lock().push((format, request.clone()));
        let step = self
            .steps
            .lock()
            .pop_front()
            .expect("no scripted reply left");

        if let Some(gate) = step.gate {
            let _ = gate.await;
        }

        match step.reply {
            Reply::Ok(body, content_type) => Ok(GenerationResult {
                status: 200,
                content_type: content_type.to_string(),
                body: Bytes::from_static(body),
            }),
            Reply::Status(code) => Err(ClientError::Status(code)),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub successes: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

/// Keeps saved downloads in memory, noting which blobs were live at save time.
pub struct MemorySink {
    saved: Mutex<Vec<SavedFile>>,
    registry: Arc<MemoryBlobRegistry>,
    fail: bool,
}

#[derive(Debug, Clone)]
pub struct SavedFile {
    pub filename: String,
    pub url: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub was_live: bool,
    pub live_blobs: usize,
}

impl MemorySink {
    pub fn new(registry: Arc<MemoryBlobRegistry>, fail: bool) -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            registry,
            fail,
        }
    }

    pub fn saved(&self) -> Vec<SavedFile> {
        self.saved.lock().clone()
    }
}

impl DownloadSink for MemorySink {
    fn save(&self, blob: &BlobHandle, filename: &str) -> std::io::Result<()> {
        if self.fail {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            ));
        }
        self.saved.lock().push(SavedFile {
            filename: filename.to_string(),
            url: blob.url().to_string(),
            content_type: blob.content_type().to_string(),
            data: blob.data().to_vec(),
            was_live: self.registry.is_live(blob.url()),
            live_blobs: self.registry.live_count(),
        });
        Ok(())
    }
}

pub struct Harness {
    pub api: Arc<ScriptedApi>,
    pub blobs: Arc<MemoryBlobRegistry>,
    pub sink: Arc<MemorySink>,
    pub notifier: Arc<RecordingNotifier>,
    pub controller: SessionController,
}

pub fn harness() -> Harness {
    build_harness(false)
}

pub fn harness_with_failing_sink() -> Harness {
    build_harness(true)
}

fn build_harness(fail_saves: bool) -> Harness {
    let api = Arc::new(ScriptedApi::new());
    let blobs = Arc::new(MemoryBlobRegistry::new());
    let sink = Arc::new(MemorySink::new(blobs.clone(), fail_saves));
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = SessionController::new(api.clone(), blobs.clone(), sink.clone())
        .with_notifier(notifier.clone());
    Harness {
        api,
        blobs,
        sink,
        notifier,
        controller,
    }
}
