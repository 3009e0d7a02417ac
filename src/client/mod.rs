//! Browser-side workflow: form state, preview and download, expressed against
//! small traits so the same controller runs against the real gateway or a
//! scripted stand-in.

pub mod api;
pub mod blob;
pub mod download;
pub mod notify;
pub mod session;

pub use api::{ClientError, GatewayClient, StickerApi};
pub use blob::{BlobHandle, BlobRegistry, MemoryBlobRegistry};
pub use download::{DirectorySink, DownloadSink};
pub use notify::{LogNotifier, Notifier};
pub use session::{ActionOutcome, ClientState, SessionController, SessionSnapshot};
