//! User-visible notices raised by the session controller.

pub const FIX_FORM_ERRORS: &str = "Lütfen formdaki hataları düzeltin.";
pub const PREVIEW_READY: &str = "Önizleme hazır";
pub const PREVIEW_FAILED: &str = "Sticker oluşturulamadı";
pub const DOWNLOAD_FAILED: &str = "İndirme başarısız";

pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Writes notices to the application log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        log::info!("{}", message);
    }

    fn error(&self, message: &str) {
        log::warn!("{}", message);
    }
}
