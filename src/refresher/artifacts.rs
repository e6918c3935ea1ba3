use crate::core::models::TicketRecord;
use std::io;
use std::path::{Path, PathBuf};

pub const QR_FILE_NAME: &str = "qr-code.png";
pub const RECORD_FILE_NAME: &str = "ticket.json";

// 1x1 transparent PNG, written only when a refresh fails before any real
// QR code has been saved, so the image path always resolves.
const PLACEHOLDER_QR_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00,
    0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0x64, 0x60, 0xF8, 0x5F,
    0x0F, 0x00, 0x02, 0x87, 0x01, 0x80, 0xEB, 0x47, 0xBA, 0x92, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Owns the two on-disk artifacts: the QR image and the ticket record.
/// Every write is a plain overwrite of a small file; readers tolerate a
/// momentarily mixed pair.
pub struct ArtifactStore {
    data_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn qr_path(&self) -> PathBuf {
        self.data_dir.join(QR_FILE_NAME)
    }

    pub fn record_path(&self) -> PathBuf {
        self.data_dir.join(RECORD_FILE_NAME)
    }

    pub fn write_qr(&self, bytes: &[u8]) -> io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::write(self.qr_path(), bytes)?;

        tracing::debug!(path = ?self.qr_path(), len = bytes.len(), "Saved QR image");
        Ok(())
    }

    pub fn write_record(&self, record: &TicketRecord) -> io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;

        let content = serde_json::to_string_pretty(record)?;
        std::fs::write(self.record_path(), content)?;

        tracing::debug!(path = ?self.record_path(), "Saved ticket record");
        Ok(())
    }

    pub fn load_record(&self) -> Option<TicketRecord> {
        let content = std::fs::read_to_string(self.record_path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn has_qr(&self) -> bool {
        self.qr_path().exists()
    }

    /// Writes the 1x1 placeholder, but never over a previously saved QR code.
    pub fn write_qr_placeholder_if_missing(&self) -> io::Result<()> {
        if self.has_qr() {
            return Ok(());
        }
        self.write_qr(PLACEHOLDER_QR_PNG)
    }
}
