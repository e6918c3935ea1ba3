mod artifacts;
mod extract;
mod fetch;

use crate::core::models::{computed_validity_window, display_timestamp, RefreshOutcome, TicketRecord};
use crate::core::settings::{FallbackSettings, Settings, ValidityMode};
use crate::core::store::TicketStore;
use anyhow::Result;
use chrono::Local;
use thiserror::Error;

pub use artifacts::{ArtifactStore, QR_FILE_NAME, RECORD_FILE_NAME};
pub use extract::{ElementIdExtractor, TicketExtract, TicketExtractor};
pub use fetch::{HttpPageFetcher, PageFetcher};

const UPDATE_SUCCESSFUL: &str = "Update successful";

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs one fetch-extract-persist cycle per call. `refresh` never fails:
/// any error inside the cycle degrades to a fallback record so the callers
/// (scheduler, HTTP handlers) always have a well-formed record to serve.
pub struct Refresher {
    fetcher: Box<dyn PageFetcher>,
    extractor: Box<dyn TicketExtractor>,
    artifacts: ArtifactStore,
    store: TicketStore,
    validity: ValidityMode,
    fallback: FallbackSettings,
}

impl Refresher {
    pub fn new(settings: &Settings, store: TicketStore) -> Result<Self> {
        let fetcher = HttpPageFetcher::new(&settings.source)?;
        let extractor = ElementIdExtractor::new(&settings.scrape)?;

        Ok(Self::with_parts(
            Box::new(fetcher),
            Box::new(extractor),
            ArtifactStore::new(settings.storage.data_dir.clone()),
            store,
            settings.scrape.validity,
            settings.fallback.clone(),
        ))
    }

    pub fn with_parts(
        fetcher: Box<dyn PageFetcher>,
        extractor: Box<dyn TicketExtractor>,
        artifacts: ArtifactStore,
        store: TicketStore,
        validity: ValidityMode,
        fallback: FallbackSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            artifacts,
            store,
            validity,
            fallback,
        }
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        match self.try_refresh().await {
            Ok(record) => {
                tracing::info!(ticket_number = %record.ticket_number, "Ticket refreshed");
                self.store.replace(record.clone()).await;
                RefreshOutcome {
                    success: true,
                    message: record.update_status.clone(),
                    record,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh failed, serving fallback record");
                let record = self.fallback_record(&e);
                self.store.replace(record.clone()).await;
                RefreshOutcome {
                    success: false,
                    message: record.update_status.clone(),
                    record,
                }
            }
        }
    }

    async fn try_refresh(&self) -> Result<TicketRecord, RefreshError> {
        let html = self.fetcher.fetch_page().await?;
        let extract = self.extractor.extract(&html)?;

        let (valid_from, valid_until) = self.resolve_validity(&extract);
        let record = TicketRecord {
            ticket_number: extract.ticket_number,
            valid_from,
            valid_until,
            region: extract.region.or_else(|| self.fallback.region.clone()),
            ticket_class: extract
                .ticket_class
                .or_else(|| self.fallback.ticket_class.clone()),
            last_updated: display_timestamp(),
            update_status: UPDATE_SUCCESSFUL.to_string(),
        };

        self.artifacts.write_qr(&extract.qr_image)?;
        self.artifacts.write_record(&record)?;

        Ok(record)
    }

    fn resolve_validity(&self, extract: &TicketExtract) -> (String, String) {
        let (computed_from, computed_until) = computed_validity_window(Local::now().date_naive());

        match self.validity {
            ValidityMode::Computed => (computed_from, computed_until),
            ValidityMode::Scraped => (
                extract.valid_from.clone().unwrap_or(computed_from),
                extract.valid_until.clone().unwrap_or(computed_until),
            ),
        }
    }

    /// Last persisted record when one loads, else the configured reserve
    /// values. Persisted again so callers always find a well-formed document,
    /// and the placeholder image is written only if no QR exists yet.
    fn fallback_record(&self, error: &RefreshError) -> TicketRecord {
        let mut record = match self.artifacts.load_record() {
            Some(previous) => previous,
            None => {
                let (valid_from, valid_until) =
                    computed_validity_window(Local::now().date_naive());
                TicketRecord {
                    ticket_number: self.fallback.ticket_number.clone(),
                    valid_from,
                    valid_until,
                    region: self.fallback.region.clone(),
                    ticket_class: self.fallback.ticket_class.clone(),
                    last_updated: String::new(),
                    update_status: String::new(),
                }
            }
        };

        record.last_updated = display_timestamp();
        record.update_status = format!("Update failed: {error}");

        if let Err(e) = self.artifacts.write_record(&record) {
            tracing::warn!(error = %e, "Failed to persist fallback record");
        }
        if let Err(e) = self.artifacts.write_qr_placeholder_if_missing() {
            tracing::warn!(error = %e, "Failed to write placeholder QR image");
        }

        record
    }
}
