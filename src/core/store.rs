use crate::core::models::TicketRecord;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory holder for the current ticket record. Handlers read it; the
/// refresher is the only writer.
#[derive(Clone, Default)]
pub struct TicketStore {
    inner: Arc<RwLock<Option<TicketRecord>>>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn get(&self) -> Option<TicketRecord> {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, record: TicketRecord) {
        *self.inner.write().await = Some(record);
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_none()
    }
}
