use crate::domain::entities::AuditEntry;
use crate::domain::repositories::AuditRepository;
use std::sync::Arc;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 1024;

/// Asynchronous audit appender. `record` never blocks the request path;
/// entries are drained by a background task. Under backpressure the entry
/// is dropped with a warning rather than stalling a handler.
#[derive(Clone)]
pub struct AuditWriter {
    tx: mpsc::Sender<AuditEntry>,
}

impl AuditWriter {
    pub fn spawn(repository: Arc<dyn AuditRepository>) -> Self {
        let (tx, mut rx) = mpsc::channel::<AuditEntry>(CHANNEL_CAPACITY);
        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                if let Err(e) = repository.append(entry).await {
                    tracing::warn!("Failed to append audit entry: {}", e);
                }
            }
        });
        Self { tx }
    }

    pub fn record(&self, entry: AuditEntry) {
        if let Err(e) = self.tx.try_send(entry) {
            tracing::warn!("Audit channel full, dropping entry: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::AppResult;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct RecordingRepository {
        entries: Mutex<Vec<AuditEntry>>,
        notify: tokio::sync::Notify,
    }

    #[async_trait]
    impl AuditRepository for RecordingRepository {
        async fn append(&self, entry: AuditEntry) -> AppResult<()> {
            self.entries.lock().unwrap().push(entry);
            self.notify.notify_one();
            Ok(())
        }

        async fn recent_for_tenant(
            &self,
            _tenant_id: Uuid,
            _limit: i64,
        ) -> AppResult<Vec<AuditEntry>> {
            Ok(self.entries.lock().unwrap().clone())
        }
    }

    #[tokio::test]
    async fn entries_reach_the_repository() {
        let repository = Arc::new(RecordingRepository {
            entries: Mutex::new(Vec::new()),
            notify: tokio::sync::Notify::new(),
        });
        let writer = AuditWriter::spawn(repository.clone());

        writer.record(AuditEntry::new("auth.login", "user").with_outcome("allow"));
        repository.notify.notified().await;

        let entries = repository.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event_type, "auth.login");
    }
}
