use std::sync::Arc;

use pricing::{HistoryDocument, HistoryRecord};

use crate::error::AppError;
use crate::infrastructure::storage::DocumentStore;

pub struct HistoryService<H> {
    store: Arc<H>,
    limit: usize,
}

impl<H> HistoryService<H>
where
    H: DocumentStore<HistoryDocument>,
{
    pub fn new(store: Arc<H>, limit: usize) -> Self {
        Self { store, limit }
    }

    /// 读取失败时返回空列表
    pub async fn list(&self) -> HistoryDocument {
        self.store.load_or_default().await
    }

    /// 插入到最前面并截断到上限
    pub async fn record(&self, record: HistoryRecord) -> Result<(), AppError> {
        let limit = self.limit;
        self.store
            .update(|doc| -> Result<(), AppError> {
                doc.prepend(record, limit);
                Ok(())
            })
            .await?;

        tracing::debug!(limit, "history record stored");
        Ok(())
    }
}
