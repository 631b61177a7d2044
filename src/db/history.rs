use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::models::SummaryResult;

use super::KeyValueStore;

pub const HISTORY_KEY: &str = "yt-summarizer-history";

/// Persistent, observable list of past summaries, newest first.
///
/// Every mutation runs read-modify-persist-publish under one lock, so
/// concurrent workflow tasks never interleave inside a mutation. A failed
/// write is logged and the in-memory list is kept as is; memory and disk
/// stay apart until the next successful write.
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    items: Mutex<Vec<SummaryResult>>,
    publisher: watch::Sender<Vec<SummaryResult>>,
}

impl HistoryStore {
    /// Read the persisted history. Unreadable or corrupt data loads as empty.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let items = match storage.get(HISTORY_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<SummaryResult>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Discarding unreadable summary history: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load summary history: {}", e);
                Vec::new()
            }
        };

        let (publisher, _) = watch::channel(items.clone());

        Self {
            storage,
            items: Mutex::new(items),
            publisher,
        }
    }

    /// Snapshot of the current collection.
    pub fn items(&self) -> Vec<SummaryResult> {
        self.publisher.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<SummaryResult>> {
        self.publisher.subscribe()
    }

    pub fn get(&self, id: &str) -> Option<SummaryResult> {
        self.publisher.borrow().iter().find(|item| item.id == id).cloned()
    }

    /// Case-insensitive match on title or summary text, order preserved.
    pub fn search(&self, term: &str) -> Vec<SummaryResult> {
        let needle = term.trim().to_lowercase();
        self.publisher
            .borrow()
            .iter()
            .filter(|item| {
                needle.is_empty()
                    || item.video_title.to_lowercase().contains(&needle)
                    || item.summary.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub async fn add(&self, result: SummaryResult) {
        let mut items = self.items.lock().await;
        items.insert(0, result);
        // Stable sort, so an equal id keeps the newcomer in front.
        items.sort_by(|a, b| b.id.cmp(&a.id));
        self.persist(&items).await;
        self.publisher.send_replace(items.clone());
    }

    /// Remove every entry with this id. Persists and publishes even if none matched.
    pub async fn delete(&self, id: &str) {
        let mut items = self.items.lock().await;
        items.retain(|item| item.id != id);
        self.persist(&items).await;
        self.publisher.send_replace(items.clone());
    }

    async fn persist(&self, items: &[SummaryResult]) {
        let json = match serde_json::to_string(items) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize summary history: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set(HISTORY_KEY, json).await {
            tracing::error!("Failed to save summary history: {}", e);
        }
    }
}
