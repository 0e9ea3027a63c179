use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::model::{normalize_tags, Memorial, MemorialChanges, NewMemorial};
use super::repo::MemorialRepo;

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, Memorial>,
}

/// Process-local store, used by tests and database-less demos.
#[derive(Default)]
pub struct InMemoryMemorialRepo {
    inner: RwLock<Inner>,
}

impl InMemoryMemorialRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemorialRepo for InMemoryMemorialRepo {
    async fn list(&self) -> anyhow::Result<Vec<Memorial>> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Memorial>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, new: NewMemorial) -> anyhow::Result<Memorial> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let memorial = Memorial {
            id: inner.next_id,
            title: new.title,
            name: new.name,
            description: new.description,
            deed: new.deed,
            tags: normalize_tags(new.tags),
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(memorial.id, memorial.clone());
        Ok(memorial)
    }

    async fn update(&self, id: i64, changes: MemorialChanges) -> anyhow::Result<Option<Memorial>> {
        let mut inner = self.inner.write().await;
        let Some(memorial) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(memorial);
        memorial.updated_at = OffsetDateTime::now_utc();
        Ok(Some(memorial.clone()))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.inner.read().await.rows.len() as i64)
    }
}
