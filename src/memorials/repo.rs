use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::model::{tags_to_strings, Memorial, MemorialChanges, MemorialRow, NewMemorial};

/// CRUD access to memorial records.
#[async_trait]
pub trait MemorialRepo: Send + Sync {
    /// All records, ordered by id ascending.
    async fn list(&self) -> anyhow::Result<Vec<Memorial>>;
    async fn get(&self, id: i64) -> anyhow::Result<Option<Memorial>>;
    async fn create(&self, new: NewMemorial) -> anyhow::Result<Memorial>;
    /// `Ok(None)` when no record has this id.
    async fn update(&self, id: i64, changes: MemorialChanges) -> anyhow::Result<Option<Memorial>>;
    /// `Ok(false)` when no record has this id.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
    async fn count(&self) -> anyhow::Result<i64>;
}

#[derive(Clone)]
pub struct PgMemorialRepo {
    db: PgPool,
}

impl PgMemorialRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemorialRepo for PgMemorialRepo {
    async fn list(&self) -> anyhow::Result<Vec<Memorial>> {
        let rows = sqlx::query_as::<_, MemorialRow>(
            r#"
            SELECT id, title, name, description, deed, tags, created_at, updated_at
            FROM memorials
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list memorials")?;
        rows.into_iter().map(Memorial::try_from).collect()
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Memorial>> {
        let row = sqlx::query_as::<_, MemorialRow>(
            r#"
            SELECT id, title, name, description, deed, tags, created_at, updated_at
            FROM memorials
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("get memorial {}", id))?;
        row.map(Memorial::try_from).transpose()
    }

    async fn create(&self, new: NewMemorial) -> anyhow::Result<Memorial> {
        let row = sqlx::query_as::<_, MemorialRow>(
            r#"
            INSERT INTO memorials (title, name, description, deed, tags)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, name, description, deed, tags, created_at, updated_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.deed)
        .bind(tags_to_strings(&new.tags))
        .fetch_one(&self.db)
        .await
        .context("insert memorial")?;
        Memorial::try_from(row)
    }

    async fn update(&self, id: i64, changes: MemorialChanges) -> anyhow::Result<Option<Memorial>> {
        let deed_provided = changes.deed.is_some();
        let row = sqlx::query_as::<_, MemorialRow>(
            r#"
            UPDATE memorials
               SET title       = COALESCE($2, title),
                   name        = COALESCE($3, name),
                   description = COALESCE($4, description),
                   deed        = CASE WHEN $5 THEN $6 ELSE deed END,
                   tags        = COALESCE($7, tags),
                   updated_at  = now()
             WHERE id = $1
            RETURNING id, title, name, description, deed, tags, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.name)
        .bind(changes.description)
        .bind(deed_provided)
        .bind(changes.deed.flatten())
        .bind(changes.tags.as_deref().map(tags_to_strings))
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("update memorial {}", id))?;
        row.map(Memorial::try_from).transpose()
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM memorials WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .with_context(|| format!("delete memorial {}", id))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM memorials")
            .fetch_one(&self.db)
            .await
            .context("count memorials")?;
        Ok(n)
    }
}
