use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Checklist, ChecklistFields, ChecklistRow};

/// Every method that touches an existing row takes the owner and filters on it
/// in the same statement.
#[async_trait]
pub trait ChecklistRepo: Send + Sync {
    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Checklist>>;

    async fn insert(
        &self,
        owner: Uuid,
        owner_name: &str,
        fields: &ChecklistFields,
    ) -> anyhow::Result<Checklist>;

    /// `None` when no row matches both `id` and `owner`.
    async fn update_owned(
        &self,
        owner: Uuid,
        id: Uuid,
        fields: &ChecklistFields,
    ) -> anyhow::Result<Option<Checklist>>;

    /// `false` when no row matches both `id` and `owner`.
    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgChecklistRepo {
    db: PgPool,
}

impl PgChecklistRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_checklist(row: ChecklistRow) -> anyhow::Result<Checklist> {
    let id = row.id;
    Checklist::try_from(row).with_context(|| format!("decode checklist {id}"))
}

#[async_trait]
impl ChecklistRepo for PgChecklistRepo {
    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Checklist>> {
        let rows = sqlx::query_as::<_, ChecklistRow>(
            r#"
            SELECT id, title, short_name, status, user_id, user_name, created_at, updated_at
              FROM checklists
             WHERE user_id = $1
             ORDER BY created_at ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await
        .context("list checklists by owner")?;

        rows.into_iter().map(into_checklist).collect()
    }

    async fn insert(
        &self,
        owner: Uuid,
        owner_name: &str,
        fields: &ChecklistFields,
    ) -> anyhow::Result<Checklist> {
        // created_at and updated_at both default to now(), which is fixed per transaction
        let row = sqlx::query_as::<_, ChecklistRow>(
            r#"
            INSERT INTO checklists (id, title, short_name, status, user_id, user_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, short_name, status, user_id, user_name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fields.title)
        .bind(&fields.short_name)
        .bind(fields.status.as_str())
        .bind(owner)
        .bind(owner_name)
        .fetch_one(&self.db)
        .await
        .context("insert checklist")?;

        into_checklist(row)
    }

    async fn update_owned(
        &self,
        owner: Uuid,
        id: Uuid,
        fields: &ChecklistFields,
    ) -> anyhow::Result<Option<Checklist>> {
        // updated_at must move forward at millisecond resolution
        let row = sqlx::query_as::<_, ChecklistRow>(
            r#"
            UPDATE checklists
               SET title = $3,
                   short_name = $4,
                   status = $5,
                   updated_at = GREATEST(now(), updated_at + INTERVAL '1 millisecond')
             WHERE id = $1 AND user_id = $2
            RETURNING id, title, short_name, status, user_id, user_name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&fields.title)
        .bind(&fields.short_name)
        .bind(fields.status.as_str())
        .fetch_optional(&self.db)
        .await
        .context("update checklist")?;

        row.map(into_checklist).transpose()
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM checklists
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.db)
        .await
        .context("delete checklist")?;

        Ok(res.rows_affected() > 0)
    }
}
