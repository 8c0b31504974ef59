//! Tab-order repository
//!
//! - get: single row by (user, page)
//! - upsert: INSERT ... ON CONFLICT DO UPDATE, returning the stored row
//! - delete: idempotent

use abr_core::TabOrderDocument;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::{PageName, TabOrder, UserId};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("corrupt stored order: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

/// Tab-order repository
pub struct TabOrderRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TabOrderRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Stored order for `user` on `page`.
    pub async fn get(&self, user: &UserId, page: &PageName) -> Result<TabOrderDocument, DbError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, page, order_json, updated_at
            FROM tab_orders
            WHERE user_id = ? AND page = ?
            "#,
        )
        .bind(user.as_str())
        .bind(page.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "tab order",
            id: format!("{}/{}", user.as_str(), page.as_str()),
        })?;

        document_from_row(&row)
    }

    /// Replace the stored order, creating the row if needed.
    pub async fn upsert(
        &self,
        user: &UserId,
        page: &PageName,
        order: &TabOrder,
    ) -> Result<TabOrderDocument, DbError> {
        let order_json = serde_json::to_string(order.as_slice())?;
        let row = sqlx::query(
            r#"
            INSERT INTO tab_orders (user_id, page, order_json, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, page) DO UPDATE SET
                order_json = excluded.order_json,
                updated_at = excluded.updated_at
            RETURNING user_id, page, order_json, updated_at
            "#,
        )
        .bind(user.as_str())
        .bind(page.as_str())
        .bind(order_json)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        document_from_row(&row)
    }

    /// Remove the stored order. Returns whether a row existed.
    pub async fn delete(&self, user: &UserId, page: &PageName) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM tab_orders WHERE user_id = ? AND page = ?")
            .bind(user.as_str())
            .bind(page.as_str())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn document_from_row(row: &SqliteRow) -> Result<TabOrderDocument, DbError> {
    let order_json: String = row.try_get("order_json")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    Ok(TabOrderDocument {
        user_id: row.try_get("user_id")?,
        page: row.try_get("page")?,
        order: serde_json::from_str(&order_json)?,
        updated_at: Some(updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn key(user: &str, page: &str) -> (UserId, PageName) {
        (UserId::new(user).unwrap(), PageName::new(page).unwrap())
    }

    fn order(ids: &[&str]) -> TabOrder {
        TabOrder::new(ids.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[tokio::test]
    async fn missing_row_is_not_found() {
        let pool = open_in_memory().await.unwrap();
        let (user, page) = key("user1", "tasks");

        let err = TabOrderRepo::new(&pool).get(&user, &page).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "tab order", .. }));
    }

    #[tokio::test]
    async fn upsert_then_get() {
        let pool = open_in_memory().await.unwrap();
        let repo = TabOrderRepo::new(&pool);
        let (user, page) = key("user1", "tasks");

        let saved = repo.upsert(&user, &page, &order(&["b", "a"])).await.unwrap();
        assert_eq!(saved.order, vec!["b", "a"]);
        assert!(saved.updated_at.is_some());

        let replaced = repo.upsert(&user, &page, &order(&["a", "b", "c"])).await.unwrap();
        assert_eq!(replaced.order, vec!["a", "b", "c"]);

        let fetched = repo.get(&user, &page).await.unwrap();
        assert_eq!(fetched.order, vec!["a", "b", "c"]);
        assert_eq!(fetched.user_id, "user1");
        assert_eq!(fetched.page, "tasks");
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let pool = open_in_memory().await.unwrap();
        let repo = TabOrderRepo::new(&pool);
        let (user1, tasks) = key("user1", "tasks");
        let (user2, parts) = key("user2", "parts");

        repo.upsert(&user1, &tasks, &order(&["x"])).await.unwrap();
        assert!(repo.get(&user2, &tasks).await.is_err());
        assert!(repo.get(&user1, &parts).await.is_err());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let pool = open_in_memory().await.unwrap();
        let repo = TabOrderRepo::new(&pool);
        let (user, page) = key("user1", "tasks");

        repo.upsert(&user, &page, &order(&["a"])).await.unwrap();
        assert!(repo.delete(&user, &page).await.unwrap());
        assert!(!repo.delete(&user, &page).await.unwrap());
        assert!(repo.get(&user, &page).await.is_err());
    }
}
