//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::ShortLinkId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::ShortLink;
use crate::domain::repository::{LinkRepository, ResolveOutcome};
use crate::domain::value_objects::{ShortKey, TargetUrl};
use crate::error::{LinkError, LinkResult};

/// PostgreSQL-backed link repository
#[derive(Clone)]
pub struct PgLinkRepository {
    pool: PgPool,
}

impl PgLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LinkRepository for PgLinkRepository {
    async fn insert(&self, link: &ShortLink) -> LinkResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_links (
                short_link_id,
                owner_account_id,
                short_key,
                target_url,
                clicks,
                expires_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(link.link_id.into_uuid())
        .bind(link.owner_account_id)
        .bind(link.short_key.as_str())
        .bind(link.target_url.as_str())
        .bind(link.clicks)
        .bind(link.expires_at)
        .bind(link.created_at)
        .bind(link.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                Err(LinkError::DuplicateKey)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn resolve_and_count(&self, key: &ShortKey) -> LinkResult<ResolveOutcome> {
        // Single statement: the click is counted only when the link is
        // live, and concurrent resolutions each land their increment
        let target: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE short_links
            SET clicks = clicks + 1, updated_at = NOW()
            WHERE short_key = $1
              AND (expires_at IS NULL OR expires_at > NOW())
            RETURNING target_url
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(url) = target {
            return Ok(ResolveOutcome::Hit(TargetUrl::from_db(url)));
        }

        // Distinguish an expired link from a missing one
        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT short_link_id FROM short_links WHERE short_key = $1")
                .bind(key.as_str())
                .fetch_optional(&self.pool)
                .await?;

        match exists {
            Some(_) => Ok(ResolveOutcome::Expired),
            None => Ok(ResolveOutcome::NotFound),
        }
    }

    async fn find_for_owner(
        &self,
        link_id: &ShortLinkId,
        owner_account_id: Uuid,
    ) -> LinkResult<Option<ShortLink>> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            SELECT short_link_id, owner_account_id, short_key, target_url,
                   clicks, expires_at, created_at, updated_at
            FROM short_links
            WHERE short_link_id = $1 AND owner_account_id = $2
            "#,
        )
        .bind(link_id.into_uuid())
        .bind(owner_account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ShortLinkRow::into_short_link))
    }

    async fn list_for_owner(&self, owner_account_id: Uuid) -> LinkResult<Vec<ShortLink>> {
        let rows = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            SELECT short_link_id, owner_account_id, short_key, target_url,
                   clicks, expires_at, created_at, updated_at
            FROM short_links
            WHERE owner_account_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ShortLinkRow::into_short_link).collect())
    }

    async fn update_for_owner(&self, link: &ShortLink) -> LinkResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET target_url = $3, expires_at = $4, updated_at = $5
            WHERE short_link_id = $1 AND owner_account_id = $2
            "#,
        )
        .bind(link.link_id.into_uuid())
        .bind(link.owner_account_id)
        .bind(link.target_url.as_str())
        .bind(link.expires_at)
        .bind(link.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_for_owner(
        &self,
        link_id: &ShortLinkId,
        owner_account_id: Uuid,
    ) -> LinkResult<bool> {
        let result = sqlx::query(
            "DELETE FROM short_links WHERE short_link_id = $1 AND owner_account_id = $2",
        )
        .bind(link_id.into_uuid())
        .bind(owner_account_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[derive(sqlx::FromRow)]
struct ShortLinkRow {
    short_link_id: Uuid,
    owner_account_id: Uuid,
    short_key: String,
    target_url: String,
    clicks: i64,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ShortLinkRow {
    fn into_short_link(self) -> ShortLink {
        ShortLink {
            link_id: ShortLinkId::from_uuid(self.short_link_id),
            owner_account_id: self.owner_account_id,
            short_key: ShortKey::from_db(self.short_key),
            target_url: TargetUrl::from_db(self.target_url),
            clicks: self.clicks,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
