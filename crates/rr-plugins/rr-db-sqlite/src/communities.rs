use async_trait::async_trait;
use chrono::Utc;
use rr_core::error::{AppError, Result};
use rr_core::listing::{ListQuery, Page};
use rr_core::models::{Community, CommunityChanges, Members, Moderator, NewCommunity, Subscription};
use rr_core::traits::CommunityRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::{conflict_as, db_err, list_rows, SqliteRepo};

const COLUMNS: &str = "id, name, description, creator_id, kind, image, created_at, updated_at";

const NAME_TAKEN: &str = "A subreddit with that name already exists";
const ALREADY_SUBSCRIBED: &str = "Already subscribed";
const ALREADY_MODERATOR: &str = "Already a moderator";

fn community_from_row(row: &SqliteRow) -> std::result::Result<Community, sqlx::Error> {
    Ok(Community {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        creator: row.try_get("creator_id")?,
        kind: row.try_get("kind")?,
        image: row.try_get("image")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CommunityRepo for SqliteRepo {
    async fn create_community(&self, community: NewCommunity) -> Result<Community> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO communities (name, description, creator_id, kind, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(community.name)
        .bind(community.description)
        .bind(community.creator)
        .bind(community.kind)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_as(NAME_TAKEN))?;
        community_from_row(&row).map_err(db_err)
    }

    async fn get_community(&self, id: i64) -> Result<Option<Community>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM communities WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(community_from_row).transpose().map_err(db_err)
    }

    async fn list_communities(&self, query: &ListQuery) -> Result<Page<Community>> {
        list_rows(&self.pool, "communities", COLUMNS, query, community_from_row).await
    }

    async fn update_community(&self, id: i64, changes: CommunityChanges) -> Result<Community> {
        let row = sqlx::query(&format!(
            "UPDATE communities SET \
               name = COALESCE(?, name), \
               description = COALESCE(?, description), \
               kind = CASE WHEN ? THEN ? ELSE kind END, \
               updated_at = ? \
             WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.kind.is_some())
        .bind(changes.kind.flatten())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_as(NAME_TAKEN))?
        .ok_or_else(|| AppError::not_found("Subreddit", id))?;
        community_from_row(&row).map_err(db_err)
    }

    async fn set_community_image(&self, id: i64, media_id: &str) -> Result<Community> {
        let row = sqlx::query(&format!(
            "UPDATE communities SET image = ?, updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(media_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::not_found("Subreddit", id))?;
        community_from_row(&row).map_err(db_err)
    }

    async fn delete_community(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM communities WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Subreddit", id));
        }
        tracing::info!(community = id, "subreddit deleted");
        Ok(())
    }

    async fn members(&self, community_id: i64) -> Result<Members> {
        let subscribers = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM subscriptions WHERE community_id = ? ORDER BY user_id",
        )
        .bind(community_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        let moderators = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM moderators WHERE community_id = ? ORDER BY user_id",
        )
        .bind(community_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(Members { subscribers, moderators })
    }

    async fn subscribe(&self, community_id: i64, user_id: i64) -> Result<Subscription> {
        let row = sqlx::query(
            "INSERT INTO subscriptions (user_id, community_id, subscribed_at) VALUES (?, ?, ?) \
             RETURNING id, user_id, community_id, subscribed_at",
        )
        .bind(user_id)
        .bind(community_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_as(ALREADY_SUBSCRIBED))?;
        Ok(Subscription {
            id: row.try_get("id").map_err(db_err)?,
            user: row.try_get("user_id").map_err(db_err)?,
            subreddit: row.try_get("community_id").map_err(db_err)?,
            subscribed_at: row.try_get("subscribed_at").map_err(db_err)?,
        })
    }

    async fn unsubscribe(&self, community_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE community_id = ? AND user_id = ?")
            .bind(community_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_moderator(&self, community_id: i64, user_id: i64) -> Result<Moderator> {
        let row = sqlx::query(
            "INSERT INTO moderators (user_id, community_id, added_at) VALUES (?, ?, ?) \
             RETURNING id, user_id, community_id, added_at",
        )
        .bind(user_id)
        .bind(community_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_as(ALREADY_MODERATOR))?;
        Ok(Moderator {
            id: row.try_get("id").map_err(db_err)?,
            user: row.try_get("user_id").map_err(db_err)?,
            subreddit: row.try_get("community_id").map_err(db_err)?,
            added_at: row.try_get("added_at").map_err(db_err)?,
        })
    }

    async fn remove_moderator(&self, community_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM moderators WHERE community_id = ? AND user_id = ?")
            .bind(community_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
