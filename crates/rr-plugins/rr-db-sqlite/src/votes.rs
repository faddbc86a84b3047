use async_trait::async_trait;
use chrono::Utc;
use rr_core::error::Result;
use rr_core::models::{CommentVote, PostVote};
use rr_core::traits::VoteRepo;
use sqlx::Row;

use crate::{conflict_as, db_err, SqliteRepo};

const DUPLICATE_POST_VOTE: &str = "You have already voted on this post";
const DUPLICATE_COMMENT_VOTE: &str = "You have already voted on this comment";

#[async_trait]
impl VoteRepo for SqliteRepo {
    async fn cast_post_vote(&self, post_id: i64, user_id: i64, vote: bool) -> Result<PostVote> {
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO post_votes (post_id, user_id, vote, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id, created_at, updated_at",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(vote)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_as(DUPLICATE_POST_VOTE))?;
        tracing::debug!(post = post_id, user = user_id, vote, "post vote cast");
        Ok(PostVote {
            id: row.try_get("id").map_err(db_err)?,
            post: post_id,
            user: user_id,
            vote,
            created_at: row.try_get("created_at").map_err(db_err)?,
            updated_at: row.try_get("updated_at").map_err(db_err)?,
        })
    }

    async fn retract_post_vote(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM post_votes WHERE post_id = ? AND user_id = ?")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn cast_comment_vote(
        &self,
        comment_id: i64,
        user_id: i64,
        vote: bool,
    ) -> Result<CommentVote> {
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO comment_votes (comment_id, user_id, vote, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id, created_at, updated_at",
        )
        .bind(comment_id)
        .bind(user_id)
        .bind(vote)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_as(DUPLICATE_COMMENT_VOTE))?;
        tracing::debug!(comment = comment_id, user = user_id, vote, "comment vote cast");
        Ok(CommentVote {
            id: row.try_get("id").map_err(db_err)?,
            comment: comment_id,
            user: user_id,
            vote,
            created_at: row.try_get("created_at").map_err(db_err)?,
            updated_at: row.try_get("updated_at").map_err(db_err)?,
        })
    }

    async fn retract_comment_vote(&self, comment_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comment_votes WHERE comment_id = ? AND user_id = ?")
            .bind(comment_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
