use async_trait::async_trait;
use chrono::Utc;
use rr_core::error::{AppError, Result};
use rr_core::listing::{ListQuery, Page};
use rr_core::models::{Comment, NewComment, NewPost, Post, PostChanges};
use rr_core::traits::{CommentRepo, PostRepo};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::{db_err, list_rows, SqliteRepo};

const POST_COLUMNS: &str =
    "id, title, content, creator_id, kind, community_id, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, content, owner_id, post_id, created_at, updated_at";

fn post_from_row(row: &SqliteRow) -> std::result::Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        creator: row.try_get("creator_id")?,
        kind: row.try_get("kind")?,
        subreddit: row.try_get("community_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn comment_from_row(row: &SqliteRow) -> std::result::Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        owner: row.try_get("owner_id")?,
        post: row.try_get("post_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl PostRepo for SqliteRepo {
    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO posts (title, content, creator_id, kind, community_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {POST_COLUMNS}"
        ))
        .bind(post.title)
        .bind(post.content)
        .bind(post.creator)
        .bind(post.kind)
        .bind(post.subreddit)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        post_from_row(&row).map_err(db_err)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(post_from_row).transpose().map_err(db_err)
    }

    async fn list_posts(&self, query: &ListQuery) -> Result<Page<Post>> {
        list_rows(&self.pool, "posts", POST_COLUMNS, query, post_from_row).await
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Post> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET \
               title = COALESCE(?, title), \
               content = COALESCE(?, content), \
               kind = CASE WHEN ? THEN ? ELSE kind END, \
               updated_at = ? \
             WHERE id = ? RETURNING {POST_COLUMNS}"
        ))
        .bind(changes.title)
        .bind(changes.content)
        .bind(changes.kind.is_some())
        .bind(changes.kind.flatten())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::not_found("Post", id))?;
        post_from_row(&row).map_err(db_err)
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Post", id));
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepo for SqliteRepo {
    async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO comments (content, owner_id, post_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment.content)
        .bind(comment.owner)
        .bind(comment.post)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        comment_from_row(&row).map_err(db_err)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(comment_from_row).transpose().map_err(db_err)
    }

    async fn list_comments(&self, query: &ListQuery) -> Result<Page<Comment>> {
        list_rows(&self.pool, "comments", COMMENT_COLUMNS, query, comment_from_row).await
    }

    async fn update_comment(&self, id: i64, content: String) -> Result<Comment> {
        let row = sqlx::query(&format!(
            "UPDATE comments SET content = ?, updated_at = ? WHERE id = ? RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::not_found("Comment", id))?;
        comment_from_row(&row).map_err(db_err)
    }

    async fn delete_comment(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Comment", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{community, repo, user};
    use rr_core::listing::{FilterValue, POST_LIST};

    fn new_post(title: &str, creator: i64, subreddit: i64) -> NewPost {
        NewPost {
            title: title.into(),
            content: format!("{title} body"),
            kind: Some("text".into()),
            creator,
            subreddit,
        }
    }

    #[tokio::test]
    async fn post_requires_existing_community() {
        let repo = repo().await;
        let alice = user(&repo, "alice").await;
        let err = repo.create_post(new_post("orphan", alice.id, 999)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn post_update_refreshes_timestamp_only_for_given_fields() {
        let repo = repo().await;
        let alice = user(&repo, "alice").await;
        let rust = community(&repo, "rust", alice.id).await;
        let post = repo.create_post(new_post("first", alice.id, rust.id)).await.unwrap();

        let updated = repo
            .update_post(post.id, PostChanges { title: Some("renamed".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.content, post.content);
        assert_eq!(updated.kind.as_deref(), Some("text"));
        assert!(updated.updated_at >= post.updated_at);
        assert_eq!(updated.created_at, post.created_at);

        let cleared = repo
            .update_post(post.id, PostChanges { kind: Some(None), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(cleared.kind, None);
        assert_eq!(cleared.title, "renamed");

        assert!(matches!(
            repo.update_post(404, PostChanges::default()).await,
            Err(AppError::NotFound(..))
        ));
    }

    #[tokio::test]
    async fn posts_filter_by_community() {
        let repo = repo().await;
        let alice = user(&repo, "alice").await;
        let rust = community(&repo, "rust", alice.id).await;
        let go = community(&repo, "golang", alice.id).await;
        repo.create_post(new_post("a", alice.id, rust.id)).await.unwrap();
        repo.create_post(new_post("b", alice.id, rust.id)).await.unwrap();
        repo.create_post(new_post("c", alice.id, go.id)).await.unwrap();

        let query = ListQuery::first_page(&POST_LIST, 10)
            .with_filter("community_id", FilterValue::Integer(rust.id));
        let page = repo.list_posts(&query).await.unwrap();
        assert_eq!(page.total, 2);
        // newest first
        assert_eq!(page.items[0].title, "b");
    }

    #[tokio::test]
    async fn deleting_post_removes_its_comments() {
        let repo = repo().await;
        let alice = user(&repo, "alice").await;
        let rust = community(&repo, "rust", alice.id).await;
        let post = repo.create_post(new_post("a", alice.id, rust.id)).await.unwrap();
        let comment = repo
            .create_comment(NewComment { content: "nice".into(), owner: alice.id, post: post.id })
            .await
            .unwrap();

        let edited = repo.update_comment(comment.id, "nicer".into()).await.unwrap();
        assert_eq!(edited.content, "nicer");

        repo.delete_post(post.id).await.unwrap();
        assert!(repo.get_comment(comment.id).await.unwrap().is_none());
        assert!(matches!(repo.delete_comment(comment.id).await, Err(AppError::NotFound(..))));
    }
}
