use async_trait::async_trait;
use chrono::Utc;
use rr_core::error::{AppError, Result};
use rr_core::listing::{ListQuery, Page};
use rr_core::models::{NewUser, Role, User, UserChanges};
use rr_core::services::{EMAIL_TAKEN, USERNAME_TAKEN};
use rr_core::traits::UserRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::{db_err, list_rows, SqliteRepo};

const COLUMNS: &str = "id, username, email, password_hash, role, last_login, created_at";

pub(crate) fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse().unwrap_or(Role::Customer),
        last_login: row.try_get("last_login")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Names the column behind a users-table unique violation.
fn user_conflict(err: sqlx::Error) -> AppError {
    match db_err(err) {
        AppError::Conflict(msg) if msg.contains("users.email") => AppError::Conflict(EMAIL_TAKEN.into()),
        AppError::Conflict(_) => AppError::Conflict(USERNAME_TAKEN.into()),
        other => other,
    }
}

#[async_trait]
impl UserRepo for SqliteRepo {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (username, email, password_hash, role, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(user_conflict)?;
        user_from_row(&row).map_err(db_err)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(user_from_row).transpose().map_err(db_err)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(user_from_row).transpose().map_err(db_err)
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE username = ?)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User> {
        let row = sqlx::query(&format!(
            "UPDATE users SET \
               username = COALESCE(?, username), \
               email = COALESCE(?, email), \
               password_hash = COALESCE(?, password_hash) \
             WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(user_conflict)?
        .ok_or_else(|| AppError::not_found("User", id))?;
        user_from_row(&row).map_err(db_err)
    }

    async fn delete_user(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User", id));
        }
        Ok(())
    }

    async fn record_login(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_users(&self, query: &ListQuery) -> Result<Page<User>> {
        list_rows(&self.pool, "users", COLUMNS, query, user_from_row).await
    }
}
