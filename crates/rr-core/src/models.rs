//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Reddit.
//! Identifiers are database-assigned integers; timestamps are UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

/// Account role flag. Registration always yields `Customer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    #[default]
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "customer" => Ok(Role::Customer),
            other => Err(AppError::ValidationError(format!("unknown role '{other}'"))),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    /// `None` until the first successful login.
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Insert payload for a user; the password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial profile update; `password_hash` is already hashed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// A named topical forum ("subreddit").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Community {
    pub id: i64,
    /// Globally unique display name
    pub name: String,
    pub description: String,
    pub creator: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Media id handed out by the `MediaStore`, not a URL
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscriber and moderator user ids of a community.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Members {
    pub subscribers: Vec<i64>,
    pub moderators: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCommunity {
    pub name: String,
    pub description: String,
    pub kind: Option<String>,
    pub creator: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunityChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the type; `None` keeps it.
    pub kind: Option<Option<String>>,
}

/// A post scoped to one community.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub creator: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub subreddit: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub kind: Option<String>,
    pub creator: i64,
    pub subreddit: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    /// `Some(None)` clears the type; `None` keeps it.
    pub kind: Option<Option<String>>,
}

/// A comment scoped to one post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub owner: i64,
    pub post: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub content: String,
    pub owner: i64,
    pub post: i64,
}

/// An ordered free-text rule attached to a community.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub id: i64,
    pub subreddit: i64,
    pub rule: String,
    pub order: i64,
    pub creator: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRule {
    pub subreddit: i64,
    pub rule: String,
    pub order: i64,
    pub creator: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleChanges {
    pub rule: Option<String>,
    pub order: Option<i64>,
}

/// One vote per (user, post); `vote` is true for up, false for down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostVote {
    pub id: i64,
    pub post: i64,
    pub user: i64,
    pub vote: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One vote per (user, comment).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentVote {
    pub id: i64,
    pub comment: i64,
    pub user: i64,
    pub vote: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join row recording a user's subscription to a community.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: i64,
    pub user: i64,
    pub subreddit: i64,
    pub subscribed_at: DateTime<Utc>,
}

/// Join row recording a moderator of a community.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Moderator {
    pub id: i64,
    pub user: i64,
    pub subreddit: i64,
    pub added_at: DateTime<Utc>,
}

/// Which kind of token a JWT represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
    /// Carried in the form-login cookie
    Session,
}

/// Claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User id, as a string per JWT convention
    pub sub: String,
    pub username: String,
    pub token_type: TokenKind,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Token is invalid or expired".into()))
    }
}

/// Result of a successful API login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}
