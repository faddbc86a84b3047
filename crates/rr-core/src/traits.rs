//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::error::Result;
use crate::listing::{ListQuery, Page};
use crate::models::{
    Claims, Comment, CommentVote, Community, CommunityChanges, Members, Moderator, NewComment,
    NewCommunity, NewPost, NewRule, NewUser, Post, PostChanges, PostVote, Rule, RuleChanges,
    Subscription, TokenKind, TokenPair, User, UserChanges,
};

/// Account persistence.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn username_exists(&self, username: &str) -> Result<bool>;
    async fn email_exists(&self, email: &str) -> Result<bool>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User>;
    /// Cascades to everything the user owns.
    async fn delete_user(&self, id: i64) -> Result<()>;
    async fn record_login(&self, id: i64) -> Result<()>;
    async fn list_users(&self, query: &ListQuery) -> Result<Page<User>>;
}

/// Community catalog plus its membership join tables.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait CommunityRepo: Send + Sync {
    async fn create_community(&self, community: NewCommunity) -> Result<Community>;
    async fn get_community(&self, id: i64) -> Result<Option<Community>>;
    async fn list_communities(&self, query: &ListQuery) -> Result<Page<Community>>;
    async fn update_community(&self, id: i64, changes: CommunityChanges) -> Result<Community>;
    async fn set_community_image(&self, id: i64, media_id: &str) -> Result<Community>;
    /// Cascades to posts, rules, subscriptions and moderator links.
    async fn delete_community(&self, id: i64) -> Result<()>;

    async fn members(&self, community_id: i64) -> Result<Members>;
    async fn subscribe(&self, community_id: i64, user_id: i64) -> Result<Subscription>;
    /// Returns false when there was no subscription to remove.
    async fn unsubscribe(&self, community_id: i64, user_id: i64) -> Result<bool>;
    async fn add_moderator(&self, community_id: i64, user_id: i64) -> Result<Moderator>;
    async fn remove_moderator(&self, community_id: i64, user_id: i64) -> Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn create_post(&self, post: NewPost) -> Result<Post>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>>;
    async fn list_posts(&self, query: &ListQuery) -> Result<Page<Post>>;
    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Post>;
    async fn delete_post(&self, id: i64) -> Result<()>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn create_comment(&self, comment: NewComment) -> Result<Comment>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>>;
    async fn list_comments(&self, query: &ListQuery) -> Result<Page<Comment>>;
    async fn update_comment(&self, id: i64, content: String) -> Result<Comment>;
    async fn delete_comment(&self, id: i64) -> Result<()>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait RuleRepo: Send + Sync {
    async fn create_rule(&self, rule: NewRule) -> Result<Rule>;
    async fn get_rule(&self, id: i64) -> Result<Option<Rule>>;
    async fn list_rules(&self, query: &ListQuery) -> Result<Page<Rule>>;
    async fn update_rule(&self, id: i64, changes: RuleChanges) -> Result<Rule>;
    async fn delete_rule(&self, id: i64) -> Result<()>;
}

/// Voting ledger. Uniqueness of (user, target) is enforced by storage;
/// a duplicate cast surfaces as `AppError::Conflict`.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait VoteRepo: Send + Sync {
    async fn cast_post_vote(&self, post_id: i64, user_id: i64, vote: bool) -> Result<PostVote>;
    async fn retract_post_vote(&self, post_id: i64, user_id: i64) -> Result<bool>;
    async fn cast_comment_vote(
        &self,
        comment_id: i64,
        user_id: i64,
        vote: bool,
    ) -> Result<CommentVote>;
    async fn retract_comment_vote(&self, comment_id: i64, user_id: i64) -> Result<bool>;
}

/// Everything the API layer needs from storage, as one object.
pub trait Repository: UserRepo + CommunityRepo + PostRepo + CommentRepo + RuleRepo + VoteRepo {}

impl<T> Repository for T where T: UserRepo + CommunityRepo + PostRepo + CommentRepo + RuleRepo + VoteRepo
{}

/// Media storage contract for community images.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Validates and saves raw bytes, returning a media_id for the Community model.
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> Result<String>;
    /// Returns the public URL of stored media.
    fn get_url(&self, media_id: &str) -> String;
}

/// Credential and token contract.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Produces a salted PHC-format hash.
    fn hash_password(&self, password: &str) -> Result<String>;

    /// Verifies a password against a stored hash; malformed hashes never verify.
    async fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Issues an access/refresh pair for an API login.
    fn issue_tokens(&self, user: &User) -> Result<TokenPair>;

    /// Issues a token for the form-login cookie.
    fn issue_session(&self, user: &User) -> Result<String>;

    /// Exchanges a valid refresh token for a new access token.
    fn refresh_access(&self, refresh_token: &str) -> Result<String>;

    /// Validates signature, expiry and token kind.
    fn validate(&self, token: &str, kind: TokenKind) -> Result<Claims>;
}
