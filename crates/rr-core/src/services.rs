//! # Account Services
//!
//! Registration, credential checks and profile updates. Shared by the JSON
//! API and the form views so both enforce the same rules.

use crate::error::{AppError, Result};
use crate::models::{NewUser, Role, User, UserChanges};
use crate::traits::{AuthProvider, UserRepo};
use crate::validation;

pub const USERNAME_TAKEN: &str = "Username already exists";
pub const EMAIL_TAKEN: &str = "Email already exists";
pub const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

/// Raw registration input, validated by [`register`].
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Raw profile update; absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Creates a customer account. Username conflicts are reported before
/// email conflicts.
pub async fn register<R, A>(repo: &R, auth: &A, input: Registration) -> Result<User>
where
    R: UserRepo + ?Sized,
    A: AuthProvider + ?Sized,
{
    let username = validation::required("username", input.username.as_deref(), Some(150))?;
    let email = validation::email(input.email.as_deref())?;
    let password = validation::password(input.password.as_deref())?;

    if repo.username_exists(&username).await? {
        return Err(AppError::Conflict(USERNAME_TAKEN.into()));
    }
    if repo.email_exists(&email).await? {
        return Err(AppError::Conflict(EMAIL_TAKEN.into()));
    }

    let password_hash = auth.hash_password(&password)?;
    let user = repo
        .create_user(NewUser { username, email, password_hash, role: Role::Customer })
        .await?;
    tracing::info!(user = user.id, username = %user.username, "account registered");
    Ok(user)
}

/// Checks credentials and records the login.
pub async fn authenticate<R, A>(repo: &R, auth: &A, username: &str, password: &str) -> Result<User>
where
    R: UserRepo + ?Sized,
    A: AuthProvider + ?Sized,
{
    let rejected = || AppError::Unauthorized(BAD_CREDENTIALS.into());

    let Some(user) = repo.find_by_username(username.trim()).await? else {
        tracing::debug!(username, "login for unknown user");
        return Err(rejected());
    };
    if !auth.verify_password(password, &user.password_hash).await {
        tracing::debug!(user = user.id, "login with wrong password");
        return Err(rejected());
    }

    repo.record_login(user.id).await?;
    Ok(user)
}

pub async fn update_profile<R, A>(
    repo: &R,
    auth: &A,
    user: &User,
    input: ProfileUpdate,
) -> Result<User>
where
    R: UserRepo + ?Sized,
    A: AuthProvider + ?Sized,
{
    let mut changes = UserChanges::default();

    if input.username.is_some() {
        let username = validation::required("username", input.username.as_deref(), Some(150))?;
        if username != user.username && repo.username_exists(&username).await? {
            return Err(AppError::Conflict(USERNAME_TAKEN.into()));
        }
        changes.username = Some(username);
    }
    if input.email.is_some() {
        let email = validation::email(input.email.as_deref())?;
        if email != user.email && repo.email_exists(&email).await? {
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }
        changes.email = Some(email);
    }
    if input.password.is_some() {
        let password = validation::password(input.password.as_deref())?;
        changes.password_hash = Some(auth.hash_password(&password)?);
    }

    repo.update_user(user.id, changes).await
}
