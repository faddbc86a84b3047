//! Object-level access control.

use crate::error::{AppError, Result};
use crate::models::User;

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Reads always pass. Writes need an authenticated actor who owns the
/// object, or an admin.
pub fn owner_or_read_only(actor: Option<&User>, owner: i64, access: Access) -> Result<()> {
    if access == Access::Read {
        return Ok(());
    }
    let user = require_user(actor)?;
    if user.id == owner || user.is_admin() {
        Ok(())
    } else {
        tracing::debug!(user = user.id, owner, "write rejected for non-owner");
        Err(AppError::Forbidden(PERMISSION_DENIED.into()))
    }
}

/// Collection-level check: anyone may read, only authenticated users may create.
pub fn authenticated_or_read_only(actor: Option<&User>, access: Access) -> Result<()> {
    match access {
        Access::Read => Ok(()),
        Access::Write => require_user(actor).map(|_| ()),
    }
}

pub fn require_user(actor: Option<&User>) -> Result<&User> {
    actor.ok_or_else(|| AppError::Unauthorized(NOT_AUTHENTICATED.into()))
}
