//! # rr-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits.
//! One submodule per resource; the form views live in [`views`].

pub mod accounts;
pub mod comments;
pub mod communities;
pub mod posts;
pub mod rules;
pub mod views;
pub mod votes;

use rr_core::error::AppError;
use rr_core::listing::{ListQuery, ListSpec};
use rr_core::traits::{AuthProvider, MediaStore, Repository};
use std::collections::HashMap;

use crate::error::ApiResult;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub repo: Box<dyn Repository>,
    pub store: Box<dyn MediaStore>,
    pub auth: Box<dyn AuthProvider>,
    pub options: ApiOptions,
}

/// Runtime knobs the handlers need from the settings file.
#[derive(Debug, Clone)]
pub struct ApiOptions {
    pub page_size: u32,
    pub max_image_bytes: usize,
    /// Adds `Secure` to the session cookie
    pub secure_cookies: bool,
    pub session_ttl_secs: i64,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_image_bytes: 5 * 1024 * 1024,
            secure_cookies: true,
            session_ttl_secs: 14 * 24 * 60 * 60,
        }
    }
}

impl AppState {
    pub(crate) fn list_query(
        &self,
        spec: &ListSpec,
        params: &HashMap<String, String>,
    ) -> ApiResult<ListQuery> {
        Ok(ListQuery::from_params(spec, params, self.options.page_size)?)
    }
}

/// Unwraps a lookup, turning `None` into a 404.
pub(crate) fn found<T>(value: Option<T>, kind: &str, id: i64) -> ApiResult<T> {
    value.ok_or_else(|| AppError::not_found(kind, id).into())
}
