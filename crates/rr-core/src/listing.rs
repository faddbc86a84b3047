//! # Listing
//!
//! Filter, search, ordering and page-number pagination for list endpoints.
//! Each entity declares a static [`ListSpec`]; raw query parameters are
//! turned into a validated [`ListQuery`] that storage plugins translate to SQL.
//! Only whitelisted columns ever reach a query.

use serde::Serialize;
use std::collections::HashMap;

use crate::error::{AppError, Result};

pub const INVALID_PAGE: &str = "Invalid page.";

/// How a filter value is parsed before it reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

/// A query parameter name and the column it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub param: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn text(param: &'static str, column: &'static str) -> Self {
        Self { param, column, kind: FieldKind::Text }
    }

    pub const fn integer(param: &'static str, column: &'static str) -> Self {
        Self { param, column, kind: FieldKind::Integer }
    }
}

/// Declarative list behavior for one entity.
#[derive(Debug, Clone, Copy)]
pub struct ListSpec {
    /// Exact-match filters
    pub filters: &'static [Field],
    /// Columns matched by `?search=`
    pub search: &'static [&'static str],
    /// Fields accepted by `?ordering=`
    pub ordering: &'static [Field],
    /// Used when `?ordering=` yields nothing valid
    pub default_ordering: &'static [OrderBy],
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub value: FilterValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub descending: bool,
}

impl OrderBy {
    pub const fn asc(column: &'static str) -> Self {
        Self { column, descending: false }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self { column, descending: true }
    }
}

/// 1-based page number plus the configured page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.size)
    }

    /// Page 1 is always valid; any other page must start before `total`.
    pub fn ensure_in_range(&self, total: i64) -> Result<()> {
        if self.page > 1 && self.offset() >= total {
            return Err(AppError::not_found("Page", INVALID_PAGE));
        }
        Ok(())
    }

    pub fn has_next(&self, total: i64) -> bool {
        self.offset() + self.limit() < total
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// A validated list request ready for a storage plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub search: Option<String>,
    pub search_columns: &'static [&'static str],
    pub ordering: Vec<OrderBy>,
    pub page: PageRequest,
}

impl ListQuery {
    /// Builds a query from raw request parameters. Unknown parameters and
    /// unknown ordering fields are ignored.
    pub fn from_params(
        spec: &ListSpec,
        params: &HashMap<String, String>,
        page_size: u32,
    ) -> Result<Self> {
        let page = match params.get("page") {
            None => 1,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(p) if p >= 1 => p,
                _ => return Err(AppError::not_found("Page", INVALID_PAGE)),
            },
        };

        let mut filters = Vec::new();
        for field in spec.filters {
            let Some(raw) = params.get(field.param) else { continue };
            let value = match field.kind {
                FieldKind::Text => FilterValue::Text(raw.clone()),
                FieldKind::Integer => FilterValue::Integer(raw.trim().parse().map_err(|_| {
                    AppError::ValidationError(format!("{}: Enter a whole number.", field.param))
                })?),
            };
            filters.push(Filter { column: field.column, value });
        }

        let search = params
            .get("search")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && !spec.search.is_empty());

        let mut ordering: Vec<OrderBy> = params
            .get("ordering")
            .map(|raw| {
                raw.split(',')
                    .filter_map(|term| {
                        let term = term.trim();
                        let (name, descending) = match term.strip_prefix('-') {
                            Some(rest) => (rest, true),
                            None => (term, false),
                        };
                        spec.ordering
                            .iter()
                            .find(|f| f.param == name)
                            .map(|f| OrderBy { column: f.column, descending })
                    })
                    .collect()
            })
            .unwrap_or_default();
        if ordering.is_empty() {
            ordering = spec.default_ordering.to_vec();
        }

        Ok(Self {
            filters,
            search,
            search_columns: spec.search,
            ordering,
            page: PageRequest { page, size: page_size.max(1) },
        })
    }

    /// A first-page query with no filters and the default ordering.
    pub fn first_page(spec: &ListSpec, page_size: u32) -> Self {
        Self {
            filters: Vec::new(),
            search: None,
            search_columns: spec.search,
            ordering: spec.default_ordering.to_vec(),
            page: PageRequest { page: 1, size: page_size.max(1) },
        }
    }

    /// Adds a filter that is not driven by a request parameter.
    pub fn with_filter(mut self, column: &'static str, value: FilterValue) -> Self {
        self.filters.push(Filter { column, value });
        self
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), total: self.total }
    }
}

// Per-entity specs. Column names match the SQLite schema.

pub const USER_LIST: ListSpec = ListSpec {
    filters: &[Field::text("username", "username"), Field::text("email", "email")],
    search: &["username", "email"],
    ordering: &[Field::text("username", "username"), Field::text("email", "email")],
    default_ordering: &[OrderBy::asc("id")],
};

pub const COMMUNITY_LIST: ListSpec = ListSpec {
    filters: &[Field::text("name", "name"), Field::text("description", "description")],
    search: &["name", "description"],
    ordering: &[Field::text("name", "name"), Field::text("description", "description")],
    default_ordering: &[OrderBy::desc("created_at"), OrderBy::desc("id")],
};

pub const POST_LIST: ListSpec = ListSpec {
    filters: &[
        Field::text("title", "title"),
        Field::text("content", "content"),
        Field::integer("subreddit", "community_id"),
    ],
    search: &["title", "content"],
    ordering: &[Field::text("title", "title"), Field::text("content", "content")],
    default_ordering: &[OrderBy::desc("created_at"), OrderBy::desc("id")],
};

pub const COMMENT_LIST: ListSpec = ListSpec {
    filters: &[Field::integer("post", "post_id"), Field::text("content", "content")],
    search: &["content"],
    ordering: &[Field::text("content", "content")],
    default_ordering: &[OrderBy::desc("created_at"), OrderBy::desc("id")],
};

pub const RULE_LIST: ListSpec = ListSpec {
    filters: &[Field::text("rule", "rule"), Field::integer("subreddit", "community_id")],
    search: &["rule", "position"],
    ordering: &[Field::text("rule", "rule"), Field::integer("order", "position")],
    default_ordering: &[OrderBy::asc("position"), OrderBy::asc("id")],
};
