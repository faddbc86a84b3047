//! # rr-db-sqlite Implementation
//!
//! This crate implements the data mapping between the SQLite relational model
//! and the `rr-core` domain models. Every repository port is implemented on
//! the single [`SqliteRepo`] so the binary can hand one object to the API.

mod communities;
mod content;
mod rules;
mod users;
mod votes;

use rr_core::error::AppError;
use rr_core::listing::{FilterValue, ListQuery, Page};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;

pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Opens (creating if missing) the database at `url` and runs migrations.
    ///
    /// In-memory databases live inside a single connection, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::with_max_connections(url, 5).await
    }

    pub async fn with_max_connections(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(url, "sqlite repository ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Maps driver failures onto the domain taxonomy.
pub(crate) fn db_err(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::ValidationError("Referenced object does not exist.".into())
        }
        _ => {
            tracing::error!(error = %err, "database failure");
            AppError::Internal(err.to_string())
        }
    }
}

/// Like [`db_err`], but replaces the driver's unique-violation text.
pub(crate) fn conflict_as(message: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |err| match db_err(err) {
        AppError::Conflict(_) => AppError::Conflict(message.into()),
        other => other,
    }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn push_where(qb: &mut QueryBuilder<'_, Sqlite>, query: &ListQuery) {
    let mut first = true;
    let mut keyword = || {
        let kw = if first { " WHERE " } else { " AND " };
        first = false;
        kw
    };

    for filter in &query.filters {
        qb.push(keyword()).push(filter.column).push(" = ");
        match &filter.value {
            FilterValue::Text(v) => qb.push_bind(v.clone()),
            FilterValue::Integer(v) => qb.push_bind(*v),
        };
    }

    if let Some(term) = &query.search {
        if !query.search_columns.is_empty() {
            qb.push(keyword());
            let pattern = format!("%{}%", escape_like(term));
            qb.push("(");
            for (i, column) in query.search_columns.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column).push(" LIKE ").push_bind(pattern.clone()).push(" ESCAPE '\\'");
            }
            qb.push(")");
        }
    }
}

/// Runs a filtered, ordered, paginated SELECT plus the matching COUNT.
pub(crate) async fn list_rows<T>(
    pool: &SqlitePool,
    table: &str,
    columns: &str,
    query: &ListQuery,
    map: fn(&SqliteRow) -> Result<T, sqlx::Error>,
) -> rr_core::Result<Page<T>> {
    let mut count = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {table}"));
    push_where(&mut count, query);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(pool).await.map_err(db_err)?;

    let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {columns} FROM {table}"));
    push_where(&mut select, query);
    for (i, order) in query.ordering.iter().enumerate() {
        select.push(if i == 0 { " ORDER BY " } else { ", " });
        select.push(order.column).push(if order.descending { " DESC" } else { " ASC" });
    }
    select
        .push(" LIMIT ")
        .push_bind(query.page.limit())
        .push(" OFFSET ")
        .push_bind(query.page.offset());

    let rows = select.build().fetch_all(pool).await.map_err(db_err)?;
    let items = rows.iter().map(map).collect::<Result<Vec<_>, _>>().map_err(db_err)?;
    Ok(Page { items, total })
}
