use async_trait::async_trait;
use chrono::Utc;
use rr_core::error::{AppError, Result};
use rr_core::listing::{ListQuery, Page};
use rr_core::models::{NewRule, Rule, RuleChanges};
use rr_core::traits::RuleRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::{db_err, list_rows, SqliteRepo};

// `order` is reserved in SQL, so the column is `position`.
const COLUMNS: &str = "id, community_id, rule, position, creator_id, created_at, updated_at";

fn rule_from_row(row: &SqliteRow) -> std::result::Result<Rule, sqlx::Error> {
    Ok(Rule {
        id: row.try_get("id")?,
        subreddit: row.try_get("community_id")?,
        rule: row.try_get("rule")?,
        order: row.try_get("position")?,
        creator: row.try_get("creator_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl RuleRepo for SqliteRepo {
    async fn create_rule(&self, rule: NewRule) -> Result<Rule> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO rules (community_id, rule, position, creator_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(rule.subreddit)
        .bind(rule.rule)
        .bind(rule.order)
        .bind(rule.creator)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        rule_from_row(&row).map_err(db_err)
    }

    async fn get_rule(&self, id: i64) -> Result<Option<Rule>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM rules WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(rule_from_row).transpose().map_err(db_err)
    }

    async fn list_rules(&self, query: &ListQuery) -> Result<Page<Rule>> {
        list_rows(&self.pool, "rules", COLUMNS, query, rule_from_row).await
    }

    async fn update_rule(&self, id: i64, changes: RuleChanges) -> Result<Rule> {
        let row = sqlx::query(&format!(
            "UPDATE rules SET \
               rule = COALESCE(?, rule), \
               position = COALESCE(?, position), \
               updated_at = ? \
             WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(changes.rule)
        .bind(changes.order)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::not_found("Rule", id))?;
        rule_from_row(&row).map_err(db_err)
    }

    async fn delete_rule(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM rules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Rule", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{community, repo, user};
    use rr_core::listing::RULE_LIST;
    use std::collections::HashMap;

    #[tokio::test]
    async fn rules_list_in_order_then_reverse() {
        let repo = repo().await;
        let alice = user(&repo, "alice").await;
        let rust = community(&repo, "rust", alice.id).await;
        for (text, order) in [("no spam", 2), ("be kind", 1), ("stay on topic", 3)] {
            repo.create_rule(NewRule { subreddit: rust.id, rule: text.into(), order, creator: alice.id })
                .await
                .unwrap();
        }

        let page = repo.list_rules(&ListQuery::first_page(&RULE_LIST, 10)).await.unwrap();
        let orders: Vec<i64> = page.items.iter().map(|r| r.order).collect();
        assert_eq!(orders, [1, 2, 3]);

        let params: HashMap<String, String> =
            [("ordering".to_string(), "-order".to_string())].into_iter().collect();
        let page = repo
            .list_rules(&ListQuery::from_params(&RULE_LIST, &params, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(page.items[0].rule, "stay on topic");
    }

    #[tokio::test]
    async fn update_and_delete() {
        let repo = repo().await;
        let alice = user(&repo, "alice").await;
        let rust = community(&repo, "rust", alice.id).await;
        let rule = repo
            .create_rule(NewRule { subreddit: rust.id, rule: "be kind".into(), order: 1, creator: alice.id })
            .await
            .unwrap();

        let updated = repo
            .update_rule(rule.id, RuleChanges { order: Some(5), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.order, 5);
        assert_eq!(updated.rule, "be kind");
        assert_eq!(updated.creator, alice.id);

        repo.delete_rule(rule.id).await.unwrap();
        assert!(matches!(repo.delete_rule(rule.id).await, Err(AppError::NotFound(..))));
    }
}
