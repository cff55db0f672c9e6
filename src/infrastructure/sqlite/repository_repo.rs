use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use chrono::DateTime;
use tracing::debug;
use crate::domain::entities::RepositoryRecord;
use crate::domain::value_objects::{Predicate, RepositoryFilter, SortKey};
use crate::ports::repository::RepositoryPort;
use crate::shared::error::GitsearchError;
use crate::shared::result::Result;

const SELECT_REPOSITORIES: &str = r#"
    SELECT id, name, description, owner, language, stars, forks, last_updated
    FROM repositories
"#;

/// SQLite 仓库仓储实现
pub struct SqliteRepositoryRepository {
    pool: SqlitePool,
}

impl SqliteRepositoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn record_from_row(r: &SqliteRow) -> Result<RepositoryRecord> {
    let ts: i64 = r.try_get("last_updated")?;
    let last_updated = DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| GitsearchError::Internal(format!("Invalid last_updated timestamp: {}", ts)))?;

    Ok(RepositoryRecord {
        id: r.try_get("id")?,
        name: r.try_get("name")?,
        description: r.try_get("description")?,
        owner: r.try_get("owner")?,
        language: r.try_get("language")?,
        stars: r.try_get("stars")?,
        forks: r.try_get("forks")?,
        last_updated,
    })
}

#[async_trait]
impl RepositoryPort for SqliteRepositoryRepository {
    async fn upsert_all(&self, records: &[RepositoryRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO repositories (id, name, description, owner, language, stars, forks, last_updated)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    description = excluded.description,
                    owner = excluded.owner,
                    language = excluded.language,
                    stars = excluded.stars,
                    forks = excluded.forks,
                    last_updated = excluded.last_updated
                "#,
            )
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.description)
            .bind(&record.owner)
            .bind(&record.language)
            .bind(record.stars)
            .bind(record.forks)
            .bind(record.last_updated.timestamp())
            .execute(&mut *tx)
            .await?;
        }

        // 任一条失败时 tx 被 drop，整体回滚
        tx.commit().await?;
        Ok(records.len())
    }

    async fn query(&self, filter: &RepositoryFilter, sort: SortKey) -> Result<Vec<RepositoryRecord>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_REPOSITORIES);

        for (i, predicate) in filter.predicates().into_iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::LanguageEquals(language) => {
                    builder.push("language = ").push_bind(language);
                }
                Predicate::MinStars(min_stars) => {
                    builder.push("stars >= ").push_bind(min_stars);
                }
            }
        }

        // 列名来自 SortKey 的固定映射，不拼接用户输入
        builder.push(" ORDER BY ").push(sort.column()).push(" DESC");

        debug!("Querying repositories: {}", builder.sql());

        let rows = builder.build().fetch_all(&self.pool).await?;

        rows.iter().map(record_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::infrastructure::sqlite::create_memory_pool;

    fn record(id: i64, language: Option<&str>, stars: i64, forks: i64, updated_day: u32) -> RepositoryRecord {
        let mut record = RepositoryRecord::new(
            id,
            format!("repo-{}", id),
            "octocat".to_string(),
            stars,
            forks,
            Utc.with_ymd_and_hms(2024, 1, updated_day, 12, 0, 0).unwrap(),
        );
        if let Some(language) = language {
            record = record.with_language(language.to_string());
        }
        record
    }

    async fn store() -> SqliteRepositoryRepository {
        SqliteRepositoryRepository::new(create_memory_pool().await.unwrap())
    }

    fn ids(records: &[RepositoryRecord]) -> Vec<i64> {
        records.iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn upsert_overwrites_every_field() {
        let store = store().await;
        let original = record(1, Some("Java"), 10, 1, 1).with_description("old".to_string());
        store.upsert_all(&[original]).await.unwrap();

        let mut updated = record(1, None, 99, 42, 20);
        updated.name = "renamed".to_string();
        updated.owner = "someone-else".to_string();
        store.upsert_all(&[updated.clone()]).await.unwrap();

        let all = store.query(&RepositoryFilter::default(), SortKey::Stars).await.unwrap();
        assert_eq!(all, vec![updated]);
    }

    #[tokio::test]
    async fn failed_batch_leaves_no_partial_writes() {
        let store = store().await;
        let existing = record(1, Some("Rust"), 5, 0, 1);
        store.upsert_all(&[existing.clone()]).await.unwrap();

        // 负数违反 CHECK 约束，整批回滚
        let overwrite = record(1, Some("Go"), 500, 50, 2);
        let fresh = record(2, Some("Go"), 7, 0, 3);
        let invalid = record(3, Some("Go"), -1, 0, 4);
        let result = store.upsert_all(&[overwrite, fresh, invalid]).await;
        assert!(result.is_err());

        let all = store.query(&RepositoryFilter::default(), SortKey::Stars).await.unwrap();
        assert_eq!(all, vec![existing]);
    }

    #[tokio::test]
    async fn empty_upsert_is_a_no_op() {
        let store = store().await;
        assert_eq!(store.upsert_all(&[]).await.unwrap(), 0);
        assert!(store.query(&RepositoryFilter::default(), SortKey::Stars).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn language_and_min_stars_combine_with_and() {
        let store = store().await;
        store
            .upsert_all(&[
                record(1, Some("Java"), 150, 3, 1),
                record(2, Some("Java"), 99, 50, 2),
                record(3, Some("Rust"), 500, 80, 3),
                record(4, Some("Java"), 100, 9, 4),
                record(5, None, 1000, 1, 5),
            ])
            .await
            .unwrap();

        let filter = RepositoryFilter::new(Some("Java".to_string()), Some(100));
        let result = store.query(&filter, SortKey::Forks).await.unwrap();
        assert_eq!(ids(&result), vec![4, 1]);
        assert!(result.iter().all(|r| r.language.as_deref() == Some("Java") && r.stars >= 100));
    }

    #[tokio::test]
    async fn sorts_descending_by_requested_key() {
        let store = store().await;
        store
            .upsert_all(&[
                record(1, None, 10, 300, 5),
                record(2, None, 30, 100, 25),
                record(3, None, 20, 200, 15),
            ])
            .await
            .unwrap();

        let all = RepositoryFilter::default();
        assert_eq!(ids(&store.query(&all, SortKey::Stars).await.unwrap()), vec![2, 3, 1]);
        assert_eq!(ids(&store.query(&all, SortKey::Forks).await.unwrap()), vec![1, 3, 2]);
        assert_eq!(ids(&store.query(&all, SortKey::Updated).await.unwrap()), vec![2, 3, 1]);
        assert_eq!(
            ids(&store.query(&all, SortKey::from_param(Some("bogus"))).await.unwrap()),
            vec![2, 3, 1]
        );
    }

    #[tokio::test]
    async fn blank_language_imposes_no_constraint() {
        let store = store().await;
        store
            .upsert_all(&[record(1, Some("Java"), 1, 0, 1), record(2, None, 2, 0, 2)])
            .await
            .unwrap();

        let filter = RepositoryFilter::new(Some(" ".to_string()), None);
        assert_eq!(store.query(&filter, SortKey::Stars).await.unwrap().len(), 2);
    }
}
