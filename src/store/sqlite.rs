use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{FeedkeeperError, Result};
use crate::domain::{Article, MergeResult};
use crate::store::{ArticleFilter, ArticleStore, ListOrder};

const ARTICLE_COLUMNS: &str = "url, source, source_title, title, published_at, read, read_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations.to_latest(&mut conn)?;

        Ok(())
    }

    /// A poisoned lock is reported as a storage fault rather than a panic.
    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            FeedkeeperError::StoreUnavailable(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }
}

fn order_clause(order: ListOrder) -> &'static str {
    match order {
        ListOrder::ByReadThenDateDesc => "read ASC, published_at DESC, url ASC",
        ListOrder::DateDesc => "published_at DESC, url ASC",
    }
}

fn from_epoch(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    Ok(Article {
        url: row.get(0)?,
        source: row.get(1)?,
        source_title: row.get(2)?,
        title: row.get(3)?,
        published_at: from_epoch(row.get(4)?),
        read: row.get::<_, i64>(5)? != 0,
        read_at: row.get::<_, Option<i64>>(6)?.map(from_epoch),
    })
}

impl ArticleStore for SqliteStore {
    fn merge_all(&self, candidates: &[Article]) -> Result<MergeResult> {
        let mut conn = self.conn()?;

        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO articles (url, source, source_title, title, published_at, read, read_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(url) DO NOTHING",
            )?;

            for article in candidates {
                inserted += stmt.execute(params![
                    article.url,
                    article.source,
                    article.source_title,
                    article.title,
                    article.published_at.timestamp(),
                    article.read,
                    article.read_at.map(|dt| dt.timestamp()),
                ])?;
            }
        }
        tx.commit()?;

        Ok(MergeResult {
            inserted,
            skipped: candidates.len() - inserted,
        })
    }

    fn mark_read(&self, url: &str) -> Result<()> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE articles SET read = 1, read_at = COALESCE(read_at, ?2) WHERE url = ?1",
            params![url, Utc::now().timestamp()],
        )?;

        if updated == 0 {
            return Err(FeedkeeperError::ArticleNotFound(url.to_string()));
        }
        Ok(())
    }

    fn prune_sources_not_in(&self, valid_names: &HashSet<String>) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let removed = if valid_names.is_empty() {
            tx.execute("DELETE FROM articles", [])?
        } else {
            let placeholders = vec!["?"; valid_names.len()].join(", ");
            let sql = format!(
                "DELETE FROM articles WHERE source NOT IN ({})",
                placeholders
            );
            tx.execute(&sql, params_from_iter(valid_names.iter()))?
        };

        tx.commit()?;
        Ok(removed)
    }

    fn list_filtered(&self, filter: &ArticleFilter, order: ListOrder) -> Result<Vec<Article>> {
        let conn = self.conn()?;

        let sql = format!(
            "SELECT {} FROM articles
             WHERE (?1 IS NULL OR source = ?1) AND (?2 = 0 OR read = 0)
             ORDER BY {}
             LIMIT ?3",
            ARTICLE_COLUMNS,
            order_clause(order)
        );
        let limit = filter.limit.map(|l| l as i64).unwrap_or(-1);

        let mut stmt = conn.prepare(&sql)?;
        let articles = stmt
            .query_map(
                params![filter.source, filter.unread_only, limit],
                article_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(articles)
    }

    fn count(&self, filter: &ArticleFilter) -> Result<usize> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM articles
             WHERE (?1 IS NULL OR source = ?1) AND (?2 = 0 OR read = 0)",
            params![filter.source, filter.unread_only],
            |row| row.get(0),
        )?;

        let count = count as usize;
        Ok(filter.limit.map_or(count, |limit| count.min(limit)))
    }

    fn get(&self, url: &str) -> Result<Option<Article>> {
        let conn = self.conn()?;

        let article = conn
            .query_row(
                &format!("SELECT {} FROM articles WHERE url = ?1", ARTICLE_COLUMNS),
                params![url],
                article_from_row,
            )
            .optional()?;

        Ok(article)
    }
}
