use crate::{utils, FeedError, IdentityRecord, IdentityStore, Table};
use futures::TryStreamExt;
use sqlx::{sqlite::SqliteConnectOptions, sqlite::SqliteRow, Row, SqlitePool};
use std::path::Path;

const RELEASE_TABLE: &str = "lnt_feed";

pub struct ReleaseTable {
    name: String,
    pool: SqlitePool,
}

fn decode(row: &SqliteRow) -> Result<(String, IdentityRecord), FeedError> {
    let url: String = row.try_get("url")?;
    let date: String = row.try_get("date")?;
    let first_seen = match utils::parse_timestamp(&date) {
        Ok(first_seen) => first_seen,
        Err(source) => return Err(FeedError::CorruptRecord { url, date, source }),
    };
    let id = row.try_get("id")?;
    Ok((url, IdentityRecord { id, first_seen }))
}

impl ReleaseTable {
    pub async fn find(&self, url: &str) -> Result<Option<IdentityRecord>, FeedError> {
        let query = format!("SELECT url, id, date FROM {} WHERE url = ?", self.name);
        match sqlx::query(&query)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
        {
            Some(row) => Ok(Some(decode(&row)?.1)),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl Table for ReleaseTable {
    type Record<'a> = (&'a str, &'a IdentityRecord);

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        let query = format!(
            "CREATE TABLE {} (
                url TEXT PRIMARY KEY,
                id TEXT NOT NULL,
                date TEXT NOT NULL
             )",
            &self.name
        );
        sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        Ok(())
    }

    async fn insert<'a>(&self, (url, record): Self::Record<'a>) -> Result<(), sqlx::Error> {
        let mut tx = self.get_pool().begin().await?;
        // No OR IGNORE / OR REPLACE: a second insert for a url must fail.
        let query = format!("INSERT INTO {} (url, id, date) VALUES (?, ?, ?)", &self.name);
        sqlx::query(&query)
            .bind(url)
            .bind(record.id.as_str())
            .bind(utils::format_timestamp(record.first_seen))
            .execute(&mut tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Single writer only, see [`IdentityStore`].
pub struct LntData {
    pub releases: ReleaseTable,
    pool: SqlitePool,
}

impl LntData {
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<LntData, FeedError> {
        let opt = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opt).await?;
        Ok(LntData {
            releases: ReleaseTable {
                name: RELEASE_TABLE.to_string(),
                pool: pool.clone(),
            },
            pool,
        })
    }

    pub async fn all_releases(&self) -> Result<Vec<(String, IdentityRecord)>, FeedError> {
        let mut releases = vec![];
        let query = format!(
            "SELECT url, id, date FROM {} ORDER BY date, rowid",
            self.releases.get_name()
        );
        let mut rows = sqlx::query(&query).fetch(&self.pool);
        while let Some(row) = rows.try_next().await? {
            releases.push(decode(&row)?);
        }
        Ok(releases)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl IdentityStore for LntData {
    async fn ensure_schema(&self) -> Result<(), FeedError> {
        if utils::is_table_exists(&self.pool, self.releases.get_name()).await? {
            tracing::debug!("Use table {}", self.releases.get_name());
        } else {
            tracing::debug!("Create table {}", self.releases.get_name());
            self.releases.create().await?;
        }
        Ok(())
    }

    async fn lookup(&self, url: &str) -> Result<Option<IdentityRecord>, FeedError> {
        self.releases.find(url).await
    }

    async fn record(&self, url: &str, record: &IdentityRecord) -> Result<(), FeedError> {
        Ok(self.releases.insert((url, record)).await?)
    }
}
