//! Redis-backed list store

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ConnectionInfo, RedisError};
use rulestore_core::{Error, Result};
use tracing::{debug, info};

use super::ListStore;

/// [`ListStore`] over a single Redis connection.
///
/// The connection manager reconnects on its own; the selected database is part
/// of the connection info, so it survives reconnects.
#[derive(Clone)]
pub struct RedisListStore {
    info: ConnectionInfo,
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisListStore")
            .field("addr", &self.info.addr.to_string())
            .field("db", &self.info.redis.db)
            .finish_non_exhaustive()
    }
}

impl RedisListStore {
    /// Connect and verify the server answers `PING`
    pub async fn connect(info: ConnectionInfo) -> Result<Self> {
        let conn = open(&info).await?;
        info!(addr = %info.addr, db = info.redis.db, "Redis list store connected");
        Ok(Self { info, conn })
    }

    /// Connection details in use
    pub fn connection_info(&self) -> &ConnectionInfo {
        &self.info
    }
}

async fn open(info: &ConnectionInfo) -> Result<ConnectionManager> {
    let client = redis::Client::open(info.clone()).map_err(store_err("open"))?;
    let mut conn = client
        .get_connection_manager()
        .await
        .map_err(store_err("connect"))?;

    let pong: String = redis::cmd("PING")
        .query_async(&mut conn)
        .await
        .map_err(store_err("ping"))?;
    debug!(reply = %pong, "Redis answered ping");

    Ok(conn)
}

fn store_err(op: &'static str) -> impl Fn(RedisError) -> Error {
    move |e| {
        metrics::counter!("rulestore_store_errors_total", "op" => op).increment(1);
        Error::store(format!("{op} failed: {e}"))
    }
}

#[async_trait]
impl ListStore for RedisListStore {
    async fn len(&self, key: &str) -> Result<Option<usize>> {
        let mut conn = self.conn.clone();
        let len: usize = conn.llen(key).await.map_err(store_err("llen"))?;

        // Redis deletes empty lists, so zero length means the key is absent.
        Ok((len > 0).then_some(len))
    }

    async fn range(&self, key: &str, start: isize, end: isize) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let records: Vec<String> = conn
            .lrange(key, start, end)
            .await
            .map_err(store_err("lrange"))?;
        Ok(records)
    }

    async fn push_tail(&self, key: &str, record: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: usize = conn.rpush(key, record).await.map_err(store_err("rpush"))?;
        Ok(())
    }

    async fn remove_first(&self, key: &str, record: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        let removed: usize = conn.lrem(key, 1, record).await.map_err(store_err("lrem"))?;
        Ok(removed)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: usize = conn.del(key).await.map_err(store_err("del"))?;
        Ok(())
    }

    async fn replace_all(&self, key: &str, records: &[String]) -> Result<()> {
        let mut conn = self.conn.clone();

        // MULTI/EXEC: readers see either the old list or the new one.
        let mut pipe = redis::pipe();
        pipe.atomic().del(key).ignore();
        if !records.is_empty() {
            pipe.rpush(key, records).ignore();
        }
        pipe.query_async::<_, ()>(&mut conn)
            .await
            .map_err(store_err("replace"))?;
        Ok(())
    }

    async fn select_db(&mut self, index: i64) -> Result<()> {
        let mut info = self.info.clone();
        info.redis.db = index;

        self.conn = open(&info).await?;
        self.info = info;
        info!(db = index, "Selected Redis database");
        Ok(())
    }
}
