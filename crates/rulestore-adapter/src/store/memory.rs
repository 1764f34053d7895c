//! In-process list store with Redis list semantics

use async_trait::async_trait;
use parking_lot::Mutex;
use rulestore_core::Result;
use std::collections::HashMap;
use std::sync::Arc;

use super::ListStore;

type Database = HashMap<String, Vec<String>>;

/// Memory-backed [`ListStore`].
///
/// Clones share the same data but each keeps its own selected database, like
/// separate connections to one server. Empty lists are removed, as Redis does.
#[derive(Debug, Clone, Default)]
pub struct MemoryListStore {
    databases: Arc<Mutex<HashMap<i64, Database>>>,
    db: i64,
}

impl MemoryListStore {
    /// Create an empty store on database 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected database
    pub fn db(&self) -> i64 {
        self.db
    }

    /// Copy of a list, empty when the key does not exist
    pub fn snapshot(&self, key: &str) -> Vec<String> {
        self.databases
            .lock()
            .get(&self.db)
            .and_then(|db| db.get(key))
            .cloned()
            .unwrap_or_default()
    }

    fn with_db<T>(&self, f: impl FnOnce(&mut Database) -> T) -> T {
        let mut databases = self.databases.lock();
        f(databases.entry(self.db).or_default())
    }
}

/// Resolve `LRANGE` bounds against a list of `len` elements
fn resolve_range(len: usize, start: isize, end: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let end = if end < 0 { end + len } else { end.min(len - 1) };

    if len == 0 || start > end || start >= len {
        return None;
    }
    Some((start as usize, end as usize))
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn len(&self, key: &str) -> Result<Option<usize>> {
        Ok(self.with_db(|db| db.get(key).map(Vec::len)))
    }

    async fn range(&self, key: &str, start: isize, end: isize) -> Result<Vec<String>> {
        Ok(self.with_db(|db| {
            let Some(list) = db.get(key) else {
                return Vec::new();
            };
            match resolve_range(list.len(), start, end) {
                Some((start, end)) => list[start..=end].to_vec(),
                None => Vec::new(),
            }
        }))
    }

    async fn push_tail(&self, key: &str, record: &str) -> Result<()> {
        self.with_db(|db| db.entry(key.to_string()).or_default().push(record.to_string()));
        Ok(())
    }

    async fn remove_first(&self, key: &str, record: &str) -> Result<usize> {
        Ok(self.with_db(|db| {
            let Some(list) = db.get_mut(key) else {
                return 0;
            };
            let Some(pos) = list.iter().position(|r| r == record) else {
                return 0;
            };
            list.remove(pos);
            if list.is_empty() {
                db.remove(key);
            }
            1
        }))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.with_db(|db| db.remove(key));
        Ok(())
    }

    async fn replace_all(&self, key: &str, records: &[String]) -> Result<()> {
        self.with_db(|db| {
            if records.is_empty() {
                db.remove(key);
            } else {
                db.insert(key.to_string(), records.to_vec());
            }
        });
        Ok(())
    }

    async fn select_db(&mut self, index: i64) -> Result<()> {
        self.db = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with(records: &[&str]) -> MemoryListStore {
        let store = MemoryListStore::new();
        for record in records {
            store.push_tail("k", record).await.unwrap();
        }
        store
    }

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(3, 0, 3), Some((0, 2)));
        assert_eq!(resolve_range(3, 0, -1), Some((0, 2)));
        assert_eq!(resolve_range(3, -2, -1), Some((1, 2)));
        assert_eq!(resolve_range(3, -10, 0), Some((0, 0)));
        assert_eq!(resolve_range(3, 1, 0), None);
        assert_eq!(resolve_range(3, 3, 5), None);
        assert_eq!(resolve_range(0, 0, 0), None);
    }

    #[tokio::test]
    async fn test_len_absent_key() {
        let store = MemoryListStore::new();
        assert_eq!(store.len("missing").await.unwrap(), None);
        assert!(store.range("missing", 0, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_range_one_past_end_returns_full_list() {
        let store = store_with(&["a", "b", "c"]).await;
        let len = store.len("k").await.unwrap().unwrap();
        assert_eq!(store.range("k", 0, len as isize).await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_remove_first_only() {
        let store = store_with(&["a", "b", "a"]).await;

        assert_eq!(store.remove_first("k", "a").await.unwrap(), 1);
        assert_eq!(store.snapshot("k"), vec!["b", "a"]);

        assert_eq!(store.remove_first("k", "zzz").await.unwrap(), 0);
        assert_eq!(store.snapshot("k"), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_emptied_list_disappears() {
        let store = store_with(&["a"]).await;
        store.remove_first("k", "a").await.unwrap();
        assert_eq!(store.len("k").await.unwrap(), None);

        let store = store_with(&["a"]).await;
        store.replace_all("k", &[]).await.unwrap();
        assert_eq!(store.len("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_select_db_isolates_lists() {
        let mut store = store_with(&["a"]).await;
        let other = store.clone();

        store.select_db(1).await.unwrap();
        assert_eq!(store.len("k").await.unwrap(), None);
        store.push_tail("k", "b").await.unwrap();

        assert_eq!(other.snapshot("k"), vec!["a"]);
        assert_eq!(store.snapshot("k"), vec!["b"]);
    }
}
