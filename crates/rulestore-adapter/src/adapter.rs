//! Policy adapter over an ordered list store
//!
//! All rules of every ptype share one list under one key. Save and load move
//! whole models; the mutation methods touch one record per rule.

use async_trait::async_trait;
use rulestore_core::{load_policy_line, Model, Result, POLICY_SECTIONS};
use tracing::{debug, info};

use crate::config::{AdapterConfig, DEFAULT_KEY};
use crate::filter::RuleFilter;
use crate::record::StoredRule;
use crate::store::{ListStore, RedisListStore};

/// Storage side of a policy engine
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Load every stored rule into the model
    async fn load_policy(&mut self, model: &mut Model) -> Result<()>;

    /// Replace the stored rules with the model's rules
    async fn save_policy(&mut self, model: &Model) -> Result<()>;

    /// Delete every stored rule
    async fn clear_policy(&mut self) -> Result<()>;

    /// Store one rule
    async fn add_policy(&mut self, sec: &str, ptype: &str, rule: Vec<String>) -> Result<()>;

    /// Store several rules, one at a time
    async fn add_policies(&mut self, sec: &str, ptype: &str, rules: Vec<Vec<String>>)
        -> Result<()>;

    /// Remove one stored occurrence of a rule
    async fn remove_policy(&mut self, sec: &str, ptype: &str, rule: Vec<String>) -> Result<()>;

    /// Remove one stored occurrence of each rule, one at a time
    async fn remove_policies(
        &mut self,
        sec: &str,
        ptype: &str,
        rules: Vec<Vec<String>>,
    ) -> Result<()>;

    /// Remove every stored rule of `ptype` whose fields starting at
    /// `field_index` equal `field_values`
    async fn remove_filtered_policy(
        &mut self,
        sec: &str,
        ptype: &str,
        field_index: usize,
        field_values: Vec<String>,
    ) -> Result<()>;
}

/// [`Adapter`] keeping rules in one list of a [`ListStore`]
#[derive(Debug, Clone)]
pub struct ListAdapter<S = RedisListStore> {
    key: String,
    store: S,
}

impl ListAdapter<RedisListStore> {
    /// Connect to Redis as described by `config`
    pub async fn connect(config: &AdapterConfig) -> Result<Self> {
        config.validate()?;
        let store = RedisListStore::connect(config.connection_info()).await?;
        Ok(Self::with_store(store, config.key.clone()))
    }

    /// Connect to Redis at `host:port` using the default key
    pub async fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::connect(&AdapterConfig::new(host, port)).await
    }
}

impl<S: ListStore> ListAdapter<S> {
    /// Use an existing store and key
    pub fn with_store(store: S, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            store,
        }
    }

    /// Key of the rule list
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Switch the store to another logical database.
    ///
    /// Later calls on this adapter use the new database; the key is unchanged.
    pub async fn select_db(&mut self, index: i64) -> Result<()> {
        self.store.select_db(index).await
    }

    /// Release the store connection.
    ///
    /// Consumes the adapter; dropping it drops the store and with it the
    /// Redis connection manager. No further calls are possible afterwards.
    pub fn close(self) {
        debug!(key = %self.key, "closing adapter");
    }

    /// Read and decode the whole list. Nothing is returned unless every
    /// record parses.
    async fn read_rules(&self) -> Result<Vec<StoredRule>> {
        let Some(len) = self.store.len(&self.key).await? else {
            return Ok(Vec::new());
        };

        self.store
            .range(&self.key, 0, len as isize)
            .await?
            .iter()
            .map(|record| StoredRule::from_record(record))
            .collect()
    }

    async fn push_rule(&self, ptype: &str, rule: &[String]) -> Result<()> {
        let record = StoredRule::encode(ptype, rule).to_record()?;
        self.store.push_tail(&self.key, &record).await?;
        metrics::counter!("rulestore_records_written_total").increment(1);
        Ok(())
    }
}

impl<S: ListStore + Default> Default for ListAdapter<S> {
    fn default() -> Self {
        Self::with_store(S::default(), DEFAULT_KEY)
    }
}

#[async_trait]
impl<S: ListStore> Adapter for ListAdapter<S> {
    async fn load_policy(&mut self, model: &mut Model) -> Result<()> {
        let rules = self.read_rules().await?;
        if rules.is_empty() {
            debug!(key = %self.key, "no stored rules to load");
            return Ok(());
        }

        for rule in &rules {
            load_policy_line(&rule.to_line(), model)?;
        }

        metrics::counter!("rulestore_records_loaded_total").increment(rules.len() as u64);
        info!(key = %self.key, rules = rules.len(), "Loaded policy");
        Ok(())
    }

    async fn save_policy(&mut self, model: &Model) -> Result<()> {
        // Delete then append one by one: a failure part way leaves a partial list.
        self.store.delete(&self.key).await?;

        let mut saved = 0usize;
        for sec in POLICY_SECTIONS {
            for ast in model.assertions(sec) {
                for rule in &ast.policy {
                    self.push_rule(&ast.key, rule).await?;
                    saved += 1;
                }
            }
        }

        info!(key = %self.key, rules = saved, "Saved policy");
        Ok(())
    }

    async fn clear_policy(&mut self) -> Result<()> {
        self.store.delete(&self.key).await?;
        info!(key = %self.key, "Cleared stored policy");
        Ok(())
    }

    async fn add_policy(&mut self, _sec: &str, ptype: &str, rule: Vec<String>) -> Result<()> {
        if rule.is_empty() {
            return Ok(());
        }

        self.push_rule(ptype, &rule).await?;
        debug!(ptype, ?rule, "added policy");
        Ok(())
    }

    async fn add_policies(
        &mut self,
        sec: &str,
        ptype: &str,
        rules: Vec<Vec<String>>,
    ) -> Result<()> {
        for rule in rules {
            self.add_policy(sec, ptype, rule).await?;
        }
        Ok(())
    }

    async fn remove_policy(&mut self, _sec: &str, ptype: &str, rule: Vec<String>) -> Result<()> {
        if rule.is_empty() {
            return Ok(());
        }

        let record = StoredRule::encode(ptype, &rule).to_record()?;
        let removed = self.store.remove_first(&self.key, &record).await?;
        metrics::counter!("rulestore_records_removed_total").increment(removed as u64);
        debug!(ptype, ?rule, removed, "removed policy");
        Ok(())
    }

    async fn remove_policies(
        &mut self,
        sec: &str,
        ptype: &str,
        rules: Vec<Vec<String>>,
    ) -> Result<()> {
        for rule in rules {
            self.remove_policy(sec, ptype, rule).await?;
        }
        Ok(())
    }

    async fn remove_filtered_policy(
        &mut self,
        _sec: &str,
        ptype: &str,
        field_index: usize,
        field_values: Vec<String>,
    ) -> Result<()> {
        if field_values.is_empty() {
            return Ok(());
        }

        let filter = RuleFilter::new(ptype, field_index, field_values)?;
        let records = self.store.range(&self.key, 0, -1).await?;
        let outcome = filter.partition(records)?;
        if outcome.removed == 0 {
            return Ok(());
        }

        self.store.replace_all(&self.key, &outcome.retained).await?;
        metrics::counter!("rulestore_records_removed_total").increment(outcome.removed as u64);
        info!(
            key = %self.key,
            ptype,
            field_index,
            removed = outcome.removed,
            "Removed filtered policy"
        );
        Ok(())
    }
}
