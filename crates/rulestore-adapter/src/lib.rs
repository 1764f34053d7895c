//! rulestore Adapter
//!
//! Persists authorization policy rules in an ordered list store (Redis).
//!
//! Each rule is one list element holding a JSON record: a ptype tag plus up
//! to six positional fields. The adapter provides:
//! - Full load (store to model) and destructive save (model to store)
//! - Single and batch add/remove of rules
//! - Filtered removal by positional field values
//! - Namespace switching via the store's logical databases

pub mod adapter;
pub mod config;
pub mod filter;
pub mod record;
pub mod store;

pub use adapter::{Adapter, ListAdapter};
pub use config::{AdapterConfig, DEFAULT_KEY};
pub use filter::{FilterOutcome, RuleFilter};
pub use record::{StoredRule, MAX_FIELDS};
pub use store::{ListStore, MemoryListStore, RedisListStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::adapter::{Adapter, ListAdapter};
    pub use crate::config::AdapterConfig;
    pub use crate::record::StoredRule;
    pub use crate::store::{ListStore, MemoryListStore, RedisListStore};
    pub use rulestore_core::{Error, Model, Result};
}
