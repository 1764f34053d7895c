//! Positional field filter for bulk removal
//!
//! Matching compares decoded field values at exact positions. It never looks
//! at the serialized text, so a value that happens to be a substring of
//! another field (or contains JSON punctuation) cannot cause a false match.

use rulestore_core::{Error, Result};
use tracing::debug;

use crate::record::{StoredRule, MAX_FIELDS};

/// Selects stored rules of one ptype by a run of field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFilter {
    ptype: String,
    field_index: usize,
    values: Vec<String>,
}

/// Records split by a filter, survivors in their original order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Records that did not match, to be written back
    pub retained: Vec<String>,

    /// Number of records that matched
    pub removed: usize,
}

impl RuleFilter {
    /// Create a filter for `values` starting at field `field_index`.
    ///
    /// Fails when the run would reach past the last stored field.
    pub fn new(ptype: impl Into<String>, field_index: usize, values: Vec<String>) -> Result<Self> {
        if field_index + values.len() > MAX_FIELDS || field_index >= MAX_FIELDS {
            return Err(Error::FieldIndexOutOfRange {
                index: field_index,
                len: values.len(),
                max: MAX_FIELDS,
            });
        }

        Ok(Self {
            ptype: ptype.into(),
            field_index,
            values,
        })
    }

    /// Check a decoded record against the filter.
    ///
    /// An unset field compares as `""`. An empty filter value matches any
    /// field content.
    pub fn matches(&self, rule: &StoredRule) -> bool {
        if rule.ptype != self.ptype {
            return false;
        }

        self.values.iter().enumerate().all(|(offset, expected)| {
            expected.is_empty()
                || rule.field(self.field_index + offset).unwrap_or_default() == expected
        })
    }

    /// Split raw records into survivors and a removed count.
    ///
    /// Any record that fails to parse aborts the whole split, so a corrupt
    /// list is never rewritten.
    pub fn partition(&self, records: Vec<String>) -> Result<FilterOutcome> {
        let mut outcome = FilterOutcome::default();

        for record in records {
            let rule = StoredRule::from_record(&record)?;
            if self.matches(&rule) {
                outcome.removed += 1;
            } else {
                outcome.retained.push(record);
            }
        }

        debug!(
            ptype = %self.ptype,
            field_index = self.field_index,
            removed = outcome.removed,
            retained = outcome.retained.len(),
            "filtered stored rules"
        );
        Ok(outcome)
    }
}
