//! Stored rule record and its codec
//!
//! Every rule lives in the list as one JSON object:
//! `{"ptype":"p","v0":"alice","v1":"data1","v2":"read"}`. Keys are written in
//! a fixed order and unset fields are omitted, so equal rules always produce
//! byte-identical records. Removal relies on that.

use rulestore_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of positional fields a record can hold
pub const MAX_FIELDS: usize = 6;

/// A policy rule in its persisted shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRule {
    /// Store-assigned identity, carried through but never interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Policy type tag (`p`, `g`, `g2`, ...)
    pub ptype: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v0: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v5: Option<String>,
}

impl StoredRule {
    /// Build a record from a ptype and an engine rule.
    ///
    /// Fields fill `v0..` in order. Anything past the sixth field is dropped.
    pub fn encode<S: AsRef<str>>(ptype: impl Into<String>, rule: &[S]) -> Self {
        let ptype = ptype.into();
        if rule.len() > MAX_FIELDS {
            warn!(
                ptype = %ptype,
                fields = rule.len(),
                "rule has more than {} fields, extra fields are dropped",
                MAX_FIELDS
            );
        }

        let mut fields = rule.iter().map(|v| v.as_ref().to_string());
        Self {
            id: None,
            ptype,
            v0: fields.next(),
            v1: fields.next(),
            v2: fields.next(),
            v3: fields.next(),
            v4: fields.next(),
            v5: fields.next(),
        }
    }

    /// Positional view of `v0..v5`
    pub fn fields(&self) -> [Option<&str>; MAX_FIELDS] {
        [
            self.v0.as_deref(),
            self.v1.as_deref(),
            self.v2.as_deref(),
            self.v3.as_deref(),
            self.v4.as_deref(),
            self.v5.as_deref(),
        ]
    }

    /// Field at a position, `None` when unset or out of range
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields().get(index).copied().flatten()
    }

    /// Every set, non-empty field in positional order.
    ///
    /// A gap does not stop the scan: with `v1` empty and `v2` set, `v2` is
    /// still returned. Existing stored data depends on this.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields()
            .into_iter()
            .flatten()
            .filter(|v| !v.is_empty())
    }

    /// Engine rule form (fields only)
    pub fn to_rule(&self) -> Vec<String> {
        self.values().map(str::to_string).collect()
    }

    /// Policy line form: `ptype, v0, v1, ...`
    pub fn to_line(&self) -> String {
        let mut line = self.ptype.clone();
        for value in self.values() {
            line.push_str(", ");
            line.push_str(value);
        }
        line
    }

    /// Serialize to the list element stored in the backing list
    pub fn to_record(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a list element read back from the store
    pub fn from_record(record: &str) -> Result<Self> {
        let rule: Self =
            serde_json::from_str(record).map_err(|e| Error::malformed(record, e.to_string()))?;

        if rule.ptype.is_empty() {
            return Err(Error::malformed(record, "empty ptype"));
        }

        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rulestore_core::{load_policy_line, Model};

    #[test]
    fn test_encode_fills_positions_in_order() {
        let rule = StoredRule::encode("p", &["alice", "data1", "read"]);

        assert_eq!(rule.ptype, "p");
        assert_eq!(rule.v0.as_deref(), Some("alice"));
        assert_eq!(rule.v2.as_deref(), Some("read"));
        assert_eq!(rule.v3, None);
        assert_eq!(rule.id, None);
    }

    #[test]
    fn test_encode_drops_fields_past_six() {
        let fields: Vec<String> = (0..8).map(|i| format!("f{}", i)).collect();
        let rule = StoredRule::encode("p", &fields);

        assert_eq!(rule.v5.as_deref(), Some("f5"));
        assert_eq!(rule.to_rule().len(), MAX_FIELDS);
    }

    #[test]
    fn test_record_format() {
        let record = StoredRule::encode("p", &["alice", "data1", "read"])
            .to_record()
            .unwrap();
        assert_eq!(
            record,
            r#"{"ptype":"p","v0":"alice","v1":"data1","v2":"read"}"#
        );
    }

    #[test]
    fn test_equal_rules_serialize_identically() {
        let a = StoredRule::encode("g", &["alice".to_string(), "admin".to_string()]);
        let b = StoredRule::encode("g", &["alice", "admin"]);
        assert_eq!(a.to_record().unwrap(), b.to_record().unwrap());
    }

    #[test]
    fn test_line_keeps_fields_after_gap() {
        let rule = StoredRule {
            ptype: "p".into(),
            v0: Some("alice".into()),
            v1: Some(String::new()),
            v2: Some("read".into()),
            ..Default::default()
        };
        assert_eq!(rule.to_line(), "p, alice, read");
    }

    #[test]
    fn test_from_record_accepts_id_and_unknown_keys() {
        let rule =
            StoredRule::from_record(r#"{"id":7,"ptype":"g","v0":"bob","v1":"admin","extra":1}"#)
                .unwrap();
        assert_eq!(rule.id, Some(7));
        assert_eq!(rule.to_line(), "g, bob, admin");
    }

    #[test]
    fn test_from_record_rejects_malformed() {
        for record in [r#"not json"#, r#"{"v0":"alice"}"#, r#"{"ptype":""}"#, r#"{"ptype":"p","v0":1}"#] {
            let err = StoredRule::from_record(record).unwrap_err();
            assert!(
                matches!(err, Error::MalformedRecord { .. }),
                "{record} should be malformed"
            );
        }
    }

    #[test]
    fn test_field_access() {
        let rule = StoredRule::encode("p", &["alice", "data1"]);
        assert_eq!(rule.field(1), Some("data1"));
        assert_eq!(rule.field(2), None);
        assert_eq!(rule.field(9), None);
    }

    proptest! {
        #[test]
        fn prop_line_round_trip(fields in proptest::collection::vec("[a-z0-9_]{1,12}", 1..=MAX_FIELDS)) {
            let record = StoredRule::encode("p", &fields).to_record().unwrap();
            let decoded = StoredRule::from_record(&record).unwrap();

            let mut model = Model::rbac();
            load_policy_line(&decoded.to_line(), &mut model).unwrap();
            prop_assert_eq!(model.get_policy("p", "p"), &[fields][..]);
        }
    }
}
