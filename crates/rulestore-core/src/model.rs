//! Policy model boundary
//!
//! A minimal stand-in for an authorization engine's in-memory policy model:
//! sections (`p`, `g`) hold named assertions, each assertion holds an ordered
//! list of rules. Adapters read rules out of a model on save and feed text
//! lines into it on load via [`load_policy_line`].

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

use crate::{Error, Result};

/// Sections that carry policy rules, in the order adapters persist them
pub const POLICY_SECTIONS: [&str; 2] = ["p", "g"];

/// One named assertion (`p`, `p2`, `g`, `g2`, ...) and its rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Assertion {
    /// Assertion key, also the rule's ptype
    pub key: String,

    /// Rules in insertion order
    pub policy: Vec<Vec<String>>,
}

impl Assertion {
    /// Create an empty assertion
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            policy: Vec::new(),
        }
    }
}

/// In-memory policy model
#[derive(Debug, Clone, Default)]
pub struct Model {
    model: BTreeMap<String, BTreeMap<String, Assertion>>,

    /// Define unknown ptypes on the fly instead of rejecting their lines
    auto_define: bool,
}

impl Model {
    /// Create an empty model with no definitions
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model with the usual RBAC definitions (`p` and `g`)
    pub fn rbac() -> Self {
        let mut model = Self::new();
        model.add_def("p", "p");
        model.add_def("g", "g");
        model
    }

    /// Create a model that defines any ptype it is asked to load
    pub fn auto_define() -> Self {
        Self {
            auto_define: true,
            ..Self::default()
        }
    }

    /// Define an assertion under a section. Returns false if it already existed.
    pub fn add_def(&mut self, sec: &str, key: &str) -> bool {
        let section = self.model.entry(sec.to_string()).or_default();
        if section.contains_key(key) {
            return false;
        }
        section.insert(key.to_string(), Assertion::new(key));
        true
    }

    /// Raw access to every section
    pub fn get_model(&self) -> &BTreeMap<String, BTreeMap<String, Assertion>> {
        &self.model
    }

    /// Assertions of one section, ordered by key
    pub fn assertions(&self, sec: &str) -> impl Iterator<Item = &Assertion> {
        self.model.get(sec).into_iter().flat_map(|s| s.values())
    }

    /// Look up one assertion
    pub fn assertion(&self, sec: &str, ptype: &str) -> Option<&Assertion> {
        self.model.get(sec).and_then(|s| s.get(ptype))
    }

    /// Rules of one assertion; empty when it is not defined
    pub fn get_policy(&self, sec: &str, ptype: &str) -> &[Vec<String>] {
        self.assertion(sec, ptype)
            .map(|ast| ast.policy.as_slice())
            .unwrap_or_default()
    }

    /// Check whether an assertion holds the given rule
    pub fn has_policy(&self, sec: &str, ptype: &str, rule: &[String]) -> bool {
        self.get_policy(sec, ptype).iter().any(|r| r == rule)
    }

    /// Append a rule to an assertion
    pub fn add_policy(&mut self, sec: &str, ptype: &str, rule: Vec<String>) -> Result<()> {
        if self.auto_define {
            self.add_def(sec, ptype);
        }

        let ast = self
            .model
            .get_mut(sec)
            .and_then(|s| s.get_mut(ptype))
            .ok_or_else(|| Error::model(format!("assertion {sec}.{ptype} is not defined")))?;
        ast.policy.push(rule);
        Ok(())
    }

    /// Drop every rule while keeping the definitions
    pub fn clear_policy(&mut self) {
        for ast in self.model.values_mut().flat_map(|s| s.values_mut()) {
            ast.policy.clear();
        }
    }

    /// Total number of rules across all sections
    pub fn policy_count(&self) -> usize {
        self.model
            .values()
            .flat_map(|s| s.values())
            .map(|ast| ast.policy.len())
            .sum()
    }
}

/// Parse one policy line (`ptype, f0, f1, ...`) into the model.
///
/// Blank lines and `#` comments are ignored. The section is the first
/// character of the ptype, so `g2` rules land in section `g`.
pub fn load_policy_line(line: &str, model: &mut Model) -> Result<()> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }

    let mut tokens = line.split(',').map(str::trim);
    let ptype = match tokens.next() {
        Some(ptype) if !ptype.is_empty() => ptype,
        _ => return Err(Error::model(format!("policy line {line:?} has no ptype"))),
    };
    let sec = &ptype[..ptype.chars().next().map_or(0, char::len_utf8)];
    let rule: Vec<String> = tokens.map(str::to_string).collect();

    trace!(ptype, fields = rule.len(), "loading policy line");
    model.add_policy(sec, ptype, rule)
}
