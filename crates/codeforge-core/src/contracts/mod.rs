//! The cross-file `Contracts` record.
//!
//! Cross-file identifiers (DOM ids, API endpoints, storage keys, events,
//! module exports/imports) are codified as an explicit tagged-variant
//! [`Schema`] — one variant per [`ContractKind`] — so the validator, fixer,
//! and workers match on the variant tag rather than probing an untyped map.
//! [`extractor`] is the only module that ever constructs a [`ContractEntry`]
//! from raw source text.

pub mod autofix;
pub mod extractor;
pub mod repair;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which of the five cross-file identifier families an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub enum ContractKind {
    /// DOM element id or selector.
    Dom,
    /// HTTP/IPC method + path.
    Api,
    /// Named event.
    Event,
    /// Storage key (local/session storage).
    Storage,
    /// Module path and its exports.
    Module,
}

impl ContractKind {
    /// All five kinds, in a stable order.
    pub const ALL: [ContractKind; 5] = [
        ContractKind::Dom,
        ContractKind::Api,
        ContractKind::Event,
        ContractKind::Storage,
        ContractKind::Module,
    ];

    /// Short label used in issue descriptions and logs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ContractKind::Dom => "dom",
            ContractKind::Api => "api",
            ContractKind::Event => "event",
            ContractKind::Storage => "storage",
            ContractKind::Module => "module",
        }
    }
}

/// Whether a parameter list is invoked positionally or as a single
/// destructured object — the distinction the `parameter-shape-mismatch`
/// issue category is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    /// Not enough information was recoverable from source text.
    Unknown,
    /// Called/declared with positional arguments, named here for diagnostics.
    Positional(Vec<String>),
    /// Called/declared with a single destructured object `{a, b}`.
    Object(Vec<String>),
}

impl Shape {
    fn specificity(&self) -> u8 {
        match self {
            Shape::Unknown => 0,
            Shape::Positional(_) | Shape::Object(_) => 1,
        }
    }
}

/// Where a storage key's value is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBacking {
    /// Not recoverable from source text.
    Unknown,
    /// `localStorage`.
    Persistent,
    /// `sessionStorage`.
    Session,
}

/// The request parameter style for an API contract entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamStyle {
    /// Not recoverable from source text.
    Unknown,
    /// `?key=value` query string parameters.
    Query,
    /// `/resource/:id` path segments.
    Path,
    /// JSON request body.
    Body,
}

/// The typed shape of one contract entry, one variant per [`ContractKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schema {
    /// No shape information recovered yet.
    Unknown,
    /// DOM element metadata.
    Dom {
        /// HTML tag name, if observed on a producer.
        tag: Option<String>,
        /// Attribute names observed on the element.
        attributes: Vec<String>,
    },
    /// HTTP/IPC endpoint metadata.
    Api {
        /// Request parameter shape.
        request_shape: Shape,
        /// Response payload shape.
        response_shape: Shape,
        /// How parameters are passed.
        param_style: ParamStyle,
    },
    /// Event payload metadata.
    Event {
        /// Event payload shape.
        payload_shape: Shape,
    },
    /// Storage key metadata.
    Storage {
        /// Which storage backs this key.
        backing: StorageBacking,
        /// The stored value's shape.
        value_shape: Shape,
    },
    /// Module export metadata.
    Module {
        /// Named exports observed on a producer.
        exports: Vec<String>,
    },
}

impl Schema {
    fn specificity(&self) -> u8 {
        match self {
            Schema::Unknown => 0,
            Schema::Dom { .. } | Schema::Event { .. } | Schema::Module { .. } => 1,
            Schema::Api { .. } | Schema::Storage { .. } => 1,
        }
    }

    /// Merge two schema observations for the same key, taking the more
    /// specific one. Returns `Some(merged)` when they
    /// agree or one subsumes the other, `None` on an irreconcilable conflict
    /// (different field names/types for the same key).
    #[must_use]
    pub fn reconcile(self, other: Schema) -> Reconciled {
        if self == other {
            return Reconciled::Merged(self);
        }
        match (self.specificity(), other.specificity()) {
            (0, _) => Reconciled::Merged(other),
            (_, 0) => Reconciled::Merged(self),
            _ => Reconciled::Conflict(self, other),
        }
    }
}

/// Outcome of reconciling two schema observations for the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// The two observations were compatible; this is the merged schema.
    Merged(Schema),
    /// The two observations disagree on shape; both are kept for the
    /// validator to flag as `schema-mismatch`.
    Conflict(Schema, Schema),
}

/// One cross-file identifier: its schema plus the files that produce and
/// consume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEntry {
    /// The identifier itself (DOM id, `METHOD /path`, event name, storage
    /// key, or module path).
    pub key: String,
    /// The reconciled schema.
    pub schema: Schema,
    /// Files that define/register this identifier.
    pub producers: BTreeSet<String>,
    /// Files that reference this identifier.
    pub consumers: BTreeSet<String>,
    /// Set when two producers disagree on schema for this key; the
    /// validator surfaces this as `schema-mismatch`.
    #[serde(default)]
    pub conflicting_schemas: Vec<Schema>,
}

impl ContractEntry {
    /// A fresh entry for `key` with no producers/consumers yet.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            schema: Schema::Unknown,
            producers: BTreeSet::new(),
            consumers: BTreeSet::new(),
            conflicting_schemas: Vec::new(),
        }
    }

    fn merge_from(&mut self, other: ContractEntry) {
        self.producers.extend(other.producers);
        self.consumers.extend(other.consumers);
        let existing = std::mem::replace(&mut self.schema, Schema::Unknown);
        match existing.reconcile(other.schema) {
            Reconciled::Merged(schema) => self.schema = schema,
            Reconciled::Conflict(a, b) => {
                self.schema = a;
                self.conflicting_schemas.push(b);
            }
        }
        self.conflicting_schemas.extend(other.conflicting_schemas);
    }
}

/// A single table of one [`ContractKind`]'s entries, keyed by identifier.
pub type ContractTable = BTreeMap<String, ContractEntry>;

/// The five producer/consumer tables, one per [`ContractKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contracts {
    /// DOM element ids/selectors.
    #[serde(default)]
    pub dom: ContractTable,
    /// HTTP/IPC endpoints.
    #[serde(default)]
    pub api: ContractTable,
    /// Named events.
    #[serde(default)]
    pub event: ContractTable,
    /// Storage keys.
    #[serde(default)]
    pub storage: ContractTable,
    /// Module paths.
    #[serde(default)]
    pub module: ContractTable,
}

impl Contracts {
    /// The table for `kind`.
    #[must_use]
    pub fn table(&self, kind: ContractKind) -> &ContractTable {
        match kind {
            ContractKind::Dom => &self.dom,
            ContractKind::Api => &self.api,
            ContractKind::Event => &self.event,
            ContractKind::Storage => &self.storage,
            ContractKind::Module => &self.module,
        }
    }

    /// The table for `kind`, mutably.
    pub fn table_mut(&mut self, kind: ContractKind) -> &mut ContractTable {
        match kind {
            ContractKind::Dom => &mut self.dom,
            ContractKind::Api => &mut self.api,
            ContractKind::Event => &mut self.event,
            ContractKind::Storage => &mut self.storage,
            ContractKind::Module => &mut self.module,
        }
    }

    /// Total number of distinct `(kind, key)` entries across all tables.
    #[must_use]
    pub fn key_count(&self) -> usize {
        ContractKind::ALL
            .iter()
            .map(|k| self.table(*k).len())
            .sum()
    }

    /// Insert or merge a single entry under `kind`. Producers/consumers are
    /// unioned; schemas are reconciled per [`Schema::reconcile`]. Keys are
    /// never removed — merging is monotone.
    pub fn upsert(&mut self, kind: ContractKind, entry: ContractEntry) {
        let table = self.table_mut(kind);
        match table.get_mut(&entry.key) {
            Some(existing) => existing.merge_from(entry),
            None => {
                table.insert(entry.key.clone(), entry);
            }
        }
    }

    /// Fold `other` into `self`, per-kind, per-key, via [`Self::upsert`].
    /// Monotone: `self.key_count()` after `merge` is never smaller than
    /// before.
    pub fn merge(&mut self, other: Contracts) {
        for kind in ContractKind::ALL {
            let table = match kind {
                ContractKind::Dom => other.dom,
                ContractKind::Api => other.api,
                ContractKind::Event => other.event,
                ContractKind::Storage => other.storage,
                ContractKind::Module => other.module,
            };
            for (_, entry) in table {
                self.upsert(kind, entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, producer: &str) -> ContractEntry {
        let mut e = ContractEntry::new(key);
        e.producers.insert(producer.to_string());
        e
    }

    #[test]
    fn upsert_on_fresh_key_inserts() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Dom, entry("save-btn", "index.html"));
        assert_eq!(contracts.key_count(), 1);
        assert!(contracts.dom.contains_key("save-btn"));
    }

    #[test]
    fn upsert_on_existing_key_unions_producers_and_consumers() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Dom, entry("save-btn", "index.html"));
        let mut second = ContractEntry::new("save-btn");
        second.consumers.insert("index.js".to_string());
        contracts.upsert(ContractKind::Dom, second);

        let merged = &contracts.dom["save-btn"];
        assert!(merged.producers.contains("index.html"));
        assert!(merged.consumers.contains("index.js"));
        assert_eq!(contracts.key_count(), 1, "merge must not create a second entry");
    }

    #[test]
    fn merge_is_monotone_in_key_count() {
        let mut a = Contracts::default();
        a.upsert(ContractKind::Dom, entry("x", "a.html"));

        let mut b = Contracts::default();
        b.upsert(ContractKind::Dom, entry("y", "b.html"));

        let before = a.key_count();
        a.merge(b);
        assert!(a.key_count() >= before);
        assert_eq!(a.key_count(), 2);
    }

    #[test]
    fn merging_empty_contracts_never_shrinks_key_count() {
        let mut a = Contracts::default();
        a.upsert(ContractKind::Api, entry("GET /items", "server.py"));
        let before = a.key_count();
        a.merge(Contracts::default());
        assert_eq!(a.key_count(), before);
    }

    #[test]
    fn schema_reconcile_prefers_specific_over_unknown() {
        let specific = Schema::Dom {
            tag: Some("button".into()),
            attributes: vec![],
        };
        let reconciled = Schema::Unknown.reconcile(specific.clone());
        assert_eq!(reconciled, Reconciled::Merged(specific));
    }

    #[test]
    fn schema_reconcile_flags_conflicting_specifics() {
        let a = Schema::Module {
            exports: vec!["foo".into()],
        };
        let b = Schema::Module {
            exports: vec!["bar".into()],
        };
        let reconciled = a.clone().reconcile(b.clone());
        assert_eq!(reconciled, Reconciled::Conflict(a, b));
    }

    #[test]
    fn conflicting_schema_merge_keeps_both_observations() {
        let mut contracts = Contracts::default();
        let mut e1 = entry("saveNote", "preload.js");
        e1.schema = Schema::Module {
            exports: vec!["save".into()],
        };
        contracts.upsert(ContractKind::Module, e1);

        let mut e2 = entry("saveNote", "other.js");
        e2.schema = Schema::Module {
            exports: vec!["persist".into()],
        };
        contracts.upsert(ContractKind::Module, e2);

        let merged = &contracts.module["saveNote"];
        assert_eq!(merged.conflicting_schemas.len(), 1);
    }
}
