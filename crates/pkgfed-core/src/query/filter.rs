//! Module: query::filter
//! Responsibility: filter descriptors with construction-time parameter
//! snapshots.
//! Does not own: record field access or remote query translation.
//! Boundary: a descriptor is re-executable state handed to the paging layer.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

///
/// ParamTable
///
/// Named constants frozen into a descriptor at construction time. Because
/// the table holds values, not references, re-executing the descriptor later
/// (as the paged source cache does on every chunk fetch) always observes the
/// value as of construction, never a mutated current value. The table is
/// serializable so a source adapter can translate it into a remote query.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ParamTable {
    entries: Vec<(String, Value)>,
}

impl ParamTable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set a named parameter, replacing any previous value under that name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();

        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Builder-style `set`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for ParamTable {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, value) in iter {
            table.set(name, value);
        }

        table
    }
}

///
/// FilterSpec
///
/// Predicate descriptor over records. The default path (`bind`) snapshots
/// every externally-referenced value into a [`ParamTable`]; the matcher only
/// ever reads the frozen table. `unbound` is the in-process fast path for
/// already-materialized local collections and is a pure optimization.
///

pub struct FilterSpec<T> {
    params: ParamTable,
    matcher: Rc<dyn Fn(&T, &ParamTable) -> bool>,
}

impl<T> FilterSpec<T> {
    /// Bind a matcher against a frozen parameter table.
    pub fn bind(params: ParamTable, matcher: impl Fn(&T, &ParamTable) -> bool + 'static) -> Self {
        Self {
            params,
            matcher: Rc::new(matcher),
        }
    }

    /// Fast path: a plain closure with an empty table. Only valid when the
    /// descriptor is evaluated immediately against local data; it cannot be
    /// translated for a remote source.
    pub fn unbound(pred: impl Fn(&T) -> bool + 'static) -> Self {
        Self {
            params: ParamTable::new(),
            matcher: Rc::new(move |item, _| pred(item)),
        }
    }

    #[must_use]
    pub fn matches(&self, item: &T) -> bool {
        (self.matcher)(item, &self.params)
    }

    /// The frozen parameter table, e.g. for translation to a remote query.
    #[must_use]
    pub const fn params(&self) -> &ParamTable {
        &self.params
    }
}

impl<T> Clone for FilterSpec<T> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            matcher: Rc::clone(&self.matcher),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_freezes_values_at_construction() {
        let mut threshold = 3_i64;

        let params = ParamTable::new().with("min_rank", threshold);
        let spec = FilterSpec::bind(params, |item: &i64, params| {
            params.get("min_rank").and_then(Value::as_int).is_some_and(
                |min| *item >= min,
            )
        });

        // Mutating the caller's local after construction must not be
        // observable on re-evaluation.
        threshold = 100;
        let _ = threshold;

        assert!(!spec.matches(&2));
        assert!(spec.matches(&3));
        assert!(spec.matches(&99));
    }

    #[test]
    fn set_replaces_existing_entry() {
        let mut params = ParamTable::new();
        params.set("name", "serde");
        params.set("name", "tokio");

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("name").and_then(Value::as_text), Some("tokio"));
    }

    #[test]
    fn unbound_fast_path_has_empty_table() {
        let spec = FilterSpec::unbound(|item: &u32| *item % 2 == 0);

        assert!(spec.params().is_empty());
        assert!(spec.matches(&4));
        assert!(!spec.matches(&5));
    }

    #[test]
    fn param_table_round_trips_through_json() {
        let params = ParamTable::new()
            .with("id", "left-pad")
            .with("max_results", 20_u64)
            .with("prerelease", false);

        let encoded = serde_json::to_string(&params).unwrap();
        let decoded: ParamTable = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, params);
    }
}
