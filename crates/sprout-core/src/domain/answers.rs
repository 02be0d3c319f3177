//! Answer maps and the pure steps of answer reconciliation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::entities::question::Question;
use crate::domain::identifier::{identifiers_match, normalize_identifier};

/// Insertion-ordered variable name → value mapping.
///
/// Iteration order is the order keys were first inserted. Fuzzy lookups
/// depend on it: the first matching key wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(Map<String, Value>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A value that is present and not `null`.
    pub fn value_of(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.value_of(key).is_some()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy every entry of `other` over `self`; keys already present keep
    /// their position but take the new value.
    pub fn merge(&mut self, other: &AnswerMap) {
        for (k, v) in other.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Rendered text for `key`, or the empty string when absent.
    pub fn rendered(&self, key: &str) -> String {
        self.get(key).map(render_value).unwrap_or_default()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for AnswerMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AnswerMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Text substituted for a placeholder.
///
/// Strings as-is, `null` as nothing, everything else as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Value for `target` among `supplied`: exact key first, then the first key
/// (in supplied order) that fuzzily matches. `null` values are skipped.
pub fn find_matching_value<'a>(target: &str, supplied: &'a AnswerMap) -> Option<&'a Value> {
    if let Some(v) = supplied.value_of(target) {
        return Some(v);
    }

    let normalized_target = normalize_identifier(target);
    supplied
        .iter()
        .filter(|(_, v)| !v.is_null())
        .find(|(k, _)| identifiers_match(&normalized_target, &normalize_identifier(k)))
        .map(|(_, v)| v)
}

/// Supplied answers plus, for each question not already answered by its
/// exact name, the first fuzzy match from `supplied`.
pub fn prepopulate(supplied: &AnswerMap, questions: &[Question]) -> AnswerMap {
    let mut prepared = supplied.clone();
    for question in questions {
        if prepared.has_value(&question.name) {
            continue;
        }
        if let Some(v) = find_matching_value(&question.name, supplied) {
            prepared.insert(question.name.clone(), v.clone());
        }
    }
    prepared
}

/// Give every variable without a value the value of the first fuzzily
/// matching key in `answers`.
///
/// Keys added by earlier variables take part in later matches, so a value
/// can propagate along a chain of aliases.
pub fn expand_for_variables<'a>(
    answers: &AnswerMap,
    variables: impl IntoIterator<Item = &'a str>,
) -> AnswerMap {
    let mut expanded = answers.clone();
    let mut entries: Vec<(String, Value)> = answers
        .iter()
        .map(|(k, v)| (normalize_identifier(k), v.clone()))
        .collect();

    for variable in variables {
        if expanded.contains_key(variable) {
            continue;
        }

        let normalized = normalize_identifier(variable);
        let found = entries
            .iter()
            .find(|(key, _)| identifiers_match(&normalized, key))
            .map(|(_, v)| v.clone());

        if let Some(value) = found {
            expanded.insert(variable, value.clone());
            entries.push((normalized, value));
        }
    }

    expanded
}
