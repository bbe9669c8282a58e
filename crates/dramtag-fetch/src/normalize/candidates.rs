// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordered "first non-empty wins" field extraction.
//
// Each output field owns a `FieldRule`: an ordered list of accessors over the
// raw payload. Accessors return `None` for anything missing or of the wrong
// shape, so a malformed branch simply hands over to the next candidate.

use serde_json::Value;

/// One candidate extraction for a field.
pub type Accessor<'a, S> = Box<dyn Fn(&S) -> Option<String> + Send + Sync + 'a>;

/// Ordered candidate list for a single output field.
pub struct FieldRule<'a, S: ?Sized> {
    candidates: Vec<Accessor<'a, S>>,
}

impl<'a, S: ?Sized> Default for FieldRule<'a, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, S: ?Sized> FieldRule<'a, S> {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Append a lower-priority candidate.
    pub fn or(mut self, accessor: impl Fn(&S) -> Option<String> + Send + Sync + 'a) -> Self {
        self.candidates.push(Box::new(accessor));
        self
    }

    /// First candidate producing a non-blank value, trimmed.
    pub fn resolve(&self, source: &S) -> Option<String> {
        first_non_empty(source, &self.candidates)
    }

    /// Like [`resolve`](Self::resolve) with a terminal placeholder.
    pub fn resolve_or(&self, source: &S, placeholder: &str) -> String {
        self.resolve(source).unwrap_or_else(|| placeholder.to_owned())
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Evaluate `candidates` in order and return the first non-blank result.
///
/// Later candidates are never invoked once one succeeds.
pub fn first_non_empty<S: ?Sized>(source: &S, candidates: &[Accessor<'_, S>]) -> Option<String> {
    candidates
        .iter()
        .find_map(|candidate| candidate(source).and_then(non_blank))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}

// -- JSON accessors -----------------------------------------------------------

/// Walk `path` through nested objects. Any non-object hop yields `None`.
pub fn value_at<'v>(root: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter()
        .try_fold(root, |node, key| node.as_object()?.get(*key))
}

/// String or number at `path`, rendered as text.
pub fn text_at(root: &Value, path: &[&str]) -> Option<String> {
    match value_at(root, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-zero numeric value at `path`.
///
/// Numbers keep their JSON spelling (`43` stays `43`, `46.0` stays `46.0`).
/// Numeric strings are accepted with a trailing `%` removed. Zero counts as
/// absent.
pub fn numeric_at(root: &Value, path: &[&str]) -> Option<String> {
    match value_at(root, path)? {
        Value::Number(n) => {
            let is_zero = n.as_f64().is_some_and(|f| f == 0.0);
            (!is_zero).then(|| n.to_string())
        }
        Value::String(s) => {
            let cleaned = s.trim().trim_end_matches('%').trim();
            let parsed: f64 = cleaned.parse().ok()?;
            (parsed != 0.0 && parsed.is_finite()).then(|| cleaned.to_owned())
        }
        _ => None,
    }
}

/// JSON truthiness for flag fields (`true`, non-zero numbers, non-empty strings).
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}
