//! Structural argument matchers
//!
//! An [`ArgsMatcher`] checks the argument object of one tool call. Each field
//! carries a [`FieldMatcher`] built from composable checks (literal equality,
//! type, length, containment, numeric range, regex, custom refinement). A
//! mismatch yields [`MatchFailures`] naming every offending field.
//!
//! ```rust
//! use toolbench_core::eval::{ArgsMatcher, FieldMatcher};
//! use serde_json::json;
//!
//! let matcher = ArgsMatcher::object()
//!     .field("name", FieldMatcher::literal("notes.txt"))
//!     .field("content", FieldMatcher::string().contains("Hello world"));
//!
//! assert!(matcher.check(&json!({"name": "notes.txt", "content": "Hello world!"})).is_ok());
//! let err = matcher.check(&json!({"name": "note.txt", "content": "Hello world"})).unwrap_err();
//! assert_eq!(err.to_string(), r#"name: expected literal "notes.txt", received "note.txt""#);
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Predicate used by [`FieldMatcher::refine`]
pub type Refinement = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// One field-level mismatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{path}: {message}")]
pub struct MatchFailure {
    /// Field name, or `$` for the argument object itself
    pub path: String,

    /// What was wrong
    pub message: String,
}

impl MatchFailure {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// All mismatches found for one argument object, in field declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFailures(pub Vec<MatchFailure>);

impl MatchFailures {
    pub fn iter(&self) -> impl Iterator<Item = &MatchFailure> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MatchFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for MatchFailures {}

#[derive(Clone)]
enum Check {
    Literal(Value),
    String,
    Number,
    MinLen(usize),
    MaxLen(usize),
    Contains(String),
    Range { min: f64, max: f64 },
    Pattern(Regex),
    Refine { description: String, predicate: Refinement },
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Literal(v) => write!(f, "Literal({})", v),
            Check::String => f.write_str("String"),
            Check::Number => f.write_str("Number"),
            Check::MinLen(n) => write!(f, "MinLen({})", n),
            Check::MaxLen(n) => write!(f, "MaxLen({})", n),
            Check::Contains(s) => write!(f, "Contains({:?})", s),
            Check::Range { min, max } => write!(f, "Range({}..={})", min, max),
            Check::Pattern(re) => write!(f, "Pattern(/{}/)", re.as_str()),
            Check::Refine { description, .. } => write!(f, "Refine({:?})", description),
        }
    }
}

fn expected_type(expected: &str, value: &Value) -> String {
    format!("expected {}, received {}", expected, json_type_name(value))
}

impl Check {
    /// First problem with `value`, if any
    fn apply(&self, value: &Value) -> Option<String> {
        match self {
            Check::Literal(expected) => (value != expected)
                .then(|| format!("expected literal {}, received {}", expected, value)),
            Check::String => (!value.is_string()).then(|| expected_type("string", value)),
            Check::Number => (!value.is_number()).then(|| expected_type("number", value)),
            Check::MinLen(min) => match value.as_str() {
                Some(s) if s.chars().count() < *min => {
                    Some(format!("must contain at least {} character(s)", min))
                }
                Some(_) => None,
                None => Some(expected_type("string", value)),
            },
            Check::MaxLen(max) => match value.as_str() {
                Some(s) if s.chars().count() > *max => {
                    Some(format!("must contain at most {} character(s)", max))
                }
                Some(_) => None,
                None => Some(expected_type("string", value)),
            },
            Check::Contains(needle) => match value.as_str() {
                Some(s) if !s.contains(needle.as_str()) => {
                    Some(format!("must contain {:?}, received {}", needle, value))
                }
                Some(_) => None,
                None => Some(expected_type("string", value)),
            },
            Check::Range { min, max } => match value.as_f64() {
                Some(n) if n < *min || n > *max => {
                    Some(format!("must be between {} and {}, received {}", min, max, n))
                }
                Some(_) => None,
                None => Some(expected_type("number", value)),
            },
            Check::Pattern(re) => match value.as_str() {
                Some(s) if !re.is_match(s) => {
                    Some(format!("must match /{}/, received {}", re.as_str(), value))
                }
                Some(_) => None,
                None => Some(expected_type("string", value)),
            },
            Check::Refine {
                description,
                predicate,
            } => (!predicate(value)).then(|| format!("{}, received {}", description, value)),
        }
    }

    fn describe(&self) -> String {
        match self {
            Check::Literal(v) => v.to_string(),
            Check::String => "string".to_string(),
            Check::Number => "number".to_string(),
            Check::MinLen(n) => format!("min {}", n),
            Check::MaxLen(n) => format!("max {}", n),
            Check::Contains(s) => format!("contains {:?}", s),
            Check::Range { min, max } => format!("{}..={}", min, max),
            Check::Pattern(re) => format!("/{}/", re.as_str()),
            Check::Refine { description, .. } => description.clone(),
        }
    }
}

/// Checks applied to a single argument value.
///
/// Checks run in the order they were added and stop at the first failure.
#[derive(Debug, Clone, Default)]
pub struct FieldMatcher {
    checks: Vec<Check>,
    optional: bool,
}

impl FieldMatcher {
    /// Value must equal `value` exactly
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::default().push(Check::Literal(value.into()))
    }

    /// Value must be a string
    pub fn string() -> Self {
        Self::default().push(Check::String)
    }

    /// Value must be a number
    pub fn number() -> Self {
        Self::default().push(Check::Number)
    }

    /// Any value is accepted as long as the field is present
    pub fn any() -> Self {
        Self::default()
    }

    pub fn min_len(self, min: usize) -> Self {
        self.push(Check::MinLen(min))
    }

    pub fn max_len(self, max: usize) -> Self {
        self.push(Check::MaxLen(max))
    }

    /// String must contain `needle` (case-sensitive)
    pub fn contains(self, needle: impl Into<String>) -> Self {
        self.push(Check::Contains(needle.into()))
    }

    /// String must contain every needle
    pub fn contains_all(self, needles: &[&str]) -> Self {
        needles.iter().fold(self, |m, n| m.contains(*n))
    }

    /// Number must lie in `min..=max`
    pub fn range(self, min: f64, max: f64) -> Self {
        self.push(Check::Range { min, max })
    }

    /// String must match `pattern`
    pub fn pattern(self, pattern: Regex) -> Self {
        self.push(Check::Pattern(pattern))
    }

    /// Arbitrary predicate. `description` states the requirement and is used
    /// verbatim in the failure message.
    pub fn refine<F>(self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.push(Check::Refine {
            description: description.into(),
            predicate: Arc::new(predicate),
        })
    }

    /// Absence of the field is not a failure
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn push(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    fn check(&self, value: Option<&Value>) -> Option<String> {
        match value {
            None if self.optional => None,
            None => Some("required".to_string()),
            Some(v) => self.checks.iter().find_map(|c| c.apply(v)),
        }
    }

    /// Short human-readable form, e.g. `string, contains "AI"`
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = self.checks.iter().map(Check::describe).collect();
        if parts.is_empty() {
            parts.push("any".to_string());
        }
        if self.optional {
            parts.push("optional".to_string());
        }
        parts.join(", ")
    }
}

/// Matcher for a tool call's argument object
#[derive(Debug, Clone, Default)]
pub struct ArgsMatcher {
    fields: Vec<(String, FieldMatcher)>,
    strict: bool,
}

impl ArgsMatcher {
    /// Matcher for an object. Unknown keys are ignored unless [`strict`](Self::strict) is set.
    pub fn object() -> Self {
        Self::default()
    }

    /// Add a field; a later declaration of the same name replaces the earlier one
    pub fn field(mut self, name: impl Into<String>, matcher: FieldMatcher) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = matcher,
            None => self.fields.push((name, matcher)),
        }
        self
    }

    /// Reject keys that are not declared
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Declared field names, in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Check an argument object.
    ///
    /// # Errors
    ///
    /// Returns every failing field. A non-object argument fails as a whole at path `$`.
    pub fn check(&self, args: &Value) -> Result<(), MatchFailures> {
        let Some(obj) = args.as_object() else {
            return Err(MatchFailures(vec![MatchFailure::new(
                "$",
                expected_type("object", args),
            )]));
        };

        let mut failures: Vec<MatchFailure> = self
            .fields
            .iter()
            .filter_map(|(name, m)| m.check(obj.get(name)).map(|msg| MatchFailure::new(name, msg)))
            .collect();

        if self.strict {
            failures.extend(
                obj.keys()
                    .filter(|k| !self.fields.iter().any(|(n, _)| n == *k))
                    .map(|k| MatchFailure::new(k, "unexpected property")),
            );
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(MatchFailures(failures))
        }
    }

    /// Check an argument object, returning only whether it matches
    pub fn matches(&self, args: &Value) -> bool {
        self.check(args).is_ok()
    }

    /// Short human-readable form, e.g. `{name: "notes.txt", path: "/tmp"}`
    pub fn describe(&self) -> String {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(n, m)| format!("{}: {}", n, m.describe()))
            .collect();
        format!("{{{}}}", fields.join("; "))
    }
}

/// JSON type name as reported in diagnostics
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
