//! Request body validation.
//!
//! A rule set names the fields an operation accepts and the rules each one
//! must pass. [`validate`] returns only those fields, normalized (numeric
//! strings become numbers, untyped scalars become text), or the per-field
//! error messages.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    String,
    Numeric,
    Email,
    /// Minimum string length in characters.
    Min(usize),
    /// Maximum string length in characters.
    Max(usize),
}

/// The rules one field must pass.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

pub const fn field(field: &'static str, rules: &'static [Rule]) -> FieldRules {
    FieldRules { field, rules }
}

pub const CUSTOMER_RULES: &[FieldRules] = &[
    field("name", &[Rule::Required, Rule::String]),
    field("address", &[Rule::Required]),
    field("phone", &[Rule::Required]),
];

pub const ORDER_RULES: &[FieldRules] = &[
    field("name", &[Rule::Required, Rule::String]),
    field("quantity", &[Rule::Required, Rule::Numeric]),
    field("price", &[Rule::Required, Rule::Numeric]),
];

pub const REGISTER_RULES: &[FieldRules] = &[
    field("name", &[Rule::Required, Rule::String]),
    field("email", &[Rule::Required, Rule::Email]),
    field(
        "password",
        &[Rule::Required, Rule::String, Rule::Min(6), Rule::Max(50)],
    ),
];

pub const LOGIN_RULES: &[FieldRules] = &[
    field("email", &[Rule::Required, Rule::Email]),
    field(
        "password",
        &[Rule::Required, Rule::String, Rule::Min(6), Rule::Max(50)],
    ),
];

/// Per-field error messages, serialized as `{ "field": ["message", ..] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    fn count(&self, field: &str) -> usize {
        self.0.get(field).map_or(0, Vec::len)
    }
}

/// Fields that passed validation, keyed by name.
pub type Validated = Map<String, Value>;

/// Validate `input` against `rules`.
///
/// Anything other than a JSON object is treated as an empty object, so a
/// missing body reports every required field.
pub fn validate(input: &Value, rules: &[FieldRules]) -> Result<Validated, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut validated = Validated::new();

    for entry in rules {
        let value = input.get(entry.field).unwrap_or(&Value::Null);

        if is_blank(value) {
            if entry.rules.contains(&Rule::Required) {
                errors.add(entry.field, format!("The {} field is required.", entry.field));
            }
            continue;
        }

        let before = errors.count(entry.field);
        if let Some(normalized) = check_field(entry, value, &mut errors) {
            if errors.count(entry.field) == before {
                validated.insert(entry.field.to_string(), normalized);
            }
        }
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(errors)
    }
}

fn check_field(entry: &FieldRules, value: &Value, errors: &mut ValidationErrors) -> Option<Value> {
    let name = entry.field;
    let mut normalized = value.clone();
    let mut typed = false;

    for rule in entry.rules {
        match *rule {
            Rule::Required => {}
            Rule::String => {
                typed = true;
                if !value.is_string() {
                    errors.add(name, format!("The {name} must be a string."));
                }
            }
            Rule::Numeric => {
                typed = true;
                match as_number(value) {
                    Some(number) => normalized = Value::Number(number),
                    None => errors.add(name, format!("The {name} must be a number.")),
                }
            }
            Rule::Email => {
                if !value.as_str().is_some_and(is_email) {
                    errors.add(name, format!("The {name} must be a valid email address."));
                }
            }
            Rule::Min(min) => {
                if value.as_str().is_some_and(|s| s.chars().count() < min) {
                    errors.add(name, format!("The {name} must be at least {min} characters."));
                }
            }
            Rule::Max(max) => {
                if value.as_str().is_some_and(|s| s.chars().count() > max) {
                    errors.add(
                        name,
                        format!("The {name} must not be greater than {max} characters."),
                    );
                }
            }
        }
    }

    if !typed {
        normalized = match value {
            Value::String(_) => normalized,
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            _ => {
                errors.add(name, format!("The {name} must be a string."));
                return None;
            }
        };
    }

    Some(normalized)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(int) = s.parse::<i64>() {
                return Some(Number::from(int));
            }
            s.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .and_then(Number::from_f64)
        }
        _ => None,
    }
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(char::is_whitespace)
}
