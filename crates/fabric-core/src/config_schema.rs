//! Declarative configuration field schema and validator.
//!
//! Every integration, component, trigger, and widget declares its configuration
//! as a list of [`Field`] definitions. [`validate`] checks a [`Configuration`]
//! against those definitions: effective requiredness (including conditional
//! requirements), per-type constraints, and cross-field comparison rules.

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

use crate::ErrorCategory;

/// Dynamic value used both for declared defaults and for values under validation.
///
/// Mirrors `serde_json::Value` directly rather than introducing a parallel enum:
/// configuration arrives over the wire as JSON and the validator never needs to
/// construct values of its own, only inspect and recurse into them.
pub type Value = JsonValue;

/// A caller-supplied configuration: field name to value.
pub type Configuration = BTreeMap<String, Value>;

/// One field definition in an integration/component/trigger/widget schema.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub type_options: TypeOptions,
    pub required_conditions: Vec<RequiredCondition>,
    pub validation_rules: Vec<ValidationRule>,
    pub default: Option<Value>,
    pub sensitive: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            type_options: TypeOptions::default(),
            required_conditions: Vec::new(),
            validation_rules: Vec::new(),
            default: None,
            sensitive: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_type_options(mut self, options: TypeOptions) -> Self {
        self.type_options = options;
        self
    }

    pub fn with_required_condition(mut self, condition: RequiredCondition) -> Self {
        self.required_conditions.push(condition);
        self
    }

    pub fn with_validation_rule(mut self, rule: ValidationRule) -> Self {
        self.validation_rules.push(rule);
        self
    }

    /// Whether this field is required given the rest of the configuration,
    /// accounting for `required_conditions` (a disjunction of field/value matches).
    fn is_effectively_required(&self, config: &Configuration) -> bool {
        if self.required {
            return true;
        }
        self.required_conditions.iter().any(|condition| {
            config
                .get(&condition.field)
                .map(|v| condition.matches(v))
                .unwrap_or(false)
        })
    }
}

/// `{field, values}`: this field becomes required when `config[field]`
/// stringifies to one of `values`. Absence of the referenced field never
/// forces the requirement.
#[derive(Debug, Clone)]
pub struct RequiredCondition {
    pub field: String,
    pub values: Vec<String>,
}

impl RequiredCondition {
    pub fn new(field: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            values,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        let stringified = stringify(value);
        self.values.iter().any(|v| v == &stringified)
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Cross-field comparison rule, e.g. `startTime lessThan endTime`.
#[derive(Debug, Clone)]
pub struct ValidationRule {
    pub kind: ValidationRuleKind,
    pub compare_with: String,
    pub message: Option<String>,
}

impl ValidationRule {
    pub fn new(kind: ValidationRuleKind, compare_with: impl Into<String>) -> Self {
        Self {
            kind,
            compare_with: compare_with.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRuleKind {
    LessThan,
    GreaterThan,
    Equal,
    NotEqual,
}

/// Per-type constraints. Only the fields relevant to a given [`FieldType`] are consulted.
#[derive(Debug, Clone, Default)]
pub struct TypeOptions {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub options: Vec<String>,
    pub max_items: Option<usize>,
    pub format: Option<String>,
    pub restricted_predicate_types: Option<Vec<String>>,
    pub object_schema: Vec<Field>,
    pub item_schema: Option<Box<Field>>,
}

/// Closed set of field types a Configuration value may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Text,
    Expression,
    Number,
    Boolean,
    Select,
    MultiSelect,
    List,
    Object,
    Time,
    Date,
    DateTime,
    DayInYear,
    TimeRange,
    Timezone,
    DaysOfWeek,
    Cron,
    AnyPredicateList,
    IntegrationResource,
    User,
    Role,
    Group,
    GitRef,
    SecretKey,
}

const CANONICAL_DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Errors surfaced by [`validate`]. The first violation aborts validation.
#[derive(Debug, Clone, Error)]
pub enum ConfigValidationError {
    #[error("field '{field}' is required")]
    Required { field: String },

    #[error("field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("field '{field}': {message}")]
    RuleFailed { field: String, message: String },

    #[error("field '{field}' references unknown comparison field '{compare_with}'")]
    UnknownComparisonField { field: String, compare_with: String },
}

impl ConfigValidationError {
    pub fn is_transient(&self) -> bool {
        false
    }

    pub fn error_category(&self) -> ErrorCategory {
        ErrorCategory::Permanent
    }
}

/// Validate `config` against `fields`. Returns the first violation encountered,
/// in field declaration order, required-check before type-check before
/// cross-field rules (matching the order rules are listed on each field).
pub fn validate(fields: &[Field], config: &Configuration) -> Result<(), ConfigValidationError> {
    for field in fields {
        let value = config.get(&field.name);

        if field.is_effectively_required(config) && is_missing(value) {
            return Err(ConfigValidationError::Required {
                field: field.name.clone(),
            });
        }

        if let Some(value) = value.filter(|v| !matches!(v, Value::Null)) {
            validate_type(field, value)?;
        }
    }

    for field in fields {
        let Some(value) = config.get(&field.name).filter(|v| !matches!(v, Value::Null)) else {
            continue;
        };
        for rule in &field.validation_rules {
            apply_validation_rule(field, value, rule, config)?;
        }
    }

    Ok(())
}

fn is_missing(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn validate_type(field: &Field, value: &Value) -> Result<(), ConfigValidationError> {
    let err = |reason: String| ConfigValidationError::InvalidValue {
        field: field.name.clone(),
        reason,
    };

    match field.field_type {
        FieldType::Number => {
            let n = value
                .as_f64()
                .ok_or_else(|| err("expected a number".to_string()))?;
            if let Some(min) = field.type_options.min {
                if n < min {
                    return Err(err(format!("must be >= {min}")));
                }
            }
            if let Some(max) = field.type_options.max {
                if n > max {
                    return Err(err(format!("must be <= {max}")));
                }
            }
        }
        FieldType::Boolean => {
            value
                .as_bool()
                .ok_or_else(|| err("expected a boolean".to_string()))?;
        }
        FieldType::String | FieldType::Text | FieldType::Expression => {
            let s = value
                .as_str()
                .ok_or_else(|| err("expected a string".to_string()))?;
            if let Some(min) = field.type_options.min_length {
                if s.len() < min {
                    return Err(err(format!("must be at least {min} characters")));
                }
            }
            if let Some(max) = field.type_options.max_length {
                if s.len() > max {
                    return Err(err(format!("must be at most {max} characters")));
                }
            }
        }
        FieldType::Select => {
            let s = value
                .as_str()
                .ok_or_else(|| err("expected a string".to_string()))?;
            if !field.type_options.options.iter().any(|o| o == s) {
                return Err(err(format!("'{s}' is not one of the declared options")));
            }
        }
        FieldType::MultiSelect => {
            let items = value
                .as_array()
                .ok_or_else(|| err("expected a list".to_string()))?;
            for item in items {
                let s = item
                    .as_str()
                    .ok_or_else(|| err("expected all items to be strings".to_string()))?;
                if !field.type_options.options.iter().any(|o| o == s) {
                    return Err(err(format!("'{s}' is not one of the declared options")));
                }
            }
        }
        FieldType::DaysOfWeek => {
            let items = value
                .as_array()
                .ok_or_else(|| err("expected a list".to_string()))?;
            for item in items {
                let s = item
                    .as_str()
                    .ok_or_else(|| err("expected all items to be strings".to_string()))?
                    .to_ascii_lowercase();
                if !CANONICAL_DAYS.contains(&s.as_str()) {
                    return Err(err(format!("'{s}' is not a valid day name")));
                }
            }
        }
        FieldType::Object => {
            validate_object(field, value)?;
        }
        FieldType::List => {
            let items = value
                .as_array()
                .ok_or_else(|| err("expected a list".to_string()))?;
            if let Some(max_items) = field.type_options.max_items {
                if max_items == 0 {
                    return Err(err("maxItems must be greater than zero".to_string()));
                }
                if items.len() > max_items {
                    return Err(err(format!("must have at most {max_items} items")));
                }
            }
            if field.required && items.is_empty() {
                return Err(ConfigValidationError::Required {
                    field: field.name.clone(),
                });
            }
            if let Some(item_field) = &field.type_options.item_schema {
                for item in items {
                    validate_type(item_field, item)?;
                }
            }
        }
        FieldType::Time => {
            let s = value
                .as_str()
                .ok_or_else(|| err("expected a time string".to_string()))?;
            let format = field.type_options.format.as_deref().unwrap_or("%H:%M");
            NaiveTime::parse_from_str(s, format)
                .map_err(|_| err(format!("'{s}' does not match time format '{format}'")))?;
        }
        FieldType::Date => {
            let s = value
                .as_str()
                .ok_or_else(|| err("expected a date string".to_string()))?;
            let format = field.type_options.format.as_deref().unwrap_or("%Y-%m-%d");
            NaiveDate::parse_from_str(s, format)
                .map_err(|_| err(format!("'{s}' does not match date format '{format}'")))?;
        }
        FieldType::DateTime => {
            let s = value
                .as_str()
                .ok_or_else(|| err("expected a datetime string".to_string()))?;
            chrono::DateTime::parse_from_rfc3339(s)
                .map_err(|_| err(format!("'{s}' is not a valid RFC3339 datetime")))?;
        }
        FieldType::DayInYear => {
            parse_day_in_year(value).map_err(|reason| err(reason))?;
        }
        FieldType::TimeRange => {
            let s = value
                .as_str()
                .ok_or_else(|| err("expected a time range string".to_string()))?;
            parse_time_range(s).map_err(|reason| err(reason))?;
        }
        FieldType::Timezone => {
            validate_timezone(value).map_err(|reason| err(reason))?;
        }
        FieldType::Cron => {
            let s = value
                .as_str()
                .ok_or_else(|| err("expected a cron expression string".to_string()))?;
            cron::Schedule::from_str(s)
                .map_err(|e| err(format!("invalid cron expression: {e}")))?;
        }
        FieldType::AnyPredicateList => {
            let items = value
                .as_array()
                .ok_or_else(|| err("expected a list".to_string()))?;
            for item in items {
                let predicate_type = item
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| err("predicate missing 'type'".to_string()))?;
                if let Some(allowed) = &field.type_options.restricted_predicate_types {
                    if !allowed.iter().any(|a| a == predicate_type) {
                        return Err(err(format!(
                            "predicate type '{predicate_type}' is not permitted"
                        )));
                    }
                }
            }
        }
        FieldType::IntegrationResource
        | FieldType::User
        | FieldType::Role
        | FieldType::Group
        | FieldType::GitRef
        | FieldType::SecretKey => {
            value
                .as_str()
                .ok_or_else(|| err("expected a string identifier".to_string()))?;
        }
    }

    Ok(())
}

fn validate_object(field: &Field, value: &Value) -> Result<(), ConfigValidationError> {
    let err = |reason: String| ConfigValidationError::InvalidValue {
        field: field.name.clone(),
        reason,
    };

    let decoded: Value = match value {
        Value::Object(_) => value.clone(),
        Value::String(s) => {
            let has_placeholder = s.contains("{{") && s.contains("}}");
            let substituted = substitute_placeholders(s);
            let parsed: Value = serde_json::from_str(&substituted)
                .map_err(|e| err(format!("invalid JSON object: {e}")))?;
            if has_placeholder {
                // Can't judge the types behind an expression placeholder; accept as-is.
                return Ok(());
            }
            parsed
        }
        _ => return Err(err("expected an object or a JSON-encoded object string".to_string())),
    };

    let Value::Object(map) = decoded else {
        return Err(err("expected an object".to_string()));
    };

    for nested in &field.type_options.object_schema {
        let nested_value = map.get(&nested.name);
        if nested.is_effectively_required(&to_configuration(&map)) && is_missing(nested_value) {
            return Err(ConfigValidationError::Required {
                field: format!("{}.{}", field.name, nested.name),
            });
        }
        if let Some(v) = nested_value.filter(|v| !matches!(v, Value::Null)) {
            validate_type(nested, v)?;
        }
    }

    Ok(())
}

fn to_configuration(map: &serde_json::Map<String, Value>) -> Configuration {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn substitute_placeholders(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '{' && s[i..].starts_with("{{") {
            if let Some(end) = s[i..].find("}}") {
                out.push_str("{}");
                // Skip past the matched placeholder.
                let skip_to = i + end + 2;
                while let Some(&(j, _)) = chars.peek() {
                    if j < skip_to {
                        chars.next();
                    } else {
                        break;
                    }
                }
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn parse_day_in_year(value: &Value) -> Result<(u32, u32), String> {
    let s = value
        .as_str()
        .ok_or_else(|| "expected a day-in-year string, e.g. '12/25'".to_string())?;
    let (month, day) = s
        .split_once('/')
        .ok_or_else(|| format!("'{s}' is not in MM/DD format"))?;
    let month: u32 = month
        .parse()
        .map_err(|_| format!("'{month}' is not a valid month"))?;
    let day: u32 = day
        .parse()
        .map_err(|_| format!("'{day}' is not a valid day"))?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(format!("'{s}' is out of range"));
    }
    Ok((month, day))
}

fn day_in_year_ordinal(month: u32, day: u32) -> u32 {
    (month - 1) * 31 + day
}

fn parse_time_range(s: &str) -> Result<(NaiveTime, NaiveTime), String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("'{s}' is not in HH:MM-HH:MM format"))?;
    let start = NaiveTime::parse_from_str(start, "%H:%M")
        .map_err(|_| format!("'{start}' is not a valid HH:MM time"))?;
    let end = NaiveTime::parse_from_str(end, "%H:%M")
        .map_err(|_| format!("'{end}' is not a valid HH:MM time"))?;
    if start >= end {
        return Err("range start must be before end".to_string());
    }
    Ok((start, end))
}

fn validate_timezone(value: &Value) -> Result<(), String> {
    if let Value::String(s) = value {
        if s == "current" {
            return Err("'current' is a UI placeholder, not a valid timezone offset".to_string());
        }
        let offset: f64 = s
            .parse()
            .map_err(|_| format!("'{s}' is not a numeric UTC offset"))?;
        return validate_timezone_offset(offset);
    }
    let offset = value
        .as_f64()
        .ok_or_else(|| "expected a numeric UTC offset".to_string())?;
    validate_timezone_offset(offset)
}

fn validate_timezone_offset(offset: f64) -> Result<(), String> {
    if !(-12.0..=14.0).contains(&offset) {
        return Err(format!("offset {offset} is out of range [-12, +14]"));
    }
    let fractional = (offset.fract()).abs();
    if fractional != 0.0 && (fractional - 0.5).abs() > f64::EPSILON {
        return Err(format!("offset {offset} must be a whole or half-hour value"));
    }
    Ok(())
}

fn apply_validation_rule(
    field: &Field,
    value: &Value,
    rule: &ValidationRule,
    config: &Configuration,
) -> Result<(), ConfigValidationError> {
    let Some(compare_value) = config
        .get(&rule.compare_with)
        .filter(|v| !matches!(v, Value::Null))
    else {
        // Referenced field absent or null: skip, per the comparison-rule contract.
        return Ok(());
    };

    let ordering = compare_ordering(field, value, compare_value, rule.kind)?;

    let passes = match rule.kind {
        ValidationRuleKind::LessThan => ordering == std::cmp::Ordering::Less,
        ValidationRuleKind::GreaterThan => ordering == std::cmp::Ordering::Greater,
        ValidationRuleKind::Equal => ordering == std::cmp::Ordering::Equal,
        ValidationRuleKind::NotEqual => ordering != std::cmp::Ordering::Equal,
    };

    if passes {
        Ok(())
    } else {
        let message = rule.message.clone().unwrap_or_else(|| {
            format!(
                "field '{}' failed comparison against '{}'",
                field.name, rule.compare_with
            )
        });
        Err(ConfigValidationError::RuleFailed {
            field: field.name.clone(),
            message,
        })
    }
}

fn compare_ordering(
    field: &Field,
    value: &Value,
    compare_value: &Value,
    rule_kind: ValidationRuleKind,
) -> Result<std::cmp::Ordering, ConfigValidationError> {
    let invalid = |reason: &str| ConfigValidationError::InvalidValue {
        field: field.name.clone(),
        reason: reason.to_string(),
    };

    match field.field_type {
        FieldType::Time => {
            let format = field.type_options.format.as_deref().unwrap_or("%H:%M");
            let a = NaiveTime::parse_from_str(
                value.as_str().ok_or_else(|| invalid("expected a time"))?,
                format,
            )
            .map_err(|_| invalid("invalid time"))?;
            let b = NaiveTime::parse_from_str(
                compare_value
                    .as_str()
                    .ok_or_else(|| invalid("expected a time"))?,
                format,
            )
            .map_err(|_| invalid("invalid comparison time"))?;
            Ok(a.cmp(&b))
        }
        FieldType::Date => {
            let format = field.type_options.format.as_deref().unwrap_or("%Y-%m-%d");
            let a = NaiveDate::parse_from_str(
                value.as_str().ok_or_else(|| invalid("expected a date"))?,
                format,
            )
            .map_err(|_| invalid("invalid date"))?;
            let b = NaiveDate::parse_from_str(
                compare_value
                    .as_str()
                    .ok_or_else(|| invalid("expected a date"))?,
                format,
            )
            .map_err(|_| invalid("invalid comparison date"))?;
            Ok(a.cmp(&b))
        }
        FieldType::DateTime => {
            let a = chrono::DateTime::parse_from_rfc3339(
                value
                    .as_str()
                    .ok_or_else(|| invalid("expected a datetime"))?,
            )
            .map_err(|_| invalid("invalid datetime"))?;
            let b = chrono::DateTime::parse_from_rfc3339(
                compare_value
                    .as_str()
                    .ok_or_else(|| invalid("expected a datetime"))?,
            )
            .map_err(|_| invalid("invalid comparison datetime"))?;
            Ok(a.cmp(&b))
        }
        FieldType::DayInYear => {
            let (a_month, a_day) =
                parse_day_in_year(value).map_err(|reason| invalid(&reason))?;
            let (b_month, b_day) =
                parse_day_in_year(compare_value).map_err(|reason| invalid(&reason))?;

            // Cross-year escape: for `lessThan` the caller expects a range that
            // wraps the new year (e.g. Dec 25 .. Jan 5) to be accepted outright.
            // Only `lessThan` gets this treatment; other rule kinds compare ordinals as-is.
            if rule_kind == ValidationRuleKind::LessThan && a_month > b_month {
                return Ok(std::cmp::Ordering::Less);
            }

            let a_ord = day_in_year_ordinal(a_month, a_day);
            let b_ord = day_in_year_ordinal(b_month, b_day);
            Ok(a_ord.cmp(&b_ord))
        }
        FieldType::Number => {
            let a = value.as_f64().ok_or_else(|| invalid("expected a number"))?;
            let b = compare_value
                .as_f64()
                .ok_or_else(|| invalid("expected a number"))?;
            Ok(a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal))
        }
        _ => {
            let a = stringify(value);
            let b = stringify(compare_value);
            Ok(a.cmp(&b))
        }
    }
}

#[cfg(test)]
#[path = "config_schema_tests.rs"]
mod tests;
