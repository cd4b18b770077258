use serde::Deserialize;
use serde_json::Value;

use crate::errors::FilterError;

/// Comparison operators for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Equality (=)
    #[default]
    Eq,
    /// Not equal (!=)
    Ne,
    /// Any of the listed values (?~)
    In,
    /// Substring match (~)
    Contains,
    /// Prefix match (~ "value%")
    StartsWith,
    /// Suffix match (~ "%value")
    EndsWith,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
}

impl FilterOperator {
    /// Comparator token as it appears in a PocketBase filter expression
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::In => "?~",
            Self::Contains | Self::StartsWith | Self::EndsWith => "~",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// A single `field <operator> value` restriction.
///
/// Deserializes from the host framework's where-clause shape; `operator`
/// defaults to `eq` and any extra keys (such as `connector`) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    pub field: String,
    #[serde(default)]
    pub operator: FilterOperator,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Shorthand for an equality condition
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }
}

const MAX_FIELD_NAME_LENGTH: usize = 100;

/// Field names must be plain identifiers, optionally dotted or modified
/// (`author.email`, `tags:length`), so they cannot smuggle filter syntax.
fn is_valid_field_name(field: &str) -> bool {
    !field.is_empty()
        && field.len() <= MAX_FIELD_NAME_LENGTH
        && !field.starts_with(['_', '.', ':'])
        && !field.contains("..")
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '@'))
}

/// Compile a list of conditions into a PocketBase filter string.
///
/// Clauses keep their input order and are joined with ` && `. An empty list
/// compiles to an empty string, meaning "no restriction".
///
/// # Errors
///
/// Returns a [`FilterError`] if any condition has an invalid field name or a
/// string value that cannot be quoted. Nothing is partially compiled.
///
/// An `in` condition whose value is not an array produces no clause at all,
/// so the remaining filter is broader than the caller asked for. This is
/// logged at `warn` level.
pub fn try_compile_where(conditions: &[Condition]) -> Result<String, FilterError> {
    let clauses = conditions
        .iter()
        .filter_map(|condition| render_clause(condition).transpose())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(clauses.join(" && "))
}

/// Lenient form of [`try_compile_where`].
///
/// Conditions that cannot be compiled are dropped with a `warn` log instead
/// of failing the whole filter, which broadens the result set. The adapter
/// operations never use this form.
#[must_use]
pub fn compile_where(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .filter_map(|condition| {
            render_clause(condition).unwrap_or_else(|err| {
                tracing::warn!(field = %condition.field, error = %err, "Condition dropped from filter");
                None
            })
        })
        .collect::<Vec<_>>()
        .join(" && ")
}

/// Same as [`compile_where`], treating an absent list like an empty one.
#[must_use]
pub fn compile_optional_where(conditions: Option<&[Condition]>) -> String {
    conditions.map_or_else(String::new, compile_where)
}

/// `Ok(None)` means the condition is skipped on purpose
fn render_clause(condition: &Condition) -> Result<Option<String>, FilterError> {
    let field = condition.field.as_str();
    let operator = condition.operator;
    let value = &condition.value;

    if !is_valid_field_name(field) {
        return Err(FilterError::InvalidField(field.to_string()));
    }

    let operand = match operator {
        FilterOperator::In => {
            let Some(items) = value.as_array() else {
                tracing::warn!(
                    field = %field,
                    value = %value,
                    "`in` filter requires an array value, condition dropped"
                );
                return Ok(None);
            };
            render_array(field, items)?
        }
        FilterOperator::Contains => quote(field, &plain_text(value))?,
        FilterOperator::StartsWith => quote(field, &format!("{}%", plain_text(value)))?,
        FilterOperator::EndsWith => quote(field, &format!("%{}", plain_text(value)))?,
        FilterOperator::Eq
        | FilterOperator::Ne
        | FilterOperator::Gt
        | FilterOperator::Gte
        | FilterOperator::Lt
        | FilterOperator::Lte => render_literal(field, value)?,
    };

    Ok(Some(format!("{field} {} {operand}", operator.token())))
}

/// Render a value as a filter literal: strings quoted, numbers/booleans/null bare
fn render_literal(field: &str, value: &Value) -> Result<String, FilterError> {
    match value {
        Value::String(text) => quote(field, text),
        Value::Array(items) => render_array(field, items),
        Value::Object(_) => quote(field, &value.to_string()),
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.to_string()),
    }
}

fn render_array(field: &str, items: &[Value]) -> Result<String, FilterError> {
    let rendered = items
        .iter()
        .map(|item| render_literal(field, item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("[{}]", rendered.join(", ")))
}

/// Text of a value for use inside a pattern literal
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Double-quote a string literal with embedded double quotes backslash-escaped.
///
/// The scanner ends a literal at the first `"` not preceded by `\`, so text
/// ending in a backslash would swallow its own closing quote.
fn quote(field: &str, text: &str) -> Result<String, FilterError> {
    if text.ends_with('\\') {
        return Err(FilterError::TrailingBackslash {
            field: field.to_string(),
        });
    }
    Ok(format!("\"{}\"", text.replace('"', "\\\"")))
}
