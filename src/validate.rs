use serde::Serialize;
use serde_json::{Number, Value};

use crate::schema::{ColumnSpec, ColumnType, Schema};
use crate::table::{Record, observed_columns};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub schema: String,
    pub column: Option<String>,
    pub check: String,
    // None for table-level issues.
    pub index: Option<usize>,
    pub failure_case: Value,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(rename = "num_rows")]
    pub row_count: usize,
    #[serde(rename = "num_columns")]
    pub column_count: usize,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn empty() -> Self {
        Self {
            valid: true,
            row_count: 0,
            column_count: 0,
            errors: Vec::new(),
        }
    }

    pub fn from_issues(row_count: usize, column_count: usize, errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            row_count,
            column_count,
            errors,
        }
    }
}

pub fn validate(records: &[Record], schema: &Schema) -> ValidationResult {
    if records.is_empty() {
        return ValidationResult::empty();
    }

    let observed = observed_columns(records);
    let mut errors = Vec::new();

    for column in schema.columns {
        // Declared columns that never show up are tolerated: upstream omits
        // optional fields entirely rather than sending nulls.
        if !observed.contains(column.name) {
            continue;
        }
        for (index, record) in records.iter().enumerate() {
            let value = record.get(column.name).unwrap_or(&Value::Null);
            if let Some(issue) = check_cell(schema, column, index, value) {
                errors.push(issue);
            }
        }
    }

    ValidationResult::from_issues(records.len(), observed.len(), errors)
}

fn check_cell(
    schema: &Schema,
    column: &ColumnSpec,
    index: usize,
    value: &Value,
) -> Option<ValidationIssue> {
    let issue = |check: String, message: String| ValidationIssue {
        schema: schema.name.to_string(),
        column: Some(column.name.to_string()),
        check,
        index: Some(index),
        failure_case: value.clone(),
        message,
    };

    if value.is_null() {
        if column.nullable {
            return None;
        }
        return Some(issue(
            "not_nullable".to_string(),
            format!("non-nullable column '{}' contains null values", column.name),
        ));
    }

    let cell = match coerce(column, value) {
        Ok(cell) => cell,
        Err(Mismatch::Uncoercible) => {
            return Some(issue(
                format!("coerce_dtype('{}')", column.dtype),
                format!(
                    "could not coerce value in column '{}' to {}",
                    column.name, column.dtype
                ),
            ));
        }
        Err(Mismatch::WrongType) => {
            return Some(issue(
                format!("dtype('{}')", column.dtype),
                format!(
                    "expected {} in column '{}', found {}",
                    column.dtype,
                    column.name,
                    json_type(value)
                ),
            ));
        }
    };

    let check = column.check?;
    let numeric = cell.as_f64()?;
    if check.accepts(numeric) {
        return None;
    }
    Some(issue(
        check.to_string(),
        format!("value {cell} in column '{}' fails {check}", column.name),
    ))
}

enum Mismatch {
    Uncoercible,
    WrongType,
}

fn coerce(column: &ColumnSpec, value: &Value) -> Result<Value, Mismatch> {
    if matches_dtype(column.dtype, value) {
        return Ok(value.clone());
    }
    if !column.coerce {
        return Err(Mismatch::WrongType);
    }
    let coerced = match (column.dtype, value) {
        (ColumnType::Integer, Value::Number(number)) => number
            .as_f64()
            .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
            .map(|float| Value::from(float as i64)),
        (ColumnType::Integer, Value::String(text)) => {
            text.trim().parse::<i64>().ok().map(Value::from)
        }
        (ColumnType::Float, Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        (ColumnType::String, Value::Number(number)) => Some(Value::String(number.to_string())),
        (ColumnType::String, Value::Bool(flag)) => Some(Value::String(flag.to_string())),
        _ => None,
    };
    coerced.ok_or(Mismatch::Uncoercible)
}

fn matches_dtype(dtype: ColumnType, value: &Value) -> bool {
    match (dtype, value) {
        (ColumnType::String, Value::String(_)) => true,
        (ColumnType::Integer, Value::Number(number)) => number.is_i64() || number.is_u64(),
        (ColumnType::Float, Value::Number(_)) => true,
        _ => false,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
