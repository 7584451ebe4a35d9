use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::table::{Record, observed_columns};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("expected a JSON object at {0}")]
    NotAnObject(String),

    #[error("expected a JSON array at {0}")]
    NotAnArray(String),
}

pub fn transcripts(payload: &Value) -> Result<Vec<Record>, ShapeError> {
    let root = as_object(payload, "$")?;
    records_at(root, "Transcript", "$.Transcript", |item| {
        Record::from_object(item.clone())
    })
}

pub fn gene_annotation(payload: &Value) -> Result<Vec<Record>, ShapeError> {
    let root = as_object(payload, "$")?;
    Ok(vec![Record::flatten(root)])
}

// Every column is present, null when upstream omits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariantSummary {
    pub id: Option<Value>,
    pub most_severe_consequence: Option<Value>,
    pub minor_allele: Option<Value>,
    pub minor_allele_freq: Option<Value>,
}

impl VariantSummary {
    pub fn from_payload(root: &Map<String, Value>) -> Self {
        let field = |name: &str| root.get(name).filter(|value| !value.is_null()).cloned();
        let id = root
            .get("name")
            .filter(|value| is_truthy(value))
            .cloned()
            .or_else(|| field("id"));
        Self {
            id,
            most_severe_consequence: field("most_severe_consequence"),
            minor_allele: field("minor_allele"),
            minor_allele_freq: field("minor_allele_freq"),
        }
    }

    pub fn into_record(self) -> Record {
        [
            ("id", self.id),
            ("most_severe_consequence", self.most_severe_consequence),
            ("minor_allele", self.minor_allele),
            ("minor_allele_freq", self.minor_allele_freq),
        ]
        .into_iter()
        .map(|(column, value)| (column, value.unwrap_or(Value::Null)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantTables {
    pub summary: Vec<Record>,
    pub mappings: Vec<Record>,
}

pub fn variant(payload: &Value) -> Result<VariantTables, ShapeError> {
    let root = as_object(payload, "$")?;
    let summary = VariantSummary::from_payload(root).into_record();
    let mappings = records_at(root, "mappings", "$.mappings", Record::flatten)?;
    Ok(VariantTables {
        summary: vec![summary],
        mappings,
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrthologTable {
    pub rows: Vec<Record>,
    // Columns seen before the species filter; filtering drops rows, not columns.
    pub column_count: usize,
}

pub fn orthologs(payload: &Value, target_species: Option<&str>) -> Result<OrthologTable, ShapeError> {
    let root = as_object(payload, "$")?;
    let first = match root.get("data") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => items.first(),
        Some(_) => return Err(ShapeError::NotAnArray("$.data".to_string())),
    };
    let Some(first) = first else {
        return Ok(OrthologTable::default());
    };
    let first = as_object(first, "$.data[0]")?;
    let rows = records_at(first, "homologies", "$.data[0].homologies", Record::flatten)?;
    let column_count = observed_columns(&rows).len();

    let rows = match target_species {
        Some(species) => rows
            .into_iter()
            .filter(|row| row.get("target.species").and_then(Value::as_str) == Some(species))
            .collect(),
        None => rows,
    };
    Ok(OrthologTable { rows, column_count })
}

fn as_object<'a>(value: &'a Value, at: &str) -> Result<&'a Map<String, Value>, ShapeError> {
    value
        .as_object()
        .ok_or_else(|| ShapeError::NotAnObject(at.to_string()))
}

fn records_at<F>(
    root: &Map<String, Value>,
    field: &str,
    at: &str,
    to_record: F,
) -> Result<Vec<Record>, ShapeError>
where
    F: Fn(&Map<String, Value>) -> Record,
{
    let items = match root.get(field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ShapeError::NotAnArray(at.to_string())),
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object()
                .map(&to_record)
                .ok_or_else(|| ShapeError::NotAnObject(format!("{at}[{index}]")))
        })
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64() != Some(0.0),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
