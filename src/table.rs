use std::collections::BTreeSet;
use std::collections::btree_map::{self, BTreeMap};

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    // Nested values are kept as-is.
    pub fn from_object(object: Map<String, Value>) -> Self {
        Self(object.into_iter().collect())
    }

    // Empty objects are dropped, arrays are kept as values.
    pub fn flatten(object: &Map<String, Value>) -> Self {
        let mut record = Self::new();
        flatten_into(&mut record.0, None, object);
        record
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn columns(&self) -> btree_map::Keys<'_, String, Value> {
        self.0.keys()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn flatten_into(out: &mut BTreeMap<String, Value>, prefix: Option<&str>, object: &Map<String, Value>) {
    for (key, value) in object {
        let column = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(out, Some(&column), nested),
            other => {
                out.insert(column, other.clone());
            }
        }
    }
}

pub fn observed_columns(records: &[Record]) -> BTreeSet<&str> {
    records
        .iter()
        .flat_map(|record| record.columns().map(String::as_str))
        .collect()
}
