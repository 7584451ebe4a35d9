use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "str"),
            ColumnType::Integer => write!(f, "int64"),
            ColumnType::Float => write!(f, "float64"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueCheck {
    // Inclusive on both ends.
    InRange { min: f64, max: f64 },
}

impl ValueCheck {
    pub fn accepts(&self, value: f64) -> bool {
        match self {
            ValueCheck::InRange { min, max } => value >= *min && value <= *max,
        }
    }
}

impl fmt::Display for ValueCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueCheck::InRange { min, max } => write!(f, "in_range({min:?}, {max:?})"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub dtype: ColumnType,
    pub nullable: bool,
    pub check: Option<ValueCheck>,
    pub coerce: bool,
}

impl ColumnSpec {
    const fn new(name: &'static str, dtype: ColumnType) -> Self {
        Self {
            name,
            dtype,
            nullable: false,
            check: None,
            coerce: false,
        }
    }

    const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    const fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    const fn check(mut self, check: ValueCheck) -> Self {
        self.check = Some(check);
        self
    }
}

#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl Schema {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }
}

const FREQUENCY: ValueCheck = ValueCheck::InRange { min: 0.0, max: 1.0 };
const PERCENT: ValueCheck = ValueCheck::InRange {
    min: 0.0,
    max: 100.0,
};

use ColumnType::{Float, Integer, String as Str};

// `/lookup/id/{gene}?expand=1`, elements of `Transcript`.
pub static TRANSCRIPTS: Schema = Schema {
    name: "transcripts",
    columns: &[
        ColumnSpec::new("id", Str),
        ColumnSpec::new("biotype", Str).nullable(),
        ColumnSpec::new("start", Integer).nullable().coerce(),
        ColumnSpec::new("end", Integer).nullable().coerce(),
        ColumnSpec::new("strand", Integer).nullable().coerce(),
    ],
};

pub static GENE_ANNOTATION: Schema = Schema {
    name: "gene_annotation",
    columns: &[
        ColumnSpec::new("id", Str),
        ColumnSpec::new("display_name", Str).nullable(),
        ColumnSpec::new("biotype", Str).nullable(),
        ColumnSpec::new("seq_region_name", Str).nullable(),
        ColumnSpec::new("start", Integer).nullable().coerce(),
        ColumnSpec::new("end", Integer).nullable().coerce(),
        ColumnSpec::new("strand", Integer).nullable().coerce(),
    ],
};

pub static VARIANT_SUMMARY: Schema = Schema {
    name: "variant_summary",
    columns: &[
        ColumnSpec::new("id", Str).nullable(),
        ColumnSpec::new("most_severe_consequence", Str).nullable(),
        ColumnSpec::new("minor_allele", Str).nullable(),
        ColumnSpec::new("minor_allele_freq", Float)
            .nullable()
            .check(FREQUENCY),
    ],
};

pub static VARIATION_MAPPINGS: Schema = Schema {
    name: "variation_mappings",
    columns: &[
        ColumnSpec::new("seq_region_name", Str),
        ColumnSpec::new("start", Integer).coerce(),
        ColumnSpec::new("end", Integer).coerce(),
        ColumnSpec::new("strand", Integer).coerce(),
        ColumnSpec::new("allele_string", Str),
    ],
};

// `data[0].homologies` of `/homology/id/{gene}?type=orthologues`.
pub static ORTHOLOGS: Schema = Schema {
    name: "orthologs",
    columns: &[
        ColumnSpec::new("type", Str).nullable(),
        ColumnSpec::new("target.id", Str).nullable(),
        ColumnSpec::new("target.species", Str).nullable(),
        ColumnSpec::new("target.perc_id", Float)
            .nullable()
            .check(PERCENT),
        ColumnSpec::new("target.perc_pos", Float)
            .nullable()
            .check(PERCENT),
    ],
};

pub fn all() -> [&'static Schema; 5] {
    [
        &TRANSCRIPTS,
        &GENE_ANNOTATION,
        &VARIANT_SUMMARY,
        &VARIATION_MAPPINGS,
        &ORTHOLOGS,
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn column_names_unique_per_schema() {
        for schema in all() {
            let names: HashSet<_> = schema.columns.iter().map(|column| column.name).collect();
            assert_eq!(names.len(), schema.columns.len(), "{}", schema.name);
        }
    }

    #[test]
    fn range_check_is_inclusive() {
        assert!(FREQUENCY.accepts(0.0));
        assert!(FREQUENCY.accepts(1.0));
        assert!(!FREQUENCY.accepts(1.0001));
        assert!(!FREQUENCY.accepts(-0.1));
    }

    #[test]
    fn check_names() {
        assert_eq!(FREQUENCY.to_string(), "in_range(0.0, 1.0)");
        assert_eq!(PERCENT.to_string(), "in_range(0.0, 100.0)");
    }

    #[test]
    fn strand_has_no_value_check() {
        for schema in [&TRANSCRIPTS, &GENE_ANNOTATION, &VARIATION_MAPPINGS] {
            assert!(schema.column("strand").unwrap().check.is_none(), "{}", schema.name);
        }
    }

    #[test]
    fn lookup_column() {
        let column = VARIATION_MAPPINGS.column("strand").unwrap();
        assert!(column.coerce);
        assert!(!column.nullable);
        assert!(VARIATION_MAPPINGS.column("missing").is_none());
    }
}
