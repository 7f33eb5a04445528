//! Dataset schema extraction boundary.
//!
//! The file parsers themselves (parquet, SAS7BDAT, ...) live outside this
//! crate; they implement [`SchemaSource`] and produce an ordered list of
//! [`SchemaField`] records. What lives here is the translation table from
//! native column type names to the abstract [`DataType`] vocabulary.

use async_trait::async_trait;
use datadoc_model::{DataType, LanguageStringType, Variable};

use crate::error::Result;
use crate::storage::StoragePath;

const KNOWN_INTEGER_TYPES: &[&str] = &[
    "int", "int_", "int8", "int16", "int32", "int64", "integer", "long", "uint", "uint8",
    "uint16", "uint32", "uint64",
];

const KNOWN_FLOAT_TYPES: &[&str] = &[
    "double", "float", "float_", "float16", "float32", "float64", "decimal", "number",
    "numeric", "num",
];

const KNOWN_STRING_TYPES: &[&str] = &[
    "string", "str", "char", "varchar", "varchar2", "text", "txt", "bytes", "utf8",
    "large_string",
];

const KNOWN_DATETIME_TYPES: &[&str] = &[
    "timestamp",
    "timestamp[us]",
    "timestamp[ns]",
    "datetime64",
    "datetime64[ns]",
    "datetime64[us]",
    "date",
    "datetime",
    "time",
    "date32[day]",
];

const KNOWN_BOOLEAN_TYPES: &[&str] = &["bool", "bool_", "boolean"];

/// Translate a concrete column type name to an abstract data type.
///
/// Unknown type names translate to `None` and are left for the user to
/// classify.
pub fn transform_data_type(native_type: &str) -> Option<DataType> {
    let normalized = native_type.to_lowercase();
    let correspondence: [(&[&str], DataType); 5] = [
        (KNOWN_INTEGER_TYPES, DataType::Integer),
        (KNOWN_FLOAT_TYPES, DataType::Float),
        (KNOWN_STRING_TYPES, DataType::String),
        (KNOWN_DATETIME_TYPES, DataType::Datetime),
        (KNOWN_BOOLEAN_TYPES, DataType::Boolean),
    ];
    correspondence
        .iter()
        .find(|(known, _)| known.contains(&normalized.as_str()))
        .map(|(_, abstract_type)| *abstract_type)
}

/// One column as reported by a dataset file parser.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Technical column name
    pub short_name: String,

    /// Abstract data type, if the native type was recognized
    pub data_type: Option<DataType>,

    /// Display name, when the file format carries column labels
    pub name: Option<LanguageStringType>,
}

impl SchemaField {
    /// Create a field from a column name and its native type name
    pub fn new(short_name: impl Into<String>, native_type: &str) -> Self {
        Self {
            short_name: short_name.into(),
            data_type: transform_data_type(native_type),
            name: None,
        }
    }
}

impl From<SchemaField> for Variable {
    fn from(field: SchemaField) -> Self {
        Variable {
            short_name: Some(field.short_name),
            data_type: field.data_type,
            name: field.name,
            ..Default::default()
        }
    }
}

/// A source of dataset schemas.
///
/// Implemented by the out-of-scope file parsers. The returned fields must
/// preserve column order from the source file.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Extract the column list from the dataset at the given path
    async fn extract(&self, dataset: &StoragePath) -> Result<Vec<SchemaField>>;
}
