//! The on-disk document structures.
//!
//! `MetadataContainer` is the top-level shape of a sidecar document. It
//! wraps the `DatadocMetadata` subtree together with sibling namespaces
//! (e.g. pseudonymization) which are round-tripped unchanged even though
//! this crate never interprets them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{
    Assessment, DataSetState, DataSetStatus, DataType, IsPersonalData, TemporalityType,
    VariableRole,
};
use crate::lang::LanguageStringType;
use crate::{CONTAINER_VERSION, DOCUMENT_VERSION};

/// Dataset-level metadata.
///
/// One instance per opened dataset. Field order here defines the key order
/// of the serialized document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Identity of the dataset, generated once on first extraction and
    /// preserved thereafter
    pub id: Option<Uuid>,

    /// Technical name of the dataset, derived from the filename
    pub short_name: Option<String>,

    /// Sensitivity classification, derived from the dataset state
    pub assessment: Option<Assessment>,

    /// Processing state, inferred from the storage folder naming convention
    pub dataset_state: Option<DataSetState>,

    /// Lifecycle status
    pub dataset_status: Option<DataSetStatus>,

    /// Human readable name
    pub name: Option<LanguageStringType>,

    /// Description of the dataset contents
    pub description: Option<LanguageStringType>,

    /// Where the data originates from
    pub data_source: Option<LanguageStringType>,

    /// Description of the population the data covers
    pub population_description: Option<LanguageStringType>,

    /// Version number, derived from the filename suffix `_vN`
    pub version: Option<String>,

    /// Description of what changed in this version
    pub version_description: Option<LanguageStringType>,

    /// Classification code for the unit the observations describe
    pub unit_type: Option<String>,

    /// Temporality of the data
    pub temporality_type: Option<TemporalityType>,

    /// Statistical subject code, resolved from the filename against the
    /// external subject taxonomy
    pub subject_field: Option<String>,

    /// Searchable keywords
    pub keyword: Option<Vec<String>>,

    /// Geographic coverage of the data
    pub spatial_coverage_description: Option<LanguageStringType>,

    /// Earliest date the data covers, derived from filename period tokens
    pub contains_data_from: Option<NaiveDate>,

    /// Latest date the data covers, derived from filename period tokens
    pub contains_data_until: Option<NaiveDate>,

    /// Whether the dataset contains personal data in any form
    pub contains_personal_data: Option<bool>,

    /// Code for the organizational unit owning the dataset
    pub owner: Option<String>,

    /// Path to the dataset file this metadata describes
    pub file_path: Option<String>,

    /// Set exactly once, on the first successful write
    pub metadata_created_date: Option<DateTime<Utc>>,

    /// Identity that first saved this document
    pub metadata_created_by: Option<String>,

    /// Overwritten on every write
    pub metadata_last_updated_date: Option<DateTime<Utc>>,

    /// Identity that last saved this document
    pub metadata_last_updated_by: Option<String>,
}

/// Per-variable (column) metadata.
///
/// Variables are kept as an ordered list matching the column order in the
/// source file. `short_name` is unique within a dataset and acts as the
/// lookup key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Technical column name, unique within the dataset
    pub short_name: Option<String>,

    /// Human readable name
    pub name: Option<LanguageStringType>,

    /// Abstract data type, inferred from the native column type and
    /// user-correctable
    pub data_type: Option<DataType>,

    /// Role of the variable, defaults to MEASURE
    pub variable_role: Option<VariableRole>,

    /// URI of the variable definition
    pub definition_uri: Option<String>,

    /// Whether the variable contains personal data, defaults to
    /// NOT_PERSONAL_DATA
    pub is_personal_data: Option<IsPersonalData>,

    /// Where the data originates from, inherited from the dataset if unset
    pub data_source: Option<LanguageStringType>,

    /// Description of the population the variable covers
    pub population_description: Option<LanguageStringType>,

    /// Free-form comment
    pub comment: Option<LanguageStringType>,

    /// Temporality, inherited from the dataset if unset
    pub temporality_type: Option<TemporalityType>,

    /// Unit of measurement
    pub measurement_unit: Option<LanguageStringType>,

    /// Technical format string, e.g. a SAS format
    pub format: Option<String>,

    /// URI of the classification the values are drawn from
    pub classification_uri: Option<String>,

    /// Description of invalid values appearing in the data
    pub invalid_value_description: Option<LanguageStringType>,

    /// Identity of the variable, generated once and stable across saves as
    /// long as the short name is preserved
    pub id: Option<Uuid>,

    /// Earliest date the variable covers, inherited from the dataset if
    /// unset
    pub contains_data_from: Option<NaiveDate>,

    /// Latest date the variable covers, inherited from the dataset if unset
    pub contains_data_until: Option<NaiveDate>,
}

/// The datadoc metadata subtree of a sidecar document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatadocMetadata {
    /// Version of the document schema this subtree conforms to
    pub document_version: String,

    /// Completeness score embedded at save time
    #[serde(default)]
    pub percentage_complete: Option<u8>,

    /// Dataset-level metadata
    pub dataset: Option<Dataset>,

    /// Per-variable metadata, in column order
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Default for DatadocMetadata {
    fn default() -> Self {
        Self {
            document_version: DOCUMENT_VERSION.to_string(),
            percentage_complete: None,
            dataset: None,
            variables: Vec::new(),
        }
    }
}

/// The container structure wrapping a datadoc subtree on disk.
///
/// `pseudonymization` (and any future sibling namespaces) is opaque to this
/// crate: it is read in, held, and written back out unchanged. A container
/// with a null `datadoc` subtree is valid; such files are produced by the
/// pseudonymization process alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataContainer {
    /// Version of the container structure itself
    pub document_version: String,

    /// The datadoc metadata subtree
    pub datadoc: Option<DatadocMetadata>,

    /// Opaque sibling namespace, round-tripped unchanged
    #[serde(default)]
    pub pseudonymization: Option<serde_json::Value>,
}

impl MetadataContainer {
    /// Wrap a datadoc subtree in a fresh container
    pub fn new(datadoc: DatadocMetadata) -> Self {
        Self {
            document_version: CONTAINER_VERSION.to_string(),
            datadoc: Some(datadoc),
            pseudonymization: None,
        }
    }
}
