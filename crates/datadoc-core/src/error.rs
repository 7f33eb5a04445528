//! Error types for the Datadoc core.
//!
//! Fatal conditions are raised through `DatadocError`; recoverable findings
//! (incomplete obligatory metadata, lenient-mode merge inconsistencies) are
//! surfaced as structured [`MetadataWarning`]s instead and never abort an
//! operation.

use thiserror::Error;

/// Result type alias for Datadoc operations
pub type Result<T> = std::result::Result<T, DatadocError>;

/// Comprehensive error type for Datadoc operations
#[derive(Error, Debug)]
pub enum DatadocError {
    /// A metadata document declares a schema version we have never released
    #[error("Document version '{0}' of discovered file is not supported. The document must be inspected manually.")]
    UnknownDocumentVersion(String),

    /// An explicitly supplied metadata document path does not exist
    #[error("Metadata document does not exist! Provided path: {0}")]
    MetadataDocumentNotFound(String),

    /// Date fields are in the wrong chronological order
    #[error("Validation error: contains_data_from must be the same or earlier date than contains_data_until ({context})")]
    IncorrectDateOrder { context: String },

    /// A field was assigned a value it cannot hold
    #[error("Validation error: invalid value '{value}' for field '{field}'")]
    InvalidFieldValue { field: String, value: String },

    /// Existing and new datasets differ significantly from one another
    #[error("Inconsistencies found between extracted and existing metadata. Inconsistencies are: {}", .0.join(", "))]
    InconsistentDatasets(Vec<String>),

    /// Neither an existing document nor an extractable dataset produced metadata
    #[error("Could not read metadata")]
    CouldNotReadMetadata,

    /// Save was requested but no document location is known
    #[error("No metadata document to save")]
    NoMetadataDocument,

    /// A dataset file type we have no schema source for
    #[error("No schema source registered for '{0}'. Supply a SchemaSource implementation for this file type.")]
    UnsupportedDatasetFile(String),

    /// A storage path with a scheme we cannot handle
    #[error("Unsupported storage scheme in path '{0}'")]
    UnsupportedStorageScheme(String),

    /// Object storage operation failed
    #[error("Object storage error: {0}")]
    ObjectStorage(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check your internet connection and source URL.")]
    Http(#[from] reqwest::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables.")]
    Config(String),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatadocError {
    /// Create an object storage error
    pub fn object_storage(msg: impl Into<String>) -> Self {
        Self::ObjectStorage(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a date order error
    pub fn incorrect_date_order(context: impl Into<String>) -> Self {
        Self::IncorrectDateOrder {
            context: context.into(),
        }
    }

    /// Create an invalid field value error
    pub fn invalid_field_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Non-fatal findings surfaced to the caller as structured warnings.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataWarning {
    /// Obligatory dataset fields are missing values
    IncompleteDataset { missing_fields: Vec<String> },

    /// Obligatory variable fields are missing values, grouped per variable
    IncompleteVariables {
        missing_by_variable: Vec<(String, Vec<String>)>,
    },

    /// Existing and new datasets differ, reported in lenient merge mode
    InconsistentDatasets { failures: Vec<String> },
}

impl std::fmt::Display for MetadataWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataWarning::IncompleteDataset { missing_fields } => {
                write!(
                    f,
                    "Obligatory metadata is missing: {}",
                    missing_fields.join(", ")
                )
            }
            MetadataWarning::IncompleteVariables { missing_by_variable } => {
                let summary: Vec<String> = missing_by_variable
                    .iter()
                    .map(|(short_name, fields)| format!("{}: [{}]", short_name, fields.join(", ")))
                    .collect();
                write!(f, "Obligatory metadata is missing: {}", summary.join("; "))
            }
            MetadataWarning::InconsistentDatasets { failures } => {
                write!(
                    f,
                    "Inconsistencies found between extracted and existing metadata. Inconsistencies are: {}",
                    failures.join(", ")
                )
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_version_message_includes_version() {
        let err = DatadocError::UnknownDocumentVersion("99.99.99".to_string());
        assert!(err.to_string().contains("99.99.99"));
    }

    #[test]
    fn test_warning_display_lists_fields() {
        let warning = MetadataWarning::IncompleteDataset {
            missing_fields: vec!["name".to_string(), "description".to_string()],
        };
        let text = warning.to_string();
        assert!(text.contains("name"));
        assert!(text.contains("description"));
    }
}
