//! Closed vocabularies used in Datadoc metadata.
//!
//! Values serialize as SCREAMING_SNAKE_CASE strings to match the document
//! schema.

use serde::{Deserialize, Serialize};

/// Sensitivity of data, derived from the dataset state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Assessment {
    Sensitive,
    Protected,
    Open,
}

/// Lifecycle status of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSetStatus {
    Draft,
    Internal,
    External,
    Deprecated,
}

/// Processing state of a dataset.
///
/// Inferred from the storage folder naming convention, e.g. a path segment
/// `inndata` maps to `InputData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSetState {
    SourceData,
    InputData,
    ProcessedData,
    Statistics,
    OutputData,
}

impl DataSetState {
    /// All states, in the order they are matched against path segments
    pub const ALL: [DataSetState; 5] = [
        DataSetState::SourceData,
        DataSetState::InputData,
        DataSetState::ProcessedData,
        DataSetState::Statistics,
        DataSetState::OutputData,
    ];
}

/// Abstract data type of a variable.
///
/// In statistical metadata one is not interested in how the data is
/// technically stored, but in the meaning of the data type, so concrete
/// column types are translated into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    String,
    Integer,
    Float,
    Datetime,
    Boolean,
}

/// Role a variable plays in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableRole {
    Identifier,
    Measure,
    StartTime,
    StopTime,
    Attribute,
}

/// Temporality of a dataset or variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemporalityType {
    Fixed,
    Status,
    Accumulated,
    Event,
}

/// Whether a variable contains personal data, and in which form.
///
/// Replaces the historical `direct_person_identifying` boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IsPersonalData {
    NotPersonalData,
    PseudonymisedEncryptedPersonalData,
    NonPseudonymisedEncryptedPersonalData,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_serialization_shape() {
        assert_eq!(
            serde_json::to_string(&DataSetState::ProcessedData).unwrap(),
            "\"PROCESSED_DATA\""
        );
        assert_eq!(
            serde_json::to_string(&IsPersonalData::NotPersonalData).unwrap(),
            "\"NOT_PERSONAL_DATA\""
        );
        assert_eq!(serde_json::to_string(&DataType::Datetime).unwrap(), "\"DATETIME\"");
    }

    #[test]
    fn test_enum_round_trip() {
        let role: VariableRole = serde_json::from_str("\"START_TIME\"").unwrap();
        assert_eq!(role, VariableRole::StartTime);
    }
}
