//! Shared constants for obligatory metadata and merge behavior.
//!
//! These lists are the single source of truth for completeness scoring and
//! missing-field reporting. They are plain constants over the field
//! identifier enums so that adding a field to the model never silently
//! changes what counts as obligatory.

use datadoc_model::{LanguageCode, LanguageStringType};

use crate::fields::{DatasetIdentifier, VariableIdentifier};

/// Filename suffix of a metadata document, appended to the dataset stem
pub const METADATA_DOCUMENT_FILE_SUFFIX: &str = "__DOC.json";

/// Dataset fields that must be filled in before a document is complete
pub const OBLIGATORY_DATASET_METADATA: [DatasetIdentifier; 17] = [
    DatasetIdentifier::Assessment,
    DatasetIdentifier::DatasetState,
    DatasetIdentifier::DatasetStatus,
    DatasetIdentifier::Name,
    DatasetIdentifier::Description,
    DatasetIdentifier::DataSource,
    DatasetIdentifier::PopulationDescription,
    DatasetIdentifier::Version,
    DatasetIdentifier::VersionDescription,
    DatasetIdentifier::UnitType,
    DatasetIdentifier::TemporalityType,
    DatasetIdentifier::SubjectField,
    DatasetIdentifier::SpatialCoverageDescription,
    DatasetIdentifier::Owner,
    DatasetIdentifier::ContainsDataFrom,
    DatasetIdentifier::ContainsDataUntil,
    DatasetIdentifier::ContainsPersonalData,
];

/// Variable fields that must be filled in before a document is complete
pub const OBLIGATORY_VARIABLE_METADATA: [VariableIdentifier; 4] = [
    VariableIdentifier::Name,
    VariableIdentifier::DataType,
    VariableIdentifier::VariableRole,
    VariableIdentifier::IsPersonalData,
];

/// Descriptive dataset fields carried over from an existing document during
/// a merge. Everything else (identity aside) is taken from the fresh
/// extraction.
pub const DATASET_FIELDS_FROM_EXISTING_METADATA: [DatasetIdentifier; 12] = [
    DatasetIdentifier::DatasetStatus,
    DatasetIdentifier::Name,
    DatasetIdentifier::Description,
    DatasetIdentifier::DataSource,
    DatasetIdentifier::PopulationDescription,
    DatasetIdentifier::UnitType,
    DatasetIdentifier::TemporalityType,
    DatasetIdentifier::SubjectField,
    DatasetIdentifier::Keyword,
    DatasetIdentifier::SpatialCoverageDescription,
    DatasetIdentifier::ContainsPersonalData,
    DatasetIdentifier::Owner,
];

/// Spatial coverage applied to freshly extracted datasets
pub fn default_spatial_coverage_description() -> LanguageStringType {
    let mut value = LanguageStringType::default();
    value.set(LanguageCode::Nb, "Norge");
    value.set(LanguageCode::Nn, "Noreg");
    value.set(LanguageCode::En, "Norway");
    value
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_fields_are_a_subset_of_the_model() {
        // Structural fields never come from the existing document
        assert!(!DATASET_FIELDS_FROM_EXISTING_METADATA
            .contains(&DatasetIdentifier::DatasetState));
        assert!(!DATASET_FIELDS_FROM_EXISTING_METADATA.contains(&DatasetIdentifier::Version));
        assert!(!DATASET_FIELDS_FROM_EXISTING_METADATA.contains(&DatasetIdentifier::Id));
    }

    #[test]
    fn test_default_spatial_coverage_has_all_languages() {
        let value = default_spatial_coverage_description();
        assert_eq!(value.get(LanguageCode::Nb), Some("Norge"));
        assert_eq!(value.get(LanguageCode::Nn), Some("Noreg"));
        assert_eq!(value.get(LanguageCode::En), Some("Norway"));
    }
}
