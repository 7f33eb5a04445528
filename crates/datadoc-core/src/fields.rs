//! Typed access to individual metadata fields.
//!
//! Editing surfaces address fields by identifier rather than by struct
//! access. The mapping from identifier to field is a closed enum: there is
//! no reflection, and an assignment with a value of the wrong shape is
//! rejected with an error naming the field, leaving the previous value
//! intact.

use chrono::{DateTime, NaiveDate, Utc};
use datadoc_model::{
    Assessment, DataSetState, DataSetStatus, DataType, Dataset, IsPersonalData,
    LanguageStringType, TemporalityType, Variable, VariableRole,
};
use uuid::Uuid;

use crate::error::{DatadocError, Result};
use crate::validation::incorrect_date_order;

/// A value destined for a metadata field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    LanguageStrings(LanguageStringType),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Bool(bool),
    Keywords(Vec<String>),
    Identifier(Uuid),
    Assessment(Assessment),
    DatasetState(DataSetState),
    DatasetStatus(DataSetStatus),
    DataType(DataType),
    VariableRole(VariableRole),
    TemporalityType(TemporalityType),
    IsPersonalData(IsPersonalData),
    /// Clears the field
    Empty,
}

impl FieldValue {
    fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::LanguageStrings(_) => "language strings",
            FieldValue::Date(_) => "date",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Keywords(_) => "keyword list",
            FieldValue::Identifier(_) => "identifier",
            FieldValue::Assessment(_) => "assessment",
            FieldValue::DatasetState(_) => "dataset state",
            FieldValue::DatasetStatus(_) => "dataset status",
            FieldValue::DataType(_) => "data type",
            FieldValue::VariableRole(_) => "variable role",
            FieldValue::TemporalityType(_) => "temporality type",
            FieldValue::IsPersonalData(_) => "is personal data",
            FieldValue::Empty => "empty",
        }
    }
}

macro_rules! assign {
    ($slot:expr, $field:expr, $value:expr, $variant:ident) => {
        match $value {
            FieldValue::$variant(inner) => {
                $slot = Some(inner);
                Ok(())
            }
            FieldValue::Empty => {
                $slot = None;
                Ok(())
            }
            other => Err(DatadocError::invalid_field_value($field, other.type_name())),
        }
    };
}

/// Identifies one field of [`Dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetIdentifier {
    ShortName,
    Assessment,
    DatasetState,
    DatasetStatus,
    Name,
    Description,
    DataSource,
    PopulationDescription,
    Version,
    VersionDescription,
    UnitType,
    TemporalityType,
    SubjectField,
    Keyword,
    SpatialCoverageDescription,
    ContainsDataFrom,
    ContainsDataUntil,
    ContainsPersonalData,
    Owner,
    FilePath,
    Id,
    MetadataCreatedDate,
    MetadataCreatedBy,
    MetadataLastUpdatedDate,
    MetadataLastUpdatedBy,
}

impl DatasetIdentifier {
    /// The serialized field name
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetIdentifier::ShortName => "short_name",
            DatasetIdentifier::Assessment => "assessment",
            DatasetIdentifier::DatasetState => "dataset_state",
            DatasetIdentifier::DatasetStatus => "dataset_status",
            DatasetIdentifier::Name => "name",
            DatasetIdentifier::Description => "description",
            DatasetIdentifier::DataSource => "data_source",
            DatasetIdentifier::PopulationDescription => "population_description",
            DatasetIdentifier::Version => "version",
            DatasetIdentifier::VersionDescription => "version_description",
            DatasetIdentifier::UnitType => "unit_type",
            DatasetIdentifier::TemporalityType => "temporality_type",
            DatasetIdentifier::SubjectField => "subject_field",
            DatasetIdentifier::Keyword => "keyword",
            DatasetIdentifier::SpatialCoverageDescription => "spatial_coverage_description",
            DatasetIdentifier::ContainsDataFrom => "contains_data_from",
            DatasetIdentifier::ContainsDataUntil => "contains_data_until",
            DatasetIdentifier::ContainsPersonalData => "contains_personal_data",
            DatasetIdentifier::Owner => "owner",
            DatasetIdentifier::FilePath => "file_path",
            DatasetIdentifier::Id => "id",
            DatasetIdentifier::MetadataCreatedDate => "metadata_created_date",
            DatasetIdentifier::MetadataCreatedBy => "metadata_created_by",
            DatasetIdentifier::MetadataLastUpdatedDate => "metadata_last_updated_date",
            DatasetIdentifier::MetadataLastUpdatedBy => "metadata_last_updated_by",
        }
    }

    /// Whether the field counts as filled in for completeness purposes.
    ///
    /// Language string fields count only when at least one language carries
    /// text.
    pub fn is_set(&self, dataset: &Dataset) -> bool {
        fn has_text(value: &Option<LanguageStringType>) -> bool {
            value.as_ref().is_some_and(LanguageStringType::has_content)
        }
        match self {
            DatasetIdentifier::ShortName => dataset.short_name.is_some(),
            DatasetIdentifier::Assessment => dataset.assessment.is_some(),
            DatasetIdentifier::DatasetState => dataset.dataset_state.is_some(),
            DatasetIdentifier::DatasetStatus => dataset.dataset_status.is_some(),
            DatasetIdentifier::Name => has_text(&dataset.name),
            DatasetIdentifier::Description => has_text(&dataset.description),
            DatasetIdentifier::DataSource => has_text(&dataset.data_source),
            DatasetIdentifier::PopulationDescription => has_text(&dataset.population_description),
            DatasetIdentifier::Version => dataset.version.is_some(),
            DatasetIdentifier::VersionDescription => has_text(&dataset.version_description),
            DatasetIdentifier::UnitType => dataset.unit_type.is_some(),
            DatasetIdentifier::TemporalityType => dataset.temporality_type.is_some(),
            DatasetIdentifier::SubjectField => dataset.subject_field.is_some(),
            DatasetIdentifier::Keyword => dataset.keyword.is_some(),
            DatasetIdentifier::SpatialCoverageDescription => {
                has_text(&dataset.spatial_coverage_description)
            }
            DatasetIdentifier::ContainsDataFrom => dataset.contains_data_from.is_some(),
            DatasetIdentifier::ContainsDataUntil => dataset.contains_data_until.is_some(),
            DatasetIdentifier::ContainsPersonalData => dataset.contains_personal_data.is_some(),
            DatasetIdentifier::Owner => dataset.owner.is_some(),
            DatasetIdentifier::FilePath => dataset.file_path.is_some(),
            DatasetIdentifier::Id => dataset.id.is_some(),
            DatasetIdentifier::MetadataCreatedDate => dataset.metadata_created_date.is_some(),
            DatasetIdentifier::MetadataCreatedBy => dataset.metadata_created_by.is_some(),
            DatasetIdentifier::MetadataLastUpdatedDate => {
                dataset.metadata_last_updated_date.is_some()
            }
            DatasetIdentifier::MetadataLastUpdatedBy => dataset.metadata_last_updated_by.is_some(),
        }
    }
}

/// Assign a value to a dataset field.
///
/// A value of the wrong shape, or a date assignment that would invert the
/// covered period, is rejected without modifying the dataset.
pub fn apply_dataset_value(
    dataset: &mut Dataset,
    identifier: DatasetIdentifier,
    value: FieldValue,
) -> Result<()> {
    let field = identifier.as_str();
    match identifier {
        DatasetIdentifier::ShortName => assign!(dataset.short_name, field, value, Text),
        DatasetIdentifier::Assessment => assign!(dataset.assessment, field, value, Assessment),
        DatasetIdentifier::DatasetState => {
            assign!(dataset.dataset_state, field, value, DatasetState)
        }
        DatasetIdentifier::DatasetStatus => {
            assign!(dataset.dataset_status, field, value, DatasetStatus)
        }
        DatasetIdentifier::Name => assign!(dataset.name, field, value, LanguageStrings),
        DatasetIdentifier::Description => {
            assign!(dataset.description, field, value, LanguageStrings)
        }
        DatasetIdentifier::DataSource => {
            assign!(dataset.data_source, field, value, LanguageStrings)
        }
        DatasetIdentifier::PopulationDescription => {
            assign!(dataset.population_description, field, value, LanguageStrings)
        }
        DatasetIdentifier::Version => assign!(dataset.version, field, value, Text),
        DatasetIdentifier::VersionDescription => {
            assign!(dataset.version_description, field, value, LanguageStrings)
        }
        DatasetIdentifier::UnitType => assign!(dataset.unit_type, field, value, Text),
        DatasetIdentifier::TemporalityType => {
            assign!(dataset.temporality_type, field, value, TemporalityType)
        }
        DatasetIdentifier::SubjectField => assign!(dataset.subject_field, field, value, Text),
        DatasetIdentifier::Keyword => assign!(dataset.keyword, field, value, Keywords),
        DatasetIdentifier::SpatialCoverageDescription => {
            assign!(
                dataset.spatial_coverage_description,
                field,
                value,
                LanguageStrings
            )
        }
        DatasetIdentifier::ContainsDataFrom => {
            if let FieldValue::Date(date) = value {
                if incorrect_date_order(Some(date), dataset.contains_data_until) {
                    return Err(DatadocError::incorrect_date_order(field));
                }
            }
            assign!(dataset.contains_data_from, field, value, Date)
        }
        DatasetIdentifier::ContainsDataUntil => {
            if let FieldValue::Date(date) = value {
                if incorrect_date_order(dataset.contains_data_from, Some(date)) {
                    return Err(DatadocError::incorrect_date_order(field));
                }
            }
            assign!(dataset.contains_data_until, field, value, Date)
        }
        DatasetIdentifier::ContainsPersonalData => {
            assign!(dataset.contains_personal_data, field, value, Bool)
        }
        DatasetIdentifier::Owner => assign!(dataset.owner, field, value, Text),
        DatasetIdentifier::FilePath => assign!(dataset.file_path, field, value, Text),
        DatasetIdentifier::Id => assign!(dataset.id, field, value, Identifier),
        DatasetIdentifier::MetadataCreatedDate => {
            assign!(dataset.metadata_created_date, field, value, Timestamp)
        }
        DatasetIdentifier::MetadataCreatedBy => {
            assign!(dataset.metadata_created_by, field, value, Text)
        }
        DatasetIdentifier::MetadataLastUpdatedDate => {
            assign!(dataset.metadata_last_updated_date, field, value, Timestamp)
        }
        DatasetIdentifier::MetadataLastUpdatedBy => {
            assign!(dataset.metadata_last_updated_by, field, value, Text)
        }
    }
}

/// Identifies one field of [`Variable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableIdentifier {
    ShortName,
    Name,
    DataType,
    VariableRole,
    DefinitionUri,
    IsPersonalData,
    DataSource,
    PopulationDescription,
    Comment,
    TemporalityType,
    MeasurementUnit,
    Format,
    ClassificationUri,
    InvalidValueDescription,
    Id,
    ContainsDataFrom,
    ContainsDataUntil,
}

impl VariableIdentifier {
    /// The serialized field name
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableIdentifier::ShortName => "short_name",
            VariableIdentifier::Name => "name",
            VariableIdentifier::DataType => "data_type",
            VariableIdentifier::VariableRole => "variable_role",
            VariableIdentifier::DefinitionUri => "definition_uri",
            VariableIdentifier::IsPersonalData => "is_personal_data",
            VariableIdentifier::DataSource => "data_source",
            VariableIdentifier::PopulationDescription => "population_description",
            VariableIdentifier::Comment => "comment",
            VariableIdentifier::TemporalityType => "temporality_type",
            VariableIdentifier::MeasurementUnit => "measurement_unit",
            VariableIdentifier::Format => "format",
            VariableIdentifier::ClassificationUri => "classification_uri",
            VariableIdentifier::InvalidValueDescription => "invalid_value_description",
            VariableIdentifier::Id => "id",
            VariableIdentifier::ContainsDataFrom => "contains_data_from",
            VariableIdentifier::ContainsDataUntil => "contains_data_until",
        }
    }

    /// Whether the field counts as filled in for completeness purposes
    pub fn is_set(&self, variable: &Variable) -> bool {
        fn has_text(value: &Option<LanguageStringType>) -> bool {
            value.as_ref().is_some_and(LanguageStringType::has_content)
        }
        match self {
            VariableIdentifier::ShortName => variable.short_name.is_some(),
            VariableIdentifier::Name => has_text(&variable.name),
            VariableIdentifier::DataType => variable.data_type.is_some(),
            VariableIdentifier::VariableRole => variable.variable_role.is_some(),
            VariableIdentifier::DefinitionUri => variable.definition_uri.is_some(),
            VariableIdentifier::IsPersonalData => variable.is_personal_data.is_some(),
            VariableIdentifier::DataSource => has_text(&variable.data_source),
            VariableIdentifier::PopulationDescription => {
                has_text(&variable.population_description)
            }
            VariableIdentifier::Comment => has_text(&variable.comment),
            VariableIdentifier::TemporalityType => variable.temporality_type.is_some(),
            VariableIdentifier::MeasurementUnit => has_text(&variable.measurement_unit),
            VariableIdentifier::Format => variable.format.is_some(),
            VariableIdentifier::ClassificationUri => variable.classification_uri.is_some(),
            VariableIdentifier::InvalidValueDescription => {
                has_text(&variable.invalid_value_description)
            }
            VariableIdentifier::Id => variable.id.is_some(),
            VariableIdentifier::ContainsDataFrom => variable.contains_data_from.is_some(),
            VariableIdentifier::ContainsDataUntil => variable.contains_data_until.is_some(),
        }
    }
}

/// Assign a value to a variable field, with the same rejection rules as
/// [`apply_dataset_value`].
pub fn apply_variable_value(
    variable: &mut Variable,
    identifier: VariableIdentifier,
    value: FieldValue,
) -> Result<()> {
    let field = identifier.as_str();
    match identifier {
        VariableIdentifier::ShortName => assign!(variable.short_name, field, value, Text),
        VariableIdentifier::Name => assign!(variable.name, field, value, LanguageStrings),
        VariableIdentifier::DataType => assign!(variable.data_type, field, value, DataType),
        VariableIdentifier::VariableRole => {
            assign!(variable.variable_role, field, value, VariableRole)
        }
        VariableIdentifier::DefinitionUri => assign!(variable.definition_uri, field, value, Text),
        VariableIdentifier::IsPersonalData => {
            assign!(variable.is_personal_data, field, value, IsPersonalData)
        }
        VariableIdentifier::DataSource => {
            assign!(variable.data_source, field, value, LanguageStrings)
        }
        VariableIdentifier::PopulationDescription => {
            assign!(variable.population_description, field, value, LanguageStrings)
        }
        VariableIdentifier::Comment => assign!(variable.comment, field, value, LanguageStrings),
        VariableIdentifier::TemporalityType => {
            assign!(variable.temporality_type, field, value, TemporalityType)
        }
        VariableIdentifier::MeasurementUnit => {
            assign!(variable.measurement_unit, field, value, LanguageStrings)
        }
        VariableIdentifier::Format => assign!(variable.format, field, value, Text),
        VariableIdentifier::ClassificationUri => {
            assign!(variable.classification_uri, field, value, Text)
        }
        VariableIdentifier::InvalidValueDescription => {
            assign!(variable.invalid_value_description, field, value, LanguageStrings)
        }
        VariableIdentifier::Id => assign!(variable.id, field, value, Identifier),
        VariableIdentifier::ContainsDataFrom => {
            if let FieldValue::Date(date) = value {
                if incorrect_date_order(Some(date), variable.contains_data_until) {
                    return Err(DatadocError::incorrect_date_order(field));
                }
            }
            assign!(variable.contains_data_from, field, value, Date)
        }
        VariableIdentifier::ContainsDataUntil => {
            if let FieldValue::Date(date) = value {
                if incorrect_date_order(variable.contains_data_from, Some(date)) {
                    return Err(DatadocError::incorrect_date_order(field));
                }
            }
            assign!(variable.contains_data_until, field, value, Date)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use datadoc_model::LanguageCode;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_apply_text_value() {
        let mut dataset = Dataset::default();
        apply_dataset_value(
            &mut dataset,
            DatasetIdentifier::ShortName,
            FieldValue::Text("person_data".to_string()),
        )
        .unwrap();
        assert_eq!(dataset.short_name.as_deref(), Some("person_data"));
    }

    #[test]
    fn test_wrong_shape_is_rejected_and_value_kept() {
        let mut dataset = Dataset {
            version: Some("1".to_string()),
            ..Default::default()
        };
        let error = apply_dataset_value(
            &mut dataset,
            DatasetIdentifier::Version,
            FieldValue::Bool(true),
        )
        .unwrap_err();
        assert!(error.to_string().contains("version"));
        assert_eq!(dataset.version.as_deref(), Some("1"));
    }

    #[test]
    fn test_inverted_date_assignment_is_rejected() {
        let mut dataset = Dataset {
            contains_data_from: Some(date(2024, 1, 1)),
            ..Default::default()
        };
        let error = apply_dataset_value(
            &mut dataset,
            DatasetIdentifier::ContainsDataUntil,
            FieldValue::Date(date(2023, 12, 31)),
        )
        .unwrap_err();
        assert!(matches!(error, DatadocError::IncorrectDateOrder { .. }));
        assert!(dataset.contains_data_until.is_none());
    }

    #[test]
    fn test_empty_clears_the_field() {
        let mut dataset = Dataset {
            owner: Some("703".to_string()),
            ..Default::default()
        };
        apply_dataset_value(&mut dataset, DatasetIdentifier::Owner, FieldValue::Empty).unwrap();
        assert!(dataset.owner.is_none());
    }

    #[test]
    fn test_language_field_counts_only_with_content() {
        let mut dataset = Dataset::default();
        assert!(!DatasetIdentifier::Name.is_set(&dataset));
        dataset.name = Some(LanguageStringType::from_single(LanguageCode::Nb, ""));
        assert!(!DatasetIdentifier::Name.is_set(&dataset));
        dataset.name = Some(LanguageStringType::from_single(
            LanguageCode::Nb,
            "Persondata",
        ));
        assert!(DatasetIdentifier::Name.is_set(&dataset));
    }

    #[test]
    fn test_variable_date_order_enforced() {
        let mut variable = Variable {
            contains_data_until: Some(date(2020, 6, 30)),
            ..Default::default()
        };
        let error = apply_variable_value(
            &mut variable,
            VariableIdentifier::ContainsDataFrom,
            FieldValue::Date(date(2021, 1, 1)),
        )
        .unwrap_err();
        assert!(matches!(error, DatadocError::IncorrectDateOrder { .. }));
        assert!(variable.contains_data_from.is_none());
    }
}
