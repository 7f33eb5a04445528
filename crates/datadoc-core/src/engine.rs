//! The metadata document engine.
//!
//! A [`Datadoc`] is one documentation session for one dataset. Opening it
//! loads or creates the in-memory document: an existing sidecar document is
//! upgraded and loaded, a dataset file is schema-extracted, and when both
//! are present the two are reconciled by merging. Saving validates the
//! document, runs inheritance, embeds the completeness score and writes the
//! container back as pretty-printed JSON.

use std::sync::Arc;

use chrono::Utc;
use datadoc_model::{
    DataSetStatus, Dataset, DatadocMetadata, MetadataContainer, Variable, CONTAINER_VERSION,
    DOCUMENT_VERSION,
};
use serde_json::Value;

use crate::config::Config;
use crate::constants::{
    default_spatial_coverage_description, DATASET_FIELDS_FROM_EXISTING_METADATA,
    METADATA_DOCUMENT_FILE_SUFFIX,
};
use crate::error::{DatadocError, MetadataWarning, Result};
use crate::fields::{
    apply_dataset_value, apply_variable_value, DatasetIdentifier, FieldValue, VariableIdentifier,
};
use crate::path_info::DatasetPathInfo;
use crate::schema::SchemaSource;
use crate::storage::StoragePath;
use crate::subject::StatisticSubjectMapping;
use crate::user::get_user_name;
use crate::validation::{
    check_date_order, derive_assessment_from_state, missing_obligatory_dataset_fields,
    missing_obligatory_variable_fields, percent_complete, set_default_values_dataset,
    set_default_values_variables, set_variables_inheritance,
};
use crate::compatibility;

/// Where the document and dataset for a session live.
#[derive(Debug, Clone, Default)]
pub struct DatadocPaths {
    /// Path to the dataset file to document
    pub dataset_path: Option<String>,

    /// Explicit path to the metadata document. When absent it is derived
    /// from the dataset path.
    pub metadata_document_path: Option<String>,
}

/// One metadata documentation session.
#[derive(Debug)]
pub struct Datadoc {
    config: Config,
    subject_mapping: Arc<StatisticSubjectMapping>,
    dataset_path: Option<StoragePath>,
    metadata_document: Option<StoragePath>,
    pseudonymization: Option<Value>,
    errors_as_warnings: bool,

    /// Dataset-level metadata under edit
    pub dataset: Dataset,

    /// Per-variable metadata under edit, in column order
    pub variables: Vec<Variable>,

    /// Non-fatal findings from opening, e.g. lenient-merge inconsistencies
    pub merge_warnings: Vec<MetadataWarning>,
}

impl Datadoc {
    /// Open a documentation session.
    ///
    /// At least one of the two paths must be supplied. A metadata document
    /// path without a dataset path must point at an existing document.
    /// A dataset path alone reuses its sidecar document as the working
    /// state when one exists; merging with a fresh extraction happens only
    /// when both paths are supplied explicitly. With `errors_as_warnings`
    /// set, merge inconsistencies are collected in
    /// [`Datadoc::merge_warnings`] instead of aborting the open.
    pub async fn open(
        config: Config,
        subject_mapping: Arc<StatisticSubjectMapping>,
        schema_source: Option<Arc<dyn SchemaSource>>,
        paths: DatadocPaths,
        errors_as_warnings: bool,
    ) -> Result<Self> {
        let dataset_path = paths
            .dataset_path
            .as_deref()
            .map(StoragePath::for_path)
            .transpose()?;
        let explicit_document = paths
            .metadata_document_path
            .as_deref()
            .map(StoragePath::for_path)
            .transpose()?;

        if dataset_path.is_none() {
            if let Some(document) = &explicit_document {
                if !document.exists().await {
                    return Err(DatadocError::MetadataDocumentNotFound(document.location()));
                }
            }
        }

        let merge_with_existing = explicit_document.is_some();
        let metadata_document = explicit_document.or_else(|| {
            dataset_path.as_ref().map(|dataset| {
                dataset
                    .parent()
                    .join(&format!("{}{}", dataset.stem(), METADATA_DOCUMENT_FILE_SUFFIX))
            })
        });

        let mut session = Self {
            config,
            subject_mapping,
            dataset_path,
            metadata_document,
            pseudonymization: None,
            errors_as_warnings,
            dataset: Dataset::default(),
            variables: Vec::new(),
            merge_warnings: Vec::new(),
        };
        session
            .extract_metadata_from_files(schema_source, merge_with_existing)
            .await?;
        Ok(session)
    }

    async fn extract_metadata_from_files(
        &mut self,
        schema_source: Option<Arc<dyn SchemaSource>>,
        merge_with_existing: bool,
    ) -> Result<()> {
        let existing = match &self.metadata_document {
            Some(document) if document.exists().await => {
                self.load_existing_document(document.clone()).await?
            }
            _ => None,
        };

        match (&self.dataset_path, existing) {
            (Some(dataset_path), Some((existing_dataset, existing_variables)))
                if merge_with_existing =>
            {
                let dataset_path = dataset_path.clone();
                let (extracted_dataset, extracted_variables) = self
                    .extract_metadata_from_dataset(&dataset_path, schema_source)
                    .await?;
                self.merge(
                    extracted_dataset,
                    extracted_variables,
                    existing_dataset,
                    existing_variables,
                )?;
                // Saving the merged result to the supplied path would
                // overwrite the existing document, so the save target moves
                // next to the dataset.
                self.metadata_document = Some(dataset_path.parent().join(&format!(
                    "{}{}",
                    dataset_path.stem(),
                    METADATA_DOCUMENT_FILE_SUFFIX
                )));
            }
            (_, Some((dataset, variables))) => {
                self.dataset = dataset;
                self.variables = variables;
            }
            (Some(dataset_path), None) => {
                let dataset_path = dataset_path.clone();
                let (dataset, variables) = self
                    .extract_metadata_from_dataset(&dataset_path, schema_source)
                    .await?;
                self.dataset = dataset;
                self.variables = variables;
            }
            // No inputs: an empty placeholder session, no I/O
            (None, None) => {}
        }

        set_default_values_dataset(&mut self.dataset);
        set_default_values_variables(&mut self.variables);
        if self.dataset.assessment.is_none() {
            if let Some(state) = self.dataset.dataset_state {
                self.dataset.assessment = Some(derive_assessment_from_state(state));
            }
        }
        Ok(())
    }

    /// Load, upgrade and deserialize an existing metadata document.
    ///
    /// Structurally malformed JSON is deliberately treated as "no existing
    /// document": producing a usable in-memory document beats surfacing a
    /// parse error for a file the user may never have touched.
    async fn load_existing_document(
        &mut self,
        document: StoragePath,
    ) -> Result<Option<(Dataset, Vec<Variable>)>> {
        let text = document.read_to_string().await?;
        let raw: Value = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(
                    document = %document.location(),
                    %error,
                    "could not parse existing metadata document, starting fresh"
                );
                return Ok(None);
            }
        };

        let upgraded = compatibility::upgrade_metadata(raw)?;
        let container: MetadataContainer = serde_json::from_value(upgraded)?;
        self.pseudonymization = container.pseudonymization;
        Ok(container.datadoc.map(|datadoc| {
            (
                datadoc.dataset.unwrap_or_default(),
                datadoc.variables,
            )
        }))
    }

    async fn extract_metadata_from_dataset(
        &self,
        dataset_path: &StoragePath,
        schema_source: Option<Arc<dyn SchemaSource>>,
    ) -> Result<(Dataset, Vec<Variable>)> {
        let source = schema_source
            .ok_or_else(|| DatadocError::UnsupportedDatasetFile(dataset_path.location()))?;
        let fields = source.extract(dataset_path).await?;
        let variables: Vec<Variable> = fields.into_iter().map(Variable::from).collect();

        let location = dataset_path.location();
        let path_info = DatasetPathInfo::new(&location);
        let subject_field = match path_info.statistic_short_name() {
            Some(statistic) => self.subject_mapping.get_secondary_subject(&statistic).await,
            None => None,
        };

        let dataset = Dataset {
            short_name: path_info
                .dataset_short_name()
                .or_else(|| Some(dataset_path.stem())),
            dataset_state: path_info.dataset_state(),
            dataset_status: Some(DataSetStatus::Draft),
            version: path_info.dataset_version(),
            contains_data_from: path_info.contains_data_from(),
            contains_data_until: path_info.contains_data_until(),
            subject_field,
            spatial_coverage_description: Some(default_spatial_coverage_description()),
            file_path: Some(location),
            ..Default::default()
        };
        Ok((dataset, variables))
    }

    /// Reconcile a fresh extraction with an existing document.
    ///
    /// The extraction is the structural base: variable order, the variable
    /// set and data types follow the dataset file. The existing document
    /// supplies identity and everything descriptive. Variables present only
    /// in the existing document are dropped.
    fn merge(
        &mut self,
        extracted_dataset: Dataset,
        extracted_variables: Vec<Variable>,
        existing_dataset: Dataset,
        existing_variables: Vec<Variable>,
    ) -> Result<()> {
        let failures = consistency_failures(
            &extracted_dataset,
            &extracted_variables,
            &existing_dataset,
            &existing_variables,
        );
        if !failures.is_empty() {
            if self.errors_as_warnings {
                tracing::warn!(?failures, "merging inconsistent datasets");
                self.merge_warnings
                    .push(MetadataWarning::InconsistentDatasets { failures });
            } else {
                return Err(DatadocError::InconsistentDatasets(failures));
            }
        }

        let extracted_period = (
            extracted_dataset.contains_data_from,
            extracted_dataset.contains_data_until,
        );
        let mut dataset = extracted_dataset;
        dataset.id = existing_dataset.id;
        dataset.assessment = existing_dataset.assessment;
        dataset.version_description = existing_dataset.version_description.clone();
        dataset.metadata_created_date = existing_dataset.metadata_created_date;
        dataset.metadata_created_by = existing_dataset.metadata_created_by.clone();
        for identifier in DATASET_FIELDS_FROM_EXISTING_METADATA {
            copy_dataset_field(&existing_dataset, &mut dataset, identifier);
        }
        self.dataset = dataset;

        self.variables = extracted_variables
            .into_iter()
            .map(|extracted| {
                let existing = existing_variables
                    .iter()
                    .find(|candidate| candidate.short_name == extracted.short_name);
                match existing {
                    Some(existing) => {
                        let mut merged = existing.clone();
                        merged.data_type = extracted.data_type;
                        if merged.name.is_none() {
                            merged.name = extracted.name;
                        }
                        // A period derived from the new path overrides any
                        // per-variable period carried over from before
                        if extracted_period.0.is_some() || extracted_period.1.is_some() {
                            merged.contains_data_from = extracted_period.0;
                            merged.contains_data_until = extracted_period.1;
                        }
                        merged
                    }
                    None => extracted,
                }
            })
            .collect();
        Ok(())
    }

    /// Assign a value to a dataset field
    pub fn set_dataset_value(
        &mut self,
        identifier: DatasetIdentifier,
        value: FieldValue,
    ) -> Result<()> {
        apply_dataset_value(&mut self.dataset, identifier, value)
    }

    /// Assign a value to a field of the variable with the given short name
    pub fn set_variable_value(
        &mut self,
        short_name: &str,
        identifier: VariableIdentifier,
        value: FieldValue,
    ) -> Result<()> {
        let variable = self
            .variables
            .iter_mut()
            .find(|variable| variable.short_name.as_deref() == Some(short_name))
            .ok_or_else(|| DatadocError::invalid_field_value("short_name", short_name))?;
        apply_variable_value(variable, identifier, value)
    }

    /// Look up a variable by its short name
    pub fn variable(&self, short_name: &str) -> Option<&Variable> {
        self.variables
            .iter()
            .find(|variable| variable.short_name.as_deref() == Some(short_name))
    }

    /// Percentage of obligatory fields currently filled in
    pub fn percent_complete(&self) -> u8 {
        percent_complete(&self.dataset, &self.variables)
    }

    /// The location the document will be written to
    pub fn metadata_document_location(&self) -> Option<String> {
        self.metadata_document.as_ref().map(StoragePath::location)
    }
}

/// Name every structural difference between a fresh extraction and an
/// existing document.
fn consistency_failures(
    extracted_dataset: &Dataset,
    extracted_variables: &[Variable],
    existing_dataset: &Dataset,
    existing_variables: &[Variable],
) -> Vec<String> {
    let mut failures = Vec::new();

    let new_info = extracted_dataset
        .file_path
        .as_deref()
        .map(DatasetPathInfo::new);
    let existing_info = existing_dataset
        .file_path
        .as_deref()
        .map(DatasetPathInfo::new);
    if let (Some(new_info), Some(existing_info)) = (&new_info, &existing_info) {
        let new_bucket = extracted_dataset
            .file_path
            .as_deref()
            .and_then(DatasetPathInfo::bucket_name_from_uri);
        let existing_bucket = existing_dataset
            .file_path
            .as_deref()
            .and_then(DatasetPathInfo::bucket_name_from_uri);
        if new_bucket != existing_bucket {
            failures.push("Bucket names differ".to_string());
        }
        if new_info.statistic_short_name() != existing_info.statistic_short_name() {
            failures.push("Data product names differ".to_string());
        }
        if new_info.dataset_state() != existing_info.dataset_state() {
            failures.push("Dataset states differ".to_string());
        }
        if new_info.dataset_short_name() != existing_info.dataset_short_name() {
            failures.push("Dataset short names differ".to_string());
        }
    }

    for existing in existing_variables {
        let still_present = extracted_variables
            .iter()
            .any(|extracted| extracted.short_name == existing.short_name);
        if !still_present {
            failures.push(format!(
                "Existing metadata describes variable '{}' which is not present in the dataset",
                existing.short_name.as_deref().unwrap_or_default()
            ));
        }
    }
    for extracted in extracted_variables {
        match existing_variables
            .iter()
            .find(|existing| existing.short_name == extracted.short_name)
        {
            None => failures.push(format!(
                "Dataset contains new variable '{}'",
                extracted.short_name.as_deref().unwrap_or_default()
            )),
            Some(existing)
                if existing.data_type.is_some() && existing.data_type != extracted.data_type =>
            {
                failures.push(format!(
                    "Variable '{}' changed data type",
                    extracted.short_name.as_deref().unwrap_or_default()
                ));
            }
            Some(_) => {}
        }
    }
    failures
}

impl Datadoc {
    /// Validate and write the metadata document.
    ///
    /// Date-order violations abort the save. Missing obligatory metadata
    /// does not: the document is written as-is and the gaps are returned as
    /// warnings.
    pub async fn write_metadata_document(&mut self) -> Result<Vec<MetadataWarning>> {
        let document = self
            .metadata_document
            .clone()
            .ok_or(DatadocError::NoMetadataDocument)?;

        let now = Utc::now();
        let user = get_user_name(&self.config);
        if self.dataset.metadata_created_date.is_none() {
            self.dataset.metadata_created_date = Some(now);
        }
        if self.dataset.metadata_created_by.is_none() {
            self.dataset.metadata_created_by = Some(user.clone());
        }
        self.dataset.metadata_last_updated_date = Some(now);
        self.dataset.metadata_last_updated_by = Some(user);
        if let Some(dataset_path) = &self.dataset_path {
            self.dataset.file_path = Some(dataset_path.location());
        }

        set_variables_inheritance(&self.dataset, &mut self.variables);
        check_date_order(&self.dataset, &self.variables)?;

        let mut warnings = Vec::new();
        let missing_dataset = missing_obligatory_dataset_fields(&self.dataset);
        if !missing_dataset.is_empty() {
            warnings.push(MetadataWarning::IncompleteDataset {
                missing_fields: missing_dataset,
            });
        }
        let missing_variables = missing_obligatory_variable_fields(&self.variables);
        if !missing_variables.is_empty() {
            warnings.push(MetadataWarning::IncompleteVariables {
                missing_by_variable: missing_variables,
            });
        }

        let container = MetadataContainer {
            document_version: CONTAINER_VERSION.to_string(),
            datadoc: Some(DatadocMetadata {
                document_version: DOCUMENT_VERSION.to_string(),
                percentage_complete: Some(percent_complete(&self.dataset, &self.variables)),
                dataset: Some(self.dataset.clone()),
                variables: self.variables.clone(),
            }),
            pseudonymization: self.pseudonymization.clone(),
        };
        let text = serde_json::to_string_pretty(&container)?;
        document.write_text(&text).await?;
        tracing::info!(document = %document.location(), "wrote metadata document");
        Ok(warnings)
    }
}

fn copy_dataset_field(from: &Dataset, to: &mut Dataset, identifier: DatasetIdentifier) {
    match identifier {
        DatasetIdentifier::DatasetStatus => to.dataset_status = from.dataset_status,
        DatasetIdentifier::Name => to.name = from.name.clone(),
        DatasetIdentifier::Description => to.description = from.description.clone(),
        DatasetIdentifier::DataSource => to.data_source = from.data_source.clone(),
        DatasetIdentifier::PopulationDescription => {
            to.population_description = from.population_description.clone();
        }
        DatasetIdentifier::UnitType => to.unit_type = from.unit_type.clone(),
        DatasetIdentifier::TemporalityType => to.temporality_type = from.temporality_type,
        DatasetIdentifier::SubjectField => to.subject_field = from.subject_field.clone(),
        DatasetIdentifier::Keyword => to.keyword = from.keyword.clone(),
        DatasetIdentifier::SpatialCoverageDescription => {
            to.spatial_coverage_description = from.spatial_coverage_description.clone();
        }
        DatasetIdentifier::ContainsPersonalData => {
            to.contains_personal_data = from.contains_personal_data;
        }
        DatasetIdentifier::Owner => to.owner = from.owner.clone(),
        // Structural fields never come from the existing document
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use datadoc_model::DataType;

    #[test]
    fn test_copy_dataset_field_leaves_structural_fields_alone() {
        let from = Dataset {
            version: Some("2".to_string()),
            owner: Some("703".to_string()),
            ..Default::default()
        };
        let mut to = Dataset {
            version: Some("3".to_string()),
            ..Default::default()
        };
        copy_dataset_field(&from, &mut to, DatasetIdentifier::Owner);
        copy_dataset_field(&from, &mut to, DatasetIdentifier::Version);
        assert_eq!(to.owner.as_deref(), Some("703"));
        assert_eq!(to.version.as_deref(), Some("3"));
    }

    #[test]
    fn test_consistency_failures_name_every_difference() {
        let extracted_dataset = Dataset {
            file_path: Some(
                "gs://bucket-a/befolkning/inndata/person_data_v2.parquet".to_string(),
            ),
            ..Default::default()
        };
        let existing_dataset = Dataset {
            file_path: Some(
                "gs://bucket-b/sykefravr/klargjorte_data/person_data_v1.parquet".to_string(),
            ),
            ..Default::default()
        };
        let extracted_variables = vec![
            Variable {
                short_name: Some("fnr".to_string()),
                data_type: Some(DataType::Integer),
                ..Default::default()
            },
            Variable {
                short_name: Some("ny_kolonne".to_string()),
                ..Default::default()
            },
        ];
        let existing_variables = vec![
            Variable {
                short_name: Some("fnr".to_string()),
                data_type: Some(DataType::String),
                ..Default::default()
            },
            Variable {
                short_name: Some("borte".to_string()),
                ..Default::default()
            },
        ];

        let failures = consistency_failures(
            &extracted_dataset,
            &extracted_variables,
            &existing_dataset,
            &existing_variables,
        );
        assert!(failures.iter().any(|f| f.contains("Bucket names differ")));
        assert!(failures.iter().any(|f| f.contains("Data product names differ")));
        assert!(failures.iter().any(|f| f.contains("Dataset states differ")));
        assert!(failures.iter().any(|f| f.contains("'borte'")));
        assert!(failures.iter().any(|f| f.contains("'ny_kolonne'")));
        assert!(failures.iter().any(|f| f.contains("'fnr'")));
    }
}
