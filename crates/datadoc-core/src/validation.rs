//! Cross-field validation, defaults and completeness scoring.

use chrono::NaiveDate;
use datadoc_model::{
    Assessment, DataSetState, Dataset, IsPersonalData, Variable, VariableRole,
};
use uuid::Uuid;

use crate::constants::{OBLIGATORY_DATASET_METADATA, OBLIGATORY_VARIABLE_METADATA};
use crate::error::{DatadocError, Result};

/// True when the covered period is inverted.
///
/// An open start with a set end also counts as incorrect: a dataset cannot
/// end before it is known to begin.
pub fn incorrect_date_order(
    date_from: Option<NaiveDate>,
    date_until: Option<NaiveDate>,
) -> bool {
    match (date_from, date_until) {
        (None, Some(_)) => true,
        (Some(from), Some(until)) => until < from,
        _ => false,
    }
}

/// Enforce the date-order invariant on the dataset and every variable.
pub fn check_date_order(dataset: &Dataset, variables: &[Variable]) -> Result<()> {
    if incorrect_date_order(dataset.contains_data_from, dataset.contains_data_until) {
        return Err(DatadocError::incorrect_date_order("dataset"));
    }
    for variable in variables {
        if incorrect_date_order(variable.contains_data_from, variable.contains_data_until) {
            let context = variable.short_name.clone().unwrap_or_default();
            return Err(DatadocError::incorrect_date_order(format!(
                "variable {context}"
            )));
        }
    }
    Ok(())
}

/// Derive the sensitivity assessment from the processing state.
pub fn derive_assessment_from_state(state: DataSetState) -> Assessment {
    match state {
        DataSetState::SourceData => Assessment::Sensitive,
        DataSetState::InputData | DataSetState::ProcessedData | DataSetState::Statistics => {
            Assessment::Protected
        }
        DataSetState::OutputData => Assessment::Open,
    }
}

/// Fill in values every dataset must carry regardless of user input
pub fn set_default_values_dataset(dataset: &mut Dataset) {
    if dataset.id.is_none() {
        dataset.id = Some(Uuid::new_v4());
    }
    if dataset.contains_personal_data.is_none() {
        dataset.contains_personal_data = Some(false);
    }
}

/// Fill in values every variable must carry regardless of user input
pub fn set_default_values_variables(variables: &mut [Variable]) {
    for variable in variables {
        if variable.id.is_none() {
            variable.id = Some(Uuid::new_v4());
        }
        if variable.is_personal_data.is_none() {
            variable.is_personal_data = Some(IsPersonalData::NotPersonalData);
        }
        if variable.variable_role.is_none() {
            variable.variable_role = Some(VariableRole::Measure);
        }
    }
}

/// Propagate dataset-level values down to variables that have not set them.
///
/// Runs at save time so that late edits to the dataset still reach the
/// variables.
pub fn set_variables_inheritance(dataset: &Dataset, variables: &mut [Variable]) {
    for variable in variables {
        if variable.temporality_type.is_none() {
            variable.temporality_type = dataset.temporality_type;
        }
        if variable.data_source.is_none() {
            variable.data_source = dataset.data_source.clone();
        }
        if variable.contains_data_from.is_none() {
            variable.contains_data_from = dataset.contains_data_from;
        }
        if variable.contains_data_until.is_none() {
            variable.contains_data_until = dataset.contains_data_until;
        }
    }
}

/// Obligatory dataset fields currently missing a value
pub fn missing_obligatory_dataset_fields(dataset: &Dataset) -> Vec<String> {
    OBLIGATORY_DATASET_METADATA
        .iter()
        .filter(|identifier| !identifier.is_set(dataset))
        .map(|identifier| identifier.as_str().to_string())
        .collect()
}

/// Obligatory variable fields currently missing a value, grouped per
/// variable short name. Complete variables are omitted.
pub fn missing_obligatory_variable_fields(variables: &[Variable]) -> Vec<(String, Vec<String>)> {
    variables
        .iter()
        .filter_map(|variable| {
            let missing: Vec<String> = OBLIGATORY_VARIABLE_METADATA
                .iter()
                .filter(|identifier| !identifier.is_set(variable))
                .map(|identifier| identifier.as_str().to_string())
                .collect();
            if missing.is_empty() {
                None
            } else {
                Some((variable.short_name.clone().unwrap_or_default(), missing))
            }
        })
        .collect()
}

/// Integer percentage of completed over total, rounded half up
pub fn calculate_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let ratio = completed as f64 / total as f64;
    (ratio * 100.0).round() as u8
}

/// Percentage of obligatory fields filled in across the dataset and all
/// variables
pub fn percent_complete(dataset: &Dataset, variables: &[Variable]) -> u8 {
    let dataset_completed = OBLIGATORY_DATASET_METADATA
        .iter()
        .filter(|identifier| identifier.is_set(dataset))
        .count();
    let variables_completed: usize = variables
        .iter()
        .map(|variable| {
            OBLIGATORY_VARIABLE_METADATA
                .iter()
                .filter(|identifier| identifier.is_set(variable))
                .count()
        })
        .sum();

    let total = OBLIGATORY_DATASET_METADATA.len()
        + OBLIGATORY_VARIABLE_METADATA.len() * variables.len();
    calculate_percentage(dataset_completed + variables_completed, total)
}
