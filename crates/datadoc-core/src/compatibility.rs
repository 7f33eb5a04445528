//! Upgrade old metadata documents to the current document version.
//!
//! Existing metadata documents are never invalidated: a document written by
//! any historical release can still be opened. For each released breaking
//! change there is one handler that rewrites the raw JSON into the next
//! version's shape. Handlers are registered in [`SUPPORTED_VERSIONS`],
//! ordered oldest first, and upgrading applies every handler from the
//! document's declared version forward.
//!
//! Handlers operate on `serde_json::Value` rather than the typed model,
//! since by definition old documents do not fit the current types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::error::{DatadocError, Result};

type Handler = fn(Value) -> Result<Value>;

/// A document version supported with backwards compatibility.
pub struct BackwardsCompatibleVersion {
    /// The version string documents declare
    pub version: &'static str,
    /// Rewrites a document of this version into the next version's shape
    pub handler: Handler,
}

/// All supported document versions, ordered oldest to newest.
///
/// The last entry is the current version with an identity handler.
pub const SUPPORTED_VERSIONS: &[BackwardsCompatibleVersion] = &[
    BackwardsCompatibleVersion {
        version: "0.1.1",
        handler: handle_version_0_1_1,
    },
    BackwardsCompatibleVersion {
        version: "1.0.0",
        handler: handle_version_1_0_0,
    },
    BackwardsCompatibleVersion {
        version: "2.0.0",
        handler: handle_version_2_0_0,
    },
    BackwardsCompatibleVersion {
        version: "2.1.0",
        handler: handle_version_2_1_0,
    },
    BackwardsCompatibleVersion {
        version: "2.2.0",
        handler: handle_version_2_2_0,
    },
    BackwardsCompatibleVersion {
        version: "3.0.0",
        handler: handle_version_3_0_0,
    },
    BackwardsCompatibleVersion {
        version: "3.1.0",
        handler: handle_version_3_1_0,
    },
    BackwardsCompatibleVersion {
        version: "3.2.0",
        handler: handle_version_3_2_0,
    },
    BackwardsCompatibleVersion {
        version: "4.0.0",
        handler: handle_current_version,
    },
];

/// Detect whether a raw document uses the wrapped container structure.
///
/// This is a structural check, run before version extraction, since the
/// version field lives at different nesting depths across versions: a
/// container has a top-level `datadoc` key whose value is null or itself
/// holds a `dataset` key.
pub fn is_metadata_in_container_structure(metadata: &Value) -> bool {
    match metadata.get("datadoc") {
        Some(Value::Null) => true,
        Some(datadoc) => datadoc.get("dataset").is_some(),
        None => false,
    }
}

/// Upgrade a raw document to the current version.
///
/// Applies every registered handler from the document's declared version
/// onward. A version not present in the registry is fatal; the operator
/// must handle such documents manually.
pub fn upgrade_metadata(mut metadata: Value) -> Result<Value> {
    if is_metadata_in_container_structure(&metadata)
        && metadata.get("datadoc").is_some_and(Value::is_null)
    {
        // Container without a datadoc subtree, e.g. written by the
        // pseudonymization process alone. Nothing to upgrade.
        return Ok(metadata);
    }

    let supplied_version = declared_version(&metadata)?;
    let start = SUPPORTED_VERSIONS
        .iter()
        .position(|entry| entry.version == supplied_version)
        .ok_or_else(|| DatadocError::UnknownDocumentVersion(supplied_version.clone()))?;

    tracing::debug!(version = %supplied_version, "upgrading metadata document");
    for entry in &SUPPORTED_VERSIONS[start..] {
        metadata = (entry.handler)(metadata)?;
    }
    Ok(metadata)
}

fn declared_version(metadata: &Value) -> Result<String> {
    let holder = if is_metadata_in_container_structure(metadata) {
        metadata.get("datadoc").unwrap_or(&Value::Null)
    } else {
        metadata
    };
    holder
        .get("document_version")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(DatadocError::CouldNotReadMetadata)
}

// ============================================================================
// Version Handlers
// ============================================================================

fn object_mut<'a>(value: &'a mut Value, key: &str) -> Result<&'a mut Map<String, Value>> {
    value
        .get_mut(key)
        .and_then(Value::as_object_mut)
        .ok_or(DatadocError::CouldNotReadMetadata)
}

fn variables_mut(value: &mut Value) -> Result<&mut Vec<Value>> {
    value
        .get_mut("variables")
        .and_then(Value::as_array_mut)
        .ok_or(DatadocError::CouldNotReadMetadata)
}

/// v0.1.1: the `created_date` family was renamed to `metadata_created_date`
/// et al., and empty strings stopped being valid language-string values.
fn handle_version_0_1_1(mut metadata: Value) -> Result<Value> {
    let dataset = object_mut(&mut metadata, "dataset")?;
    let key_renaming = [
        ("metadata_created_date", "created_date"),
        ("metadata_created_by", "created_by"),
        ("metadata_last_updated_date", "last_updated_date"),
        ("metadata_last_updated_by", "last_updated_by"),
    ];
    for (new_key, old_key) in key_renaming {
        let value = dataset.remove(old_key).unwrap_or(Value::Null);
        dataset.insert(new_key.to_string(), value);
    }
    for value in dataset.values_mut() {
        if value.as_str() == Some("") {
            *value = Value::Null;
        }
    }
    metadata["document_version"] = json!("1.0.0");
    Ok(metadata)
}

/// v1.0.0: metadata timestamps became strict ISO-8601 UTC with second
/// precision, and `data_source` went from a bare string to a language
/// object.
fn handle_version_1_0_0(mut metadata: Value) -> Result<Value> {
    let dataset = object_mut(&mut metadata, "dataset")?;
    for field in ["metadata_created_date", "metadata_last_updated_date"] {
        if let Some(text) = dataset.get(field).and_then(Value::as_str) {
            dataset.insert(field.to_string(), normalize_timestamp(text));
        }
    }
    if let Some(text) = dataset.get("data_source").and_then(Value::as_str) {
        let text = text.to_string();
        dataset.insert("data_source".to_string(), json!({ "en": text }));
    }
    metadata["document_version"] = json!("2.0.0");
    Ok(metadata)
}

/// v2.0.0: `contains_data_from`/`contains_data_until` on the dataset and on
/// every variable were free text; they became strict ISO dates. Values that
/// do not start with a valid date are dropped.
fn handle_version_2_0_0(mut metadata: Value) -> Result<Value> {
    let fields = ["contains_data_from", "contains_data_until"];
    let dataset = object_mut(&mut metadata, "dataset")?;
    for field in fields {
        if let Some(value) = dataset.get_mut(field) {
            *value = normalize_date(value);
        }
    }
    for variable in variables_mut(&mut metadata)? {
        for field in fields {
            if let Some(value) = variable.get_mut(field) {
                *value = normalize_date(value);
            }
        }
    }
    metadata["document_version"] = json!("2.1.0");
    Ok(metadata)
}

/// v2.1.0: the obsolete fields `register_uri` and `data_source_path` were
/// removed from the dataset, and `sentinel_value_uri` from variables.
fn handle_version_2_1_0(mut metadata: Value) -> Result<Value> {
    let dataset = object_mut(&mut metadata, "dataset")?;
    dataset.remove("register_uri");
    dataset.remove("data_source_path");
    for variable in variables_mut(&mut metadata)? {
        if let Some(map) = variable.as_object_mut() {
            map.remove("sentinel_value_uri");
        }
    }
    metadata["document_version"] = json!("2.2.0");
    Ok(metadata)
}

/// v2.2.0: the flat document was wrapped in a container so that sibling
/// processes (pseudonymization) can share the file.
fn handle_version_2_2_0(mut metadata: Value) -> Result<Value> {
    metadata["document_version"] = json!("3.0.0");
    Ok(json!({
        "document_version": "0.0.1",
        "datadoc": metadata,
        "pseudonymization": null,
    }))
}

/// Dataset fields holding language strings in pre-3.0.0 documents.
/// `subject_field` was still a language string at this point.
const DATASET_LANGUAGE_FIELDS: &[&str] = &[
    "name",
    "description",
    "data_source",
    "population_description",
    "version_description",
    "subject_field",
    "spatial_coverage_description",
];

const VARIABLE_LANGUAGE_FIELDS: &[&str] = &[
    "name",
    "data_source",
    "population_description",
    "comment",
    "measurement_unit",
    "invalid_value_description",
];

/// v3.0.0: language strings changed serialization from a map of language
/// code to text into a list of `{languageCode, languageText}` records.
fn handle_version_3_0_0(mut metadata: Value) -> Result<Value> {
    let datadoc = metadata
        .get_mut("datadoc")
        .ok_or(DatadocError::CouldNotReadMetadata)?;
    let dataset = object_mut(datadoc, "dataset")?;
    for field in DATASET_LANGUAGE_FIELDS {
        if let Some(value) = dataset.get_mut(*field) {
            *value = convert_language_map(value.take());
        }
    }
    for variable in variables_mut(datadoc)? {
        for field in VARIABLE_LANGUAGE_FIELDS {
            if let Some(value) = variable.get_mut(*field) {
                *value = convert_language_map(value.take());
            }
        }
    }
    datadoc["document_version"] = json!("3.1.0");
    Ok(metadata)
}

/// v3.1.0: the `direct_person_identifying` boolean on variables was
/// replaced with the `is_personal_data` enumeration. A directly person
/// identifying variable is by definition not pseudonymised.
fn handle_version_3_1_0(mut metadata: Value) -> Result<Value> {
    let datadoc = metadata
        .get_mut("datadoc")
        .ok_or(DatadocError::CouldNotReadMetadata)?;
    for variable in variables_mut(datadoc)? {
        if let Some(map) = variable.as_object_mut() {
            let direct = map
                .remove("direct_person_identifying")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let is_personal_data = if direct {
                "NON_PSEUDONYMISED_ENCRYPTED_PERSONAL_DATA"
            } else {
                "NOT_PERSONAL_DATA"
            };
            map.insert("is_personal_data".to_string(), json!(is_personal_data));
        }
    }
    datadoc["document_version"] = json!("3.2.0");
    Ok(metadata)
}

/// v3.2.0: `subject_field` on the dataset went from a language string to a
/// plain classification code. The first non-empty language text wins.
fn handle_version_3_2_0(mut metadata: Value) -> Result<Value> {
    let datadoc = metadata
        .get_mut("datadoc")
        .ok_or(DatadocError::CouldNotReadMetadata)?;
    let dataset = object_mut(datadoc, "dataset")?;
    if let Some(value) = dataset.get_mut("subject_field") {
        let code = value
            .as_array()
            .and_then(|items| {
                items.iter().find_map(|item| {
                    item.get("languageText")
                        .and_then(Value::as_str)
                        .filter(|text| !text.is_empty())
                        .map(str::to_string)
                })
            })
            .map_or(Value::Null, Value::String);
        *value = code;
    }
    datadoc["document_version"] = json!("4.0.0");
    Ok(metadata)
}

/// Nothing to do here.
fn handle_current_version(metadata: Value) -> Result<Value> {
    Ok(metadata)
}

// ============================================================================
// Conversion Helpers
// ============================================================================

/// Re-serialize a historical timestamp as strict ISO-8601 UTC with second
/// precision. Naive timestamps are taken to be UTC. Unparseable values are
/// passed through untouched.
fn normalize_timestamp(text: &str) -> Value {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return json!(parsed
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, false));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return json!(naive
                .and_utc()
                .to_rfc3339_opts(SecondsFormat::Secs, false));
        }
    }
    json!(text)
}

/// Cast a free-text date to a strict ISO date, or null when the leading
/// characters do not form one.
fn normalize_date(value: &Value) -> Value {
    let Some(text) = value.as_str() else {
        return value.clone();
    };
    text.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map_or(Value::Null, |date| json!(date.format("%Y-%m-%d").to_string()))
}

/// Convert a map-of-code-to-text language string into the list-of-records
/// serialization. Codes with null text are dropped; non-map values pass
/// through untouched.
fn convert_language_map(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    let items: Vec<Value> = map
        .into_iter()
        .filter_map(|(code, text)| {
            text.as_str().map(|text| {
                json!({ "languageCode": code, "languageText": text })
            })
        })
        .collect();
    Value::Array(items)
}
