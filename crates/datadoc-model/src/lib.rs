//! Datadoc Model Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Entity definitions for Datadoc metadata documents.
//!
//! # Overview
//!
//! This crate defines the data structures persisted in a Datadoc sidecar
//! document and shared across the workspace:
//!
//! - **Dataset**: dataset-level descriptive metadata
//! - **Variable**: per-column descriptive metadata
//! - **DatadocMetadata / MetadataContainer**: the on-disk document shapes
//! - **LanguageStringType**: multi-language string values
//! - **Enums**: closed vocabularies (dataset state, data type, roles, ...)
//!
//! The crate is pure data: serde derives and small accessors, no I/O.

pub mod enums;
pub mod lang;
pub mod model;

// Re-export commonly used types
pub use enums::{
    Assessment, DataSetState, DataSetStatus, DataType, IsPersonalData, TemporalityType,
    VariableRole,
};
pub use lang::{LanguageCode, LanguageStringType, LanguageStringTypeItem};
pub use model::{Dataset, DatadocMetadata, MetadataContainer, Variable};

/// The current version of the Datadoc document schema.
///
/// Documents declaring older versions are migrated forward by the
/// backwards-compatibility upgrader before being loaded into these models.
pub const DOCUMENT_VERSION: &str = "4.0.0";

/// The version of the outer container structure wrapping the datadoc
/// metadata alongside sibling namespaces such as pseudonymization.
pub const CONTAINER_VERSION: &str = "0.0.1";
