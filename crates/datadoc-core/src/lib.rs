//! Datadoc Core
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Metadata document lifecycle management for datasets.
//!
//! # Overview
//!
//! This crate implements everything between a dataset file and its sidecar
//! metadata document:
//!
//! - **Engine**: the [`Datadoc`] session that loads, creates, merges,
//!   validates and saves documents
//! - **Path Info**: deriving state, version and covered period from the
//!   dataset naming convention
//! - **Compatibility**: upgrading documents written by any historical
//!   release to the current document version
//! - **Storage**: local filesystem and S3-compatible object storage
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use datadoc_core::{Config, Datadoc, DatadocPaths, StatisticSubjectMapping};
//!
//! # async fn document_dataset(
//! #     schema_source: Arc<dyn datadoc_core::SchemaSource>,
//! # ) -> datadoc_core::Result<()> {
//! let config = Config::from_env();
//! let subjects = Arc::new(StatisticSubjectMapping::new(
//!     config.statistical_subject_source_url.clone(),
//! ));
//! let mut session = Datadoc::open(
//!     config,
//!     subjects,
//!     Some(schema_source),
//!     DatadocPaths {
//!         dataset_path: Some("inndata/person_data_v1.parquet".to_string()),
//!         metadata_document_path: None,
//!     },
//!     false,
//! )
//! .await?;
//! let warnings = session.write_metadata_document().await?;
//! for warning in warnings {
//!     println!("{warning}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod compatibility;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod fields;
pub mod logging;
pub mod path_info;
pub mod schema;
pub mod storage;
pub mod subject;
pub mod user;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Datadoc, DatadocPaths};
pub use error::{DatadocError, MetadataWarning, Result};
pub use fields::{DatasetIdentifier, FieldValue, VariableIdentifier};
pub use path_info::DatasetPathInfo;
pub use schema::{SchemaField, SchemaSource};
pub use storage::StoragePath;
pub use subject::StatisticSubjectMapping;
