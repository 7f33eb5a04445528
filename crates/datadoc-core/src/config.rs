//! Configuration for the Datadoc core.
//!
//! All configuration is sourced from environment variables (optionally via
//! a `.env` file). The hosting platform injects the Dapla variables; the
//! subject source URL points at the statistical classification registry.

use serde::{Deserialize, Serialize};

/// Default source for the statistical subject structure.
pub const DEFAULT_STATISTICAL_SUBJECT_SOURCE_URL: &str =
    "https://www.ssb.no/xp/_/service/mimir/subjectStructurStatistics";

/// Environment-derived configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// URL of the statistical subject source
    pub statistical_subject_source_url: String,

    /// Dapla region identifier, e.g. "DAPLA_LAB"
    pub dapla_region: Option<String>,

    /// Dapla service identifier, e.g. "JUPYTERLAB"
    pub dapla_service: Option<String>,

    /// Username injected by JupyterHub
    pub jupyterhub_user: Option<String>,

    /// OIDC token injected by the platform, used for identity resolution
    pub oidc_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            statistical_subject_source_url: std::env::var("DATADOC_STATISTICAL_SUBJECT_SOURCE_URL")
                .unwrap_or_else(|_| DEFAULT_STATISTICAL_SUBJECT_SOURCE_URL.to_string()),
            dapla_region: std::env::var("DAPLA_REGION").ok(),
            dapla_service: std::env::var("DAPLA_SERVICE").ok(),
            jupyterhub_user: std::env::var("JUPYTERHUB_USER").ok(),
            oidc_token: std::env::var("OIDC_TOKEN").ok(),
        }
    }
}
