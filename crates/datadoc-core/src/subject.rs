//! Map statistic short names to statistical subject codes.
//!
//! The subject taxonomy lives in an external service. Fetching it can take
//! seconds, so the request is dispatched on a background task the moment
//! the mapping is constructed and only joined when the first lookup needs
//! the result. A failed fetch degrades to "no subject found"; it never
//! blocks documenting a dataset.

use serde::Deserialize;
use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinHandle;

/// A secondary subject grouping a set of statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct SecondarySubject {
    /// Classification code, e.g. "al03"
    pub subject_code: String,

    /// Short names of the statistics belonging to this subject
    #[serde(default)]
    pub statistic_short_names: Vec<String>,
}

/// A primary subject area with its secondary subjects.
#[derive(Debug, Clone, Deserialize)]
pub struct PrimarySubject {
    /// Classification code, e.g. "al"
    pub subject_code: String,

    #[serde(default)]
    pub secondary_subjects: Vec<SecondarySubject>,
}

#[derive(Debug, Deserialize)]
struct SubjectStructure {
    #[serde(default)]
    primary_subjects: Vec<PrimarySubject>,
}

/// Lazily resolved mapping from statistic short name to subject code.
#[derive(Debug)]
pub struct StatisticSubjectMapping {
    fetch: Mutex<Option<JoinHandle<Option<Vec<PrimarySubject>>>>>,
    primary_subjects: OnceCell<Option<Vec<PrimarySubject>>>,
}

impl StatisticSubjectMapping {
    /// Create the mapping and start fetching the subject structure in the
    /// background.
    pub fn new(source_url: String) -> Self {
        let handle = tokio::spawn(async move { fetch_subject_structure(&source_url).await });
        Self {
            fetch: Mutex::new(Some(handle)),
            primary_subjects: OnceCell::new(),
        }
    }

    /// Look up the secondary subject code for a statistic short name.
    ///
    /// Waits for the background fetch on first call. Returns `None` when
    /// the statistic is unknown or the subject source was unreachable.
    pub async fn get_secondary_subject(&self, statistic_short_name: &str) -> Option<String> {
        let subjects = self
            .primary_subjects
            .get_or_init(|| async {
                let handle = self.fetch.lock().await.take()?;
                match handle.await {
                    Ok(result) => result,
                    Err(error) => {
                        tracing::warn!(%error, "subject structure fetch task failed");
                        None
                    }
                }
            })
            .await
            .as_ref()?;

        subjects
            .iter()
            .flat_map(|primary| &primary.secondary_subjects)
            .find(|secondary| {
                secondary
                    .statistic_short_names
                    .iter()
                    .any(|name| name == statistic_short_name)
            })
            .map(|secondary| secondary.subject_code.clone())
    }
}

async fn fetch_subject_structure(source_url: &str) -> Option<Vec<PrimarySubject>> {
    tracing::debug!(url = source_url, "fetching statistical subject structure");
    let response = match reqwest::get(source_url).await.and_then(|r| r.error_for_status()) {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(%error, "could not fetch statistical subject structure");
            return None;
        }
    };
    match response.json::<SubjectStructure>().await {
        Ok(structure) => Some(structure.primary_subjects),
        Err(error) => {
            tracing::warn!(%error, "could not parse statistical subject structure");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn subject_structure_body() -> serde_json::Value {
        serde_json::json!({
            "primary_subjects": [
                {
                    "subject_code": "al",
                    "secondary_subjects": [
                        {
                            "subject_code": "al03",
                            "statistic_short_names": ["aku", "akumnd"],
                        },
                    ],
                },
                {
                    "subject_code": "be",
                    "secondary_subjects": [
                        {
                            "subject_code": "be01",
                            "statistic_short_names": ["befolkning"],
                        },
                    ],
                },
            ],
        })
    }

    #[tokio::test]
    async fn test_lookup_finds_secondary_subject() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(subject_structure_body()))
            .mount(&server)
            .await;

        let mapping = StatisticSubjectMapping::new(server.uri());
        assert_eq!(
            mapping.get_secondary_subject("befolkning").await.as_deref(),
            Some("be01")
        );
        assert_eq!(
            mapping.get_secondary_subject("aku").await.as_deref(),
            Some("al03")
        );
        assert_eq!(mapping.get_secondary_subject("ukjent").await, None);
    }

    #[tokio::test]
    async fn test_unreachable_source_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mapping = StatisticSubjectMapping::new(server.uri());
        assert_eq!(mapping.get_secondary_subject("befolkning").await, None);
    }

    #[tokio::test]
    async fn test_malformed_body_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let mapping = StatisticSubjectMapping::new(server.uri());
        assert_eq!(mapping.get_secondary_subject("befolkning").await, None);
    }
}
