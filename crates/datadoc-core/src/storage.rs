//! Perform operations on files stored with a range of technologies.
//!
//! A [`StoragePath`] is selected by URI-scheme sniffing: plain paths (and
//! `file://` URIs) resolve to the local filesystem, `s3://`/`gs://` URIs to
//! an S3-compatible object store. Documents are whole-file reads and
//! rewrites; there is no partial-write or locking semantics.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aws_sdk_s3::primitives::ByteStream;
use tokio::sync::OnceCell;
use url::Url;

use crate::error::{DatadocError, Result};

/// A path to a dataset or metadata document, local or object-storage backed.
#[derive(Debug, Clone)]
pub enum StoragePath {
    /// A path on the local filesystem
    Local(PathBuf),
    /// An object in S3-compatible object storage
    Object(ObjectPath),
}

/// An object-storage location with a lazily constructed client.
///
/// The client is created on first I/O so that pure path manipulation never
/// touches credential resolution.
#[derive(Debug, Clone)]
pub struct ObjectPath {
    url: Url,
    client: Arc<OnceCell<aws_sdk_s3::Client>>,
}

impl ObjectPath {
    fn new(url: Url) -> Self {
        Self {
            url,
            client: Arc::new(OnceCell::new()),
        }
    }

    async fn client(&self) -> &aws_sdk_s3::Client {
        self.client
            .get_or_init(|| async {
                let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                aws_sdk_s3::Client::new(&config)
            })
            .await
    }

    fn bucket(&self) -> String {
        self.url.host_str().unwrap_or_default().to_string()
    }

    fn key(&self) -> String {
        self.url.path().trim_start_matches('/').to_string()
    }

    fn with_path(&self, new_path: &str) -> Self {
        let mut url = self.url.clone();
        url.set_path(new_path);
        Self {
            url,
            client: Arc::clone(&self.client),
        }
    }
}

impl StoragePath {
    /// Obtain a storage path for the given location, sniffing the scheme.
    pub fn for_path(path: &str) -> Result<Self> {
        if let Some((scheme, _)) = path.split_once("://") {
            match scheme {
                "file" => Ok(StoragePath::Local(PathBuf::from(
                    path.trim_start_matches("file://"),
                ))),
                "s3" | "gs" => {
                    let url = Url::parse(path)
                        .map_err(|_| DatadocError::UnsupportedStorageScheme(path.to_string()))?;
                    Ok(StoragePath::Object(ObjectPath::new(url)))
                }
                _ => Err(DatadocError::UnsupportedStorageScheme(path.to_string())),
            }
        } else {
            Ok(StoragePath::Local(PathBuf::from(path)))
        }
    }

    /// Return a locator string for this path
    pub fn location(&self) -> String {
        match self {
            StoragePath::Local(path) => path.display().to_string(),
            StoragePath::Object(object) => object.url.to_string(),
        }
    }

    /// Return the logical parent of this path
    pub fn parent(&self) -> StoragePath {
        match self {
            StoragePath::Local(path) => StoragePath::Local(
                path.parent().map(Path::to_path_buf).unwrap_or_default(),
            ),
            StoragePath::Object(object) => {
                let parent = PathBuf::from(object.url.path())
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                StoragePath::Object(object.with_path(&parent.to_string_lossy()))
            }
        }
    }

    /// Join a part onto this path
    pub fn join(&self, part: &str) -> StoragePath {
        match self {
            StoragePath::Local(path) => StoragePath::Local(path.join(part)),
            StoragePath::Object(object) => {
                let joined = PathBuf::from(object.url.path()).join(part);
                StoragePath::Object(object.with_path(&joined.to_string_lossy()))
            }
        }
    }

    /// The final path component without its last extension
    pub fn stem(&self) -> String {
        let file_name = match self {
            StoragePath::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            StoragePath::Object(object) => PathBuf::from(object.url.path())
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        match file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => file_name,
        }
    }

    /// Return true if the file or object exists.
    ///
    /// Failed object-storage lookups count as non-existence.
    pub async fn exists(&self) -> bool {
        match self {
            StoragePath::Local(path) => path.exists(),
            StoragePath::Object(object) => object
                .client()
                .await
                .head_object()
                .bucket(object.bucket())
                .key(object.key())
                .send()
                .await
                .is_ok(),
        }
    }

    /// Read the entire file as UTF-8 text
    pub async fn read_to_string(&self) -> Result<String> {
        match self {
            StoragePath::Local(path) => Ok(std::fs::read_to_string(path)?),
            StoragePath::Object(object) => {
                let response = object
                    .client()
                    .await
                    .get_object()
                    .bucket(object.bucket())
                    .key(object.key())
                    .send()
                    .await
                    .map_err(|e| DatadocError::object_storage(e.to_string()))?;
                let bytes = response
                    .body
                    .collect()
                    .await
                    .map_err(|e| DatadocError::object_storage(e.to_string()))?
                    .into_bytes();
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| DatadocError::object_storage(e.to_string()))
            }
        }
    }

    /// Write the given text, replacing any existing content
    pub async fn write_text(&self, text: &str) -> Result<()> {
        match self {
            StoragePath::Local(path) => Ok(std::fs::write(path, text)?),
            StoragePath::Object(object) => {
                object
                    .client()
                    .await
                    .put_object()
                    .bucket(object.bucket())
                    .key(object.key())
                    .body(ByteStream::from(text.as_bytes().to_vec()))
                    .send()
                    .await
                    .map_err(|e| DatadocError::object_storage(e.to_string()))?;
                Ok(())
            }
        }
    }
}
