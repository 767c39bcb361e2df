//! Data access for file listings and file contents.
//!
//! The data server exposes two endpoints:
//! - `GET /data/files` returns a JSON array of file names
//! - `GET /data/<name>` returns the raw file body
//!
//! [`HttpDataSource`] talks to that server. [`FsDataSource`] serves the same
//! contract from a local directory and [`MemoryDataSource`] from memory.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use map_common::{FileName, ViewerError, ViewerResult};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

/// Source of the file listing and file bodies.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// All file names, in the order the source reports them.
    async fn list_files(&self) -> ViewerResult<Vec<FileName>>;

    /// Raw body of one file.
    async fn fetch(&self, file: &FileName) -> ViewerResult<Bytes>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Data source backed by the data server's HTTP endpoints.
pub struct HttpDataSource {
    client: Client,
    base_url: String,
}

impl HttpDataSource {
    /// Create a source for the server at `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> ViewerResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ViewerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn listing_url(&self) -> String {
        format!("{}/data/files", self.base_url)
    }

    /// File names are used verbatim; escaping is the server's concern.
    pub fn file_url(&self, file: &FileName) -> String {
        format!("{}/data/{}", self.base_url, file)
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    #[instrument(skip(self), fields(url = %self.listing_url()))]
    async fn list_files(&self) -> ViewerResult<Vec<FileName>> {
        let response = self
            .client
            .get(self.listing_url())
            .send()
            .await
            .map_err(|e| ViewerError::ListingFetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| ViewerError::ListingFetch(e.to_string()))?;

        let names: Vec<String> = response
            .json()
            .await
            .map_err(|e| ViewerError::ListingFetch(format!("expected a JSON array of names: {}", e)))?;

        debug!(count = names.len(), "Fetched file listing");
        Ok(names.into_iter().map(FileName::from).collect())
    }

    #[instrument(skip(self), fields(file = %file))]
    async fn fetch(&self, file: &FileName) -> ViewerResult<Bytes> {
        let content_error = |message: String| ViewerError::ContentFetch {
            file: file.to_string(),
            message,
        };

        let response = self
            .client
            .get(self.file_url(file))
            .send()
            .await
            .map_err(|e| content_error(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ViewerError::NotFound(file.to_string()));
        }

        let body = response
            .error_for_status()
            .map_err(|e| content_error(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| content_error(e.to_string()))?;

        debug!(bytes = body.len(), "Fetched file");
        Ok(body)
    }
}

// ============================================================================
// Filesystem
// ============================================================================

/// Data source reading a local data directory.
#[derive(Debug, Clone)]
pub struct FsDataSource {
    root: PathBuf,
}

impl FsDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a listing name to a path inside the root. Names that would
    /// escape the root are rejected.
    fn resolve(&self, file: &FileName) -> ViewerResult<PathBuf> {
        let relative = Path::new(file.as_str());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if file.is_empty() || escapes {
            return Err(ViewerError::ContentFetch {
                file: file.to_string(),
                message: "invalid file name".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DataSource for FsDataSource {
    async fn list_files(&self) -> ViewerResult<Vec<FileName>> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            ViewerError::ListingFetch(format!("{}: {}", self.root.display(), e))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ViewerError::ListingFetch(e.to_string()))?
        {
            if let Some(name) = entry.file_name().to_str() {
                names.push(FileName::from(name));
            }
        }

        // Directory order is platform dependent
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(names)
    }

    async fn fetch(&self, file: &FileName) -> ViewerResult<Bytes> {
        let path = self.resolve(file)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ViewerError::NotFound(file.to_string()))
            }
            Err(e) => Err(ViewerError::ContentFetch {
                file: file.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

// ============================================================================
// Memory
// ============================================================================

#[derive(Debug, Clone)]
struct MemoryFile {
    body: Bytes,
    delay: Option<Duration>,
}

/// In-memory data source. Files are listed in insertion order.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    order: RwLock<Vec<FileName>>,
    files: RwLock<HashMap<FileName, MemoryFile>>,
    listing_error: RwLock<Option<String>>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(self, name: impl Into<FileName>, body: impl Into<Bytes>) -> Self {
        self.insert(name, body);
        self
    }

    /// Add a file whose fetch completes only after `delay`.
    pub fn with_delayed_file(
        self,
        name: impl Into<FileName>,
        body: impl Into<Bytes>,
        delay: Duration,
    ) -> Self {
        self.insert_file(
            name.into(),
            MemoryFile {
                body: body.into(),
                delay: Some(delay),
            },
        );
        self
    }

    /// Make every listing request fail with `message`.
    pub fn with_listing_error(self, message: impl Into<String>) -> Self {
        if let Ok(mut error) = self.listing_error.write() {
            *error = Some(message.into());
        }
        self
    }

    pub fn insert(&self, name: impl Into<FileName>, body: impl Into<Bytes>) {
        self.insert_file(
            name.into(),
            MemoryFile {
                body: body.into(),
                delay: None,
            },
        );
    }

    fn insert_file(&self, name: FileName, file: MemoryFile) {
        if let (Ok(mut files), Ok(mut order)) = (self.files.write(), self.order.write()) {
            if files.insert(name.clone(), file).is_none() {
                order.push(name);
            }
        }
    }

    fn lock_error(what: &str) -> ViewerError {
        ViewerError::Io(format!("memory data source {} lock poisoned", what))
    }
}

#[async_trait]
impl DataSource for MemoryDataSource {
    async fn list_files(&self) -> ViewerResult<Vec<FileName>> {
        let listing_error = self
            .listing_error
            .read()
            .map_err(|_| Self::lock_error("listing"))?
            .clone();
        if let Some(message) = listing_error {
            return Err(ViewerError::ListingFetch(message));
        }

        let order = self.order.read().map_err(|_| Self::lock_error("order"))?;
        Ok(order.clone())
    }

    async fn fetch(&self, file: &FileName) -> ViewerResult<Bytes> {
        let entry = self
            .files
            .read()
            .map_err(|_| Self::lock_error("files"))?
            .get(file)
            .cloned();

        let entry = entry.ok_or_else(|| ViewerError::NotFound(file.to_string()))?;
        if let Some(delay) = entry.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(entry.body)
    }
}
