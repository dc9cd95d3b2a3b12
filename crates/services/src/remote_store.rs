use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use storage::repository::{DocumentStore, StorageError};

use crate::config::RemoteStoreConfig;
use crate::error::RemoteStoreError;

/// Document store reached over HTTP: `GET {base_url}/{collection}/{id}`.
///
/// A 404 means the document does not exist; any other non-success status is an error.
#[derive(Clone)]
pub struct HttpDocumentStore {
    client: Client,
    config: RemoteStoreConfig,
}

impl HttpDocumentStore {
    #[must_use]
    pub fn new(config: RemoteStoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Build the request URL, escaping each segment.
    ///
    /// # Errors
    ///
    /// Returns `RemoteStoreError::InvalidPath` for blank segments, segments
    /// containing `/`, or a base URL that cannot carry a path.
    pub fn document_url(&self, collection: &str, id: &str) -> Result<Url, RemoteStoreError> {
        for segment in [collection, id] {
            if segment.trim().is_empty() || segment.contains('/') {
                return Err(RemoteStoreError::InvalidPath(format!("{collection}/{id}")));
            }
        }

        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteStoreError::InvalidPath(self.config.base_url.to_string()))?
            .pop_if_empty()
            .push(collection)
            .push(id);
        Ok(url)
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Value>, RemoteStoreError> {
        let url = self.document_url(collection, id)?;
        let mut request = self.client.get(url);
        if let Some(key) = self.config.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(RemoteStoreError::HttpStatus(status)),
        }
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, StorageError> {
        self.fetch(collection, id).await.map_err(|err| {
            tracing::error!(collection, id, error = %err, "remote document fetch failed");
            StorageError::from(err)
        })
    }
}
