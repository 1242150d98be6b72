use crate::document_store::{DocumentSource, Query};
use crate::error::DashboardError;
use crate::resource_manager::{MemoryLoader, ResourceManager};

use bytes::Bytes;
use url::Url;

/// HTTP document source.
///
/// Implements [DocumentSource] for a hosted document database exposing collections over REST:
///
/// * `GET {base}/{collection}` returns all documents of the collection.
/// * `GET {base}/{collection}?field={field}&in={value}&in={value}...` returns the documents whose
///   field is one of the values.
#[derive(Debug)]
pub struct DocumentSourceHTTP {
    reqwest_client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl DocumentSourceHTTP {
    /// Create a new HTTP document source.
    ///
    /// # Arguments
    ///
    /// * `base_url`: URL under which the collections are served
    /// * `token`: Optional bearer token sent with every request
    pub fn new(base_url: Url, token: Option<String>) -> Result<Self, DashboardError> {
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::Configuration {
                message: format!("source URL {base_url} cannot be a base"),
            });
        }
        Ok(Self {
            reqwest_client: reqwest::Client::new(),
            base_url,
            token,
        })
    }

    /// Returns the URL of a query.
    pub fn url(&self, query: &Query) -> Url {
        let mut url = self.base_url.clone();
        // Checked in new().
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(query.collection);
        }
        if let Some(filter) = &query.filter {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("field", &filter.field);
            for value in &filter.values {
                pairs.append_pair("in", value);
            }
        }
        url
    }
}

impl DocumentSource for DocumentSourceHTTP {
    /// Fetch the documents matching a query.
    ///
    /// Returns the response body. Memory for the body is reserved from its Content-Length before
    /// the body is read, and responses without one are rejected.
    ///
    /// # Arguments
    ///
    /// * `query`: Query to run
    /// * `resource_manager`: ResourceManager object
    /// * `memory`: Memory reservations of the request
    #[tracing::instrument(level = "DEBUG", skip(self, resource_manager, memory))]
    async fn fetch(
        &self,
        query: &Query,
        resource_manager: &ResourceManager,
        memory: &MemoryLoader<'_>,
    ) -> Result<Bytes, DashboardError> {
        // Acquire connection permit to be freed via drop when this function returns
        let _conn_permits = resource_manager.source_connection().await?;
        let request = self.reqwest_client.get(self.url(query));
        let request = if let Some(token) = &self.token {
            request.bearer_auth(token)
        } else {
            request
        };
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(DashboardError::SourceStatus {
                collection: query.collection.to_string(),
                status: response.status().as_u16(),
            });
        }
        let content_length: usize = response
            .content_length()
            .ok_or_else(|| DashboardError::SourceContentLengthMissing {
                collection: query.collection.to_string(),
            })?
            .try_into()?;
        memory.reserve(content_length).await?;
        Ok(response.bytes().await?)
    }
}
