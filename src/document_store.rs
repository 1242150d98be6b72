use crate::cli::{CommandLineArgs, SourceKind};
use crate::collection_cache::CollectionCache;
use crate::dataset::Dataset;
use crate::document_source_directory::DocumentSourceDirectory;
use crate::document_source_http::DocumentSourceHTTP;
use crate::error::DashboardError;
use crate::metrics::SOURCE_DOCUMENTS;
use crate::resource_manager::{MemoryLoader, ResourceManager};
use crate::types::{Claim, Document, Innovation, Innovator, Village};

use bytes::Bytes;
use serde_json::Value;

/// Filter selecting documents whose field value is one of a list.
#[derive(Clone, Debug, PartialEq)]
pub struct InFilter {
    /// Document field, as named in the stored documents (e.g. `villageId`)
    pub field: String,
    pub values: Vec<String>,
}

impl InFilter {
    /// Whether a raw JSON document matches the filter.
    ///
    /// Strings are compared as is, numbers and booleans by their JSON representation.
    pub fn matches(&self, document: &Value) -> bool {
        let value = match document.get(&self.field) {
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            Some(Value::Bool(value)) => value.to_string(),
            _ => return false,
        };
        self.values.contains(&value)
    }
}

/// A read query against one collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub collection: &'static str,
    pub filter: Option<InFilter>,
}

impl Query {
    /// Query all documents of a collection.
    pub fn all(collection: &'static str) -> Self {
        Self {
            collection,
            filter: None,
        }
    }

    /// Query the documents of a collection whose field is one of the values.
    pub fn field_in(collection: &'static str, field: &str, values: Vec<String>) -> Self {
        Self {
            collection,
            filter: Some(InFilter {
                field: field.to_string(),
                values,
            }),
        }
    }

    /// Key identifying the query in the collection cache.
    pub fn cache_key(&self) -> String {
        match &self.filter {
            None => self.collection.to_string(),
            Some(filter) => format!(
                "{}?{}=in:{}",
                self.collection,
                filter.field,
                filter.values.join("\u{1f}")
            ),
        }
    }
}

/// Document source trait.
///
/// Defines the interface for document sources. A source returns the matching documents of a
/// query as the raw bytes of a JSON array. Sources reserve memory for the bytes they read before
/// reading them.
pub trait DocumentSource {
    /// Fetch the documents matching a query.
    ///
    /// # Arguments
    ///
    /// * `query`: Query to run
    /// * `resource_manager`: ResourceManager object
    /// * `memory`: Memory reservations of the request
    fn fetch(
        &self,
        query: &Query,
        resource_manager: &ResourceManager,
        memory: &MemoryLoader<'_>,
    ) -> impl std::future::Future<Output = Result<Bytes, DashboardError>> + Send;
}

/// Configured document source.
#[derive(Debug)]
enum Backend {
    Http(DocumentSourceHTTP),
    Directory(DocumentSourceDirectory),
}

/// Document store.
///
/// Runs queries against the configured document source, through the collection cache when it is
/// enabled, and decodes the returned documents.
#[derive(Debug)]
pub struct DocumentStore {
    backend: Backend,
    /// Maximum number of values per `in` query
    in_query_chunk_size: usize,
    collection_cache: Option<CollectionCache>,
}

impl DocumentStore {
    /// Initialize the document store.
    ///
    /// # Arguments
    ///
    /// * `args`: Command line arguments
    pub fn new(args: &CommandLineArgs) -> Result<Self, DashboardError> {
        let backend = match args.source_kind {
            SourceKind::Http => {
                let url = args
                    .source_url
                    .clone()
                    .ok_or_else(|| DashboardError::Configuration {
                        message: "the source URL must be specified for the HTTP source".to_string(),
                    })?;
                Backend::Http(DocumentSourceHTTP::new(url, args.source_token.clone())?)
            }
            SourceKind::Directory => {
                let path = args
                    .source_dir
                    .as_ref()
                    .ok_or_else(|| DashboardError::Configuration {
                        message: "the source directory must be specified for the directory source"
                            .to_string(),
                    })?;
                Backend::Directory(DocumentSourceDirectory::new(path)?)
            }
        };
        let collection_cache = if args.use_collection_cache {
            Some(CollectionCache::from_args(args))
        } else {
            None
        };
        Ok(Self {
            backend,
            in_query_chunk_size: usize::from(args.in_query_chunk_size),
            collection_cache,
        })
    }

    /// Create a document store reading from a directory.
    pub fn directory(
        source: DocumentSourceDirectory,
        in_query_chunk_size: usize,
        collection_cache: Option<CollectionCache>,
    ) -> Self {
        Self {
            backend: Backend::Directory(source),
            in_query_chunk_size: in_query_chunk_size.max(1),
            collection_cache,
        }
    }

    /// Remove all responses from the collection cache, if enabled.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.collection_cache {
            cache.clear();
        }
    }

    /// Fetch all documents of a collection.
    #[tracing::instrument(level = "DEBUG", skip(self, resource_manager, memory), fields(collection = T::COLLECTION))]
    pub async fn fetch_all<T: Document>(
        &self,
        resource_manager: &ResourceManager,
        memory: &MemoryLoader<'_>,
    ) -> Result<Vec<T>, DashboardError> {
        let query = Query::all(T::COLLECTION);
        let data = self.get(&query, resource_manager, memory).await?;
        decode(T::COLLECTION, &data)
    }

    /// Fetch the documents of a collection whose field is one of the values.
    ///
    /// The values are deduplicated and split into `in` queries of at most the configured chunk
    /// size, which are issued one after the other.
    #[tracing::instrument(level = "DEBUG", skip(self, values, resource_manager, memory), fields(collection = T::COLLECTION))]
    pub async fn fetch_where<T: Document>(
        &self,
        field: &str,
        values: Vec<String>,
        resource_manager: &ResourceManager,
        memory: &MemoryLoader<'_>,
    ) -> Result<Vec<T>, DashboardError> {
        let mut values = values;
        values.sort();
        values.dedup();
        let mut documents = Vec::new();
        for chunk in values.chunks(self.in_query_chunk_size) {
            let query = Query::field_in(T::COLLECTION, field, chunk.to_vec());
            let data = self.get(&query, resource_manager, memory).await?;
            documents.extend(decode::<T>(T::COLLECTION, &data)?);
        }
        Ok(documents)
    }

    /// Fetch all collections into a [Dataset].
    ///
    /// The dataset holds the memory reserved for the responses until it is dropped.
    #[tracing::instrument(level = "DEBUG", skip(self, resource_manager))]
    pub async fn dataset(
        &self,
        resource_manager: &ResourceManager,
    ) -> Result<Dataset, DashboardError> {
        let memory = resource_manager.memory_loader().await;
        let (villages, innovators, innovations, claims) = tokio::try_join!(
            self.fetch_all::<Village>(resource_manager, &memory),
            self.fetch_all::<Innovator>(resource_manager, &memory),
            self.fetch_all::<Innovation>(resource_manager, &memory),
            self.fetch_all::<Claim>(resource_manager, &memory),
        )?;
        let dataset = Dataset::new(villages, innovators, innovations, claims);
        Ok(dataset.with_memory(memory.finish()))
    }

    /// Run a query, checking the collection cache first.
    ///
    /// Cached responses are reserved against the request's memory like fetched ones.
    async fn get(
        &self,
        query: &Query,
        resource_manager: &ResourceManager,
        memory: &MemoryLoader<'_>,
    ) -> Result<Bytes, DashboardError> {
        let Some(cache) = &self.collection_cache else {
            return self.fetch(query, resource_manager, memory).await;
        };
        let key = query.cache_key();
        if let Some(data) = cache.get(query.collection, &key) {
            memory.reserve(data.len()).await?;
            return Ok(data);
        }
        let data = self.fetch(query, resource_manager, memory).await?;
        cache.set(&key, data.clone());
        Ok(data)
    }

    /// Dispatch a query to the configured source.
    async fn fetch(
        &self,
        query: &Query,
        resource_manager: &ResourceManager,
        memory: &MemoryLoader<'_>,
    ) -> Result<Bytes, DashboardError> {
        match &self.backend {
            Backend::Http(source) => source.fetch(query, resource_manager, memory).await,
            Backend::Directory(source) => source.fetch(query, resource_manager, memory).await,
        }
    }
}

/// Decode a JSON array of documents.
fn decode<T: Document>(collection: &str, data: &Bytes) -> Result<Vec<T>, DashboardError> {
    let documents: Vec<T> =
        serde_json::from_slice(data).map_err(|error| DashboardError::SourceDecode {
            collection: collection.to_string(),
            error,
        })?;
    SOURCE_DOCUMENTS
        .with_label_values(&[collection])
        .inc_by(documents.len() as u64);
    Ok(documents)
}
