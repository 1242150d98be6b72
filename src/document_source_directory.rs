use crate::document_store::{DocumentSource, Query};
use crate::error::DashboardError;
use crate::resource_manager::{MemoryLoader, ResourceManager};

use bytes::Bytes;
use expanduser::expanduser;
use serde_json::Value;
use std::path::PathBuf;

/// Directory document source.
///
/// Implements [DocumentSource] for a local directory holding one `<collection>.json` file per
/// collection, each a JSON array of documents. Used for development and testing against exported
/// collections.
#[derive(Debug)]
pub struct DocumentSourceDirectory {
    path: PathBuf,
}

impl DocumentSourceDirectory {
    /// Create a new directory document source.
    ///
    /// A leading `~` in the path is expanded to the user's home directory.
    pub fn new(path: &str) -> Result<Self, DashboardError> {
        let path = expanduser(path)?;
        if !path.is_dir() {
            return Err(DashboardError::Configuration {
                message: format!("source directory {} does not exist", path.display()),
            });
        }
        Ok(Self { path })
    }
}

impl DocumentSource for DocumentSourceDirectory {
    /// Fetch the documents matching a query.
    ///
    /// Memory for the whole collection file is reserved before it is read. Filtered queries
    /// decode the file and return the matching documents only.
    #[tracing::instrument(level = "DEBUG", skip(self, resource_manager, memory))]
    async fn fetch(
        &self,
        query: &Query,
        resource_manager: &ResourceManager,
        memory: &MemoryLoader<'_>,
    ) -> Result<Bytes, DashboardError> {
        let _conn_permits = resource_manager.source_connection().await?;
        let file = self.path.join(format!("{}.json", query.collection));
        let length = tokio::fs::metadata(&file).await?.len();
        memory.reserve(length.try_into()?).await?;
        let data = tokio::fs::read(&file).await?;
        let Some(filter) = &query.filter else {
            return Ok(Bytes::from(data));
        };
        let decode_error = |error| DashboardError::SourceDecode {
            collection: query.collection.to_string(),
            error,
        };
        let documents: Vec<Value> = serde_json::from_slice(&data).map_err(decode_error)?;
        let selected: Vec<&Value> = documents
            .iter()
            .filter(|document| filter.matches(document))
            .collect();
        let data = serde_json::to_vec(&selected).map_err(decode_error)?;
        Ok(Bytes::from(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory() {
        let result = DocumentSourceDirectory::new("/this/path/does/not/exist");
        assert!(matches!(
            result,
            Err(DashboardError::Configuration { message: _ })
        ));
    }

    #[tokio::test]
    async fn test_fetch_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("claims.json"),
            br#"[{"id": "c1", "villageId": "v1"}, {"id": "c2", "villageId": "v2"}]"#,
        )
        .unwrap();
        let source = DocumentSourceDirectory::new(dir.path().to_str().unwrap()).unwrap();
        let rm = ResourceManager::new(None, None, None);
        let memory = rm.memory_loader().await;
        let query = Query::field_in("claims", "villageId", vec!["v2".to_string()]);
        let data = source.fetch(&query, &rm, &memory).await.unwrap();
        let documents: Vec<Value> = serde_json::from_slice(&data).unwrap();
        assert_eq!(vec![serde_json::json!({"id": "c2", "villageId": "v2"})], documents);
        // The whole file is read, so the whole file is reserved.
        assert_eq!(66, memory.finish().bytes());
    }

    #[tokio::test]
    async fn test_fetch_unfiltered_is_raw() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("villages.json"), b"[ ]").unwrap();
        let source = DocumentSourceDirectory::new(dir.path().to_str().unwrap()).unwrap();
        let rm = ResourceManager::new(None, None, None);
        let memory = rm.memory_loader().await;
        let data = source
            .fetch(&Query::all("villages"), &rm, &memory)
            .await
            .unwrap();
        assert_eq!(Bytes::from_static(b"[ ]"), data);
    }

    #[tokio::test]
    async fn test_fetch_exceeds_memory_limit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("villages.json"), b"[ ]").unwrap();
        let source = DocumentSourceDirectory::new(dir.path().to_str().unwrap()).unwrap();
        let rm = ResourceManager::new(None, Some(2), None);
        let memory = rm.memory_loader().await;
        let result = source.fetch(&Query::all("villages"), &rm, &memory).await;
        assert!(matches!(
            result,
            Err(DashboardError::InsufficientMemory {
                requested: 3,
                total: 2
            })
        ));
    }
}
