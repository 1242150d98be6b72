use crate::cli::CommandLineArgs;
use crate::document_store::DocumentStore;
use crate::error::DashboardError;
use crate::resource_manager::ResourceManager;

use byte_unit::Byte;
use std::sync::Arc;

/// Shared application state passed to each request handler.
#[derive(Debug)]
pub struct AppState {
    /// Command line arguments.
    pub args: CommandLineArgs,

    /// Resource manager.
    pub resource_manager: ResourceManager,

    /// Document store.
    pub document_store: DocumentStore,
}

impl AppState {
    /// Create and return an [AppState].
    pub fn new(args: &CommandLineArgs) -> Result<Self, DashboardError> {
        Self::with_store(args, DocumentStore::new(args)?)
    }

    /// Create an [AppState] around an existing document store.
    pub fn with_store(
        args: &CommandLineArgs,
        document_store: DocumentStore,
    ) -> Result<Self, DashboardError> {
        let task_limit = args
            .thread_limit
            .or_else(|| Some(num_cpus::get().saturating_sub(1).max(1)));
        let memory_limit = args
            .memory_limit
            .as_deref()
            .map(parse_memory_limit)
            .transpose()?;
        let resource_manager =
            ResourceManager::new(args.connection_limit, memory_limit, task_limit);

        Ok(Self {
            args: args.clone(),
            resource_manager,
            document_store,
        })
    }
}

/// Parse a human readable memory size such as "512 MiB" into bytes.
fn parse_memory_limit(limit: &str) -> Result<usize, DashboardError> {
    let bytes = Byte::parse_str(limit, true).map_err(|err| DashboardError::Configuration {
        message: format!("invalid memory limit {limit:?}: {err}"),
    })?;
    Ok(usize::try_from(bytes.as_u64())?)
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
