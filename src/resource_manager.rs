//! Resource management
//!
//! Source connections and aggregation tasks are bounded by semaphores whose permits are held for
//! the duration of one fetch or one aggregation. Memory is different: the documents of a request
//! stay in memory until the request's [crate::dataset::Dataset] is dropped, so memory is reserved
//! through a [MemoryLoader] that collects the permits of every response of the request into a
//! [MemoryReservation] owned by the dataset.

use crate::error::DashboardError;

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{MutexGuard, OwnedSemaphorePermit, Semaphore, SemaphorePermit};

/// Allocates bounded resources to requests.
#[derive(Debug)]
pub struct ResourceManager {
    /// Optional semaphore for document source connections.
    source_connections: Option<Semaphore>,

    /// Optional semaphore for bytes of source responses held by requests.
    memory: Option<Arc<Semaphore>>,

    /// Optional total memory pool in bytes.
    total_memory: Option<usize>,

    /// Held by the one request currently reserving memory.
    memory_turn: tokio::sync::Mutex<()>,

    /// Optional semaphore for aggregation tasks.
    tasks: Option<Semaphore>,
}

impl ResourceManager {
    /// Returns a new ResourceManager object.
    pub fn new(
        source_connection_limit: Option<usize>,
        memory_limit: Option<usize>,
        task_limit: Option<usize>,
    ) -> Self {
        Self {
            source_connections: source_connection_limit.map(Semaphore::new),
            memory: memory_limit.map(|limit| Arc::new(Semaphore::new(limit))),
            total_memory: memory_limit,
            memory_turn: tokio::sync::Mutex::new(()),
            tasks: task_limit.map(Semaphore::new),
        }
    }

    /// Acquire a document source connection resource.
    pub async fn source_connection(&self) -> Result<Option<SemaphorePermit>, DashboardError> {
        optional_acquire(&self.source_connections, 1).await
    }

    /// Start reserving memory for the responses of one request.
    ///
    /// With a memory limit, requests take turns: the returned loader waits until no other
    /// request is reserving. A request holding part of its memory therefore never waits on
    /// another request that does the same.
    pub async fn memory_loader(&self) -> MemoryLoader<'_> {
        let turn = match self.memory {
            Some(_) => Some(self.memory_turn.lock().await),
            None => None,
        };
        MemoryLoader {
            resource_manager: self,
            _turn: turn,
            reservation: Mutex::new(MemoryReservation::default()),
        }
    }

    /// Acquire a task resource.
    pub async fn task(&self) -> Result<Option<SemaphorePermit>, DashboardError> {
        optional_acquire(&self.tasks, 1).await
    }
}

/// Acquire permits on an optional Semaphore, if present.
async fn optional_acquire(
    sem: &Option<Semaphore>,
    n: usize,
) -> Result<Option<SemaphorePermit>, DashboardError> {
    let n = n.try_into()?;
    if let Some(sem) = sem {
        sem.acquire_many(n)
            .await
            .map(Some)
            .map_err(|err| err.into())
    } else {
        Ok(None)
    }
}

/// Memory held by the documents of a request.
///
/// The permits are returned to the [ResourceManager] when the reservation is dropped.
#[derive(Debug, Default)]
pub struct MemoryReservation {
    bytes: usize,
    permits: Vec<OwnedSemaphorePermit>,
}

impl MemoryReservation {
    /// Number of bytes reserved.
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

/// Reserves memory for the responses of one request.
///
/// Obtained from [ResourceManager::memory_loader]. Reservations may be made concurrently through
/// a shared reference, e.g. by the fetches of a `try_join!`.
#[derive(Debug)]
pub struct MemoryLoader<'a> {
    resource_manager: &'a ResourceManager,
    _turn: Option<MutexGuard<'a, ()>>,
    reservation: Mutex<MemoryReservation>,
}

impl MemoryLoader<'_> {
    /// Reserve memory for a response of `bytes` bytes, before reading it.
    ///
    /// Fails if the request as a whole would need more than the memory limit.
    pub async fn reserve(&self, bytes: usize) -> Result<(), DashboardError> {
        let rm = self.resource_manager;
        let (Some(memory), Some(total)) = (&rm.memory, rm.total_memory) else {
            let mut reservation = self.reservation();
            reservation.bytes = reservation.bytes.saturating_add(bytes);
            return Ok(());
        };
        let n = bytes.try_into()?;
        {
            let mut reservation = self.reservation();
            let requested = reservation.bytes.saturating_add(bytes);
            if requested > total {
                return Err(DashboardError::InsufficientMemory { requested, total });
            }
            reservation.bytes = requested;
        }
        let permits = match memory.clone().acquire_many_owned(n).await {
            Ok(permits) => permits,
            Err(err) => {
                let mut reservation = self.reservation();
                reservation.bytes = reservation.bytes.saturating_sub(bytes);
                return Err(err.into());
            }
        };
        self.reservation().permits.push(permits);
        Ok(())
    }

    /// Finish reserving, returning the memory held by the request.
    ///
    /// Other requests may reserve memory once this returns.
    pub fn finish(self) -> MemoryReservation {
        self.reservation
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn reservation(&self) -> std::sync::MutexGuard<'_, MemoryReservation> {
        self.reservation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
