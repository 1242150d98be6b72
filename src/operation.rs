use crate::dataset::Dataset;
use crate::error::DashboardError;

use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

/// Trait for dashboard operations.
///
/// This forms the contract between the API layer and operations. An operation is a pure function
/// of its validated request and a snapshot of the collections.
pub trait Operation {
    /// Name of the operation, as used in the API path.
    const NAME: &'static str;

    /// Request data of the operation.
    type Request: DeserializeOwned + Validate + Send + 'static;

    /// Response data of the operation.
    type Output: Serialize + Send + 'static;

    /// Execute the operation.
    ///
    /// # Arguments
    ///
    /// * `request`: Validated request data
    /// * `dataset`: Snapshot of the collections to operate on
    fn execute(request: &Self::Request, dataset: &Dataset)
        -> Result<Self::Output, DashboardError>;
}
