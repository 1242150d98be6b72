pub mod claim_status;
pub mod entities;
pub mod idm;

// Re-export types for convenience.
pub use crate::types::claim_status::ClaimStatus;
pub use crate::types::entities::{Claim, Document, Innovation, Innovator, Readiness, Village};
pub use crate::types::idm::IdmCategory;
