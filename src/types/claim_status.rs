//! Claim verification status

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Verification status of a claim.
///
/// A village submits a claim that it has adopted an innovation. An administrator then verifies or
/// rejects it. The variant names follow the values stored in the document database.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum ClaimStatus {
    /// Awaiting verification
    Menunggu,
    /// Verified
    Terverifikasi,
    /// Rejected
    Ditolak,
}

impl ClaimStatus {
    /// All statuses in display order.
    pub const ALL: [ClaimStatus; 3] = [
        ClaimStatus::Menunggu,
        ClaimStatus::Terverifikasi,
        ClaimStatus::Ditolak,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialise() {
        let status: ClaimStatus = serde_json::from_str(r#""Terverifikasi""#).unwrap();
        assert_eq!(ClaimStatus::Terverifikasi, status);
        let status: ClaimStatus = serde_json::from_str(r#""Menunggu""#).unwrap();
        assert_eq!(ClaimStatus::Menunggu, status);
    }

    #[test]
    fn test_deserialise_unknown() {
        assert!(serde_json::from_str::<ClaimStatus>(r#""Approved""#).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!("Ditolak", ClaimStatus::Ditolak.to_string());
    }
}
