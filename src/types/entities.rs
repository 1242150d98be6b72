//! Documents stored in the hosted database
//!
//! Each document type lives in its own collection. Relationships between documents are explicit
//! ID references (`villageId`, `innovationId`, `innovatorId`), never names.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{ClaimStatus, IdmCategory};

/// A document that can be fetched from a collection of the document database.
pub trait Document: DeserializeOwned + Send + 'static {
    /// Name of the collection holding documents of this type.
    const COLLECTION: &'static str;

    /// Returns the document ID.
    fn id(&self) -> &str;
}

/// Digital readiness scores of a village, each in the range 0 to 100.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readiness {
    pub infrastructure: f64,
    pub digital_literacy: f64,
    pub governance: f64,
    pub economy: f64,
}

/// A village (desa)
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Village {
    pub id: String,
    pub name: String,
    pub province: String,
    #[serde(default)]
    pub district: Option<String>,
    /// IDM score in the range 0 to 1
    #[serde(default)]
    pub idm_score: Option<f64>,
    /// Category recorded by an administrator, used when no score is present
    #[serde(default)]
    pub idm_category: Option<IdmCategory>,
    #[serde(default)]
    pub readiness: Option<Readiness>,
}

impl Village {
    /// Returns the IDM category of the village.
    ///
    /// The score takes precedence over a recorded category.
    pub fn category(&self) -> IdmCategory {
        match (self.idm_score, self.idm_category) {
            (Some(score), _) => IdmCategory::from_score(score),
            (None, Some(category)) => category,
            (None, None) => IdmCategory::Unknown,
        }
    }
}

impl Document for Village {
    const COLLECTION: &'static str = "villages";

    fn id(&self) -> &str {
        &self.id
    }
}

/// An innovator (inovator): an organisation or individual proposing innovations
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Innovator {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Villages served as recorded on the document; derived counts are used for rankings.
    #[serde(default)]
    pub villages_served: Option<u64>,
}

impl Document for Innovator {
    const COLLECTION: &'static str = "innovators";

    fn id(&self) -> &str {
        &self.id
    }
}

/// An innovation (inovasi)
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Innovation {
    pub id: String,
    pub name: String,
    pub category: String,
    pub innovator_id: String,
    /// Year the innovation was introduced
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub claim_count: Option<u64>,
}

impl Document for Innovation {
    const COLLECTION: &'static str = "innovations";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A claim (klaim) that a village adopted an innovation
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: String,
    pub village_id: String,
    pub innovation_id: String,
    pub status: ClaimStatus,
    /// URLs of evidence attachments held in object storage
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub submitted_year: Option<i32>,
}

impl Document for Claim {
    const COLLECTION: &'static str = "claims";

    fn id(&self) -> &str {
        &self.id
    }
}
