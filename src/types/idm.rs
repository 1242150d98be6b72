//! Village development index (Indeks Desa Membangun, IDM)
//!
//! Villages are banded into categories by their IDM score. The thresholds are the national
//! bands:
//!
//! * score > 0.8155: Mandiri
//! * score > 0.7072: Maju
//! * score > 0.5989: Berkembang
//! * score > 0.4907: Tertinggal
//! * otherwise: Sangat Tertinggal

use serde::{Deserialize, Serialize};
use strum_macros::Display;

const MANDIRI_MIN: f64 = 0.8155;
const MAJU_MIN: f64 = 0.7072;
const BERKEMBANG_MIN: f64 = 0.5989;
const TERTINGGAL_MIN: f64 = 0.4907;

/// IDM category of a village
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum IdmCategory {
    Mandiri,
    Maju,
    Berkembang,
    Tertinggal,
    #[serde(rename = "Sangat Tertinggal")]
    #[strum(serialize = "Sangat Tertinggal")]
    SangatTertinggal,
    /// Neither a score nor a category is recorded
    Unknown,
}

impl IdmCategory {
    /// All categories, most developed first.
    pub const ALL: [IdmCategory; 6] = [
        IdmCategory::Mandiri,
        IdmCategory::Maju,
        IdmCategory::Berkembang,
        IdmCategory::Tertinggal,
        IdmCategory::SangatTertinggal,
        IdmCategory::Unknown,
    ];

    /// Returns the category for an IDM score.
    ///
    /// NaN scores are treated as unknown.
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() {
            Self::Unknown
        } else if score > MANDIRI_MIN {
            Self::Mandiri
        } else if score > MAJU_MIN {
            Self::Maju
        } else if score > BERKEMBANG_MIN {
            Self::Berkembang
        } else if score > TERTINGGAL_MIN {
            Self::Tertinggal
        } else {
            Self::SangatTertinggal
        }
    }
}
