//! Request and response data of the API

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use validator::Validate;

use crate::aggregation::YearRange;
use crate::ranking::{Ranked, Tally};
use crate::types::{ClaimStatus, IdmCategory};

/// Number of leaderboard entries returned by default
pub const DEFAULT_LIMIT: usize = 5;
/// Number of legend levels of the province map by default
pub const DEFAULT_LEVELS: u32 = 5;
/// Number of table rows per page by default
pub const DEFAULT_PAGE_SIZE: usize = 10;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_statuses() -> Vec<ClaimStatus> {
    vec![ClaimStatus::Terverifikasi]
}

fn default_levels() -> u32 {
    DEFAULT_LEVELS
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Request data for ranking arbitrary items
#[derive(Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct RankRequest {
    /// Items to rank
    #[validate]
    #[validate(length(max = 10000, message = "items length must not exceed 10000"))]
    pub items: Vec<Tally>,
    /// Fixed number of entries to return
    #[validate(range(max = 100, message = "limit must not exceed 100"))]
    pub limit: Option<usize>,
}

/// Request data for the village leaderboard
#[derive(Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct TopVillagesRequest {
    /// Number of entries to return
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: usize,
    /// Claim statuses counted as adoptions
    #[serde(default = "default_statuses")]
    #[validate(length(min = 1, message = "statuses must not be empty"))]
    pub statuses: Vec<ClaimStatus>,
    /// Only rank villages of this province
    pub province: Option<String>,
    /// Only rank villages of this IDM category
    pub category: Option<IdmCategory>,
}

/// Request data for the innovation leaderboard
#[derive(Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct TopInnovationsRequest {
    /// Number of entries to return
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: usize,
    /// Claim statuses counted as adoptions
    #[serde(default = "default_statuses")]
    #[validate(length(min = 1, message = "statuses must not be empty"))]
    pub statuses: Vec<ClaimStatus>,
    /// Only rank innovations of this category
    pub category: Option<String>,
}

/// What innovators are ranked by
#[derive(Clone, Copy, Debug, Default, Deserialize, Display, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InnovatorMetric {
    /// Distinct villages that adopted any of the innovator's innovations
    #[default]
    Villages,
    /// Number of innovations introduced
    Innovations,
}

/// Request data for the innovator leaderboard
#[derive(Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct TopInnovatorsRequest {
    /// Number of entries to return
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: usize,
    /// Claim statuses counted as adoptions
    #[serde(default = "default_statuses")]
    #[validate(length(min = 1, message = "statuses must not be empty"))]
    pub statuses: Vec<ClaimStatus>,
    #[serde(default)]
    pub metric: InnovatorMetric,
    /// Only rank innovators of this category
    pub category: Option<String>,
}

/// Request data for the province map
#[derive(Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProvincesRequest {
    /// Claim statuses counted as adoptions
    #[serde(default = "default_statuses")]
    #[validate(length(min = 1, message = "statuses must not be empty"))]
    pub statuses: Vec<ClaimStatus>,
    /// Number of non-zero legend levels
    #[serde(default = "default_levels")]
    #[validate(range(min = 1, max = 20, message = "levels must be between 1 and 20"))]
    pub levels: u32,
}

/// Records counted into year buckets
#[derive(Clone, Copy, Debug, Deserialize, Display, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum YearEntity {
    /// Innovations by year of introduction
    Innovations,
    /// Claims by year of submission
    Claims,
}

/// Request data for year-bucketed counts
#[derive(Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct YearsRequest {
    pub entity: YearEntity,
    /// Range of years. Defaults to single years covering all records
    #[validate]
    pub range: Option<YearRange>,
    /// Claim statuses counted, for claims
    #[serde(default = "default_statuses")]
    #[validate(length(min = 1, message = "statuses must not be empty"))]
    pub statuses: Vec<ClaimStatus>,
}

/// Records broken down by category
#[derive(Clone, Copy, Debug, Deserialize, Display, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CategoryEntity {
    /// Villages by IDM category
    Villages,
    Innovations,
    Innovators,
}

/// Request data for category breakdowns
#[derive(Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct CategoriesRequest {
    pub entity: CategoryEntity,
}

/// Request data for the claims table
#[derive(Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct ClaimsRequest {
    /// Claim statuses to list. Defaults to all statuses
    #[validate(length(min = 1, message = "statuses must not be empty"))]
    pub statuses: Option<Vec<ClaimStatus>>,
    /// Only list claims of this village
    pub village_id: Option<String>,
    /// Only list claims of this innovation
    pub innovation_id: Option<String>,
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be greater than 0"))]
    pub page: usize,
    /// Number of rows per page
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: usize,
}

/// A ranked leaderboard
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Leaderboard {
    /// Number of ranked candidates before truncation or padding
    pub candidates: usize,
    pub entries: Vec<Ranked>,
}

/// A row of the claims table
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ClaimRow {
    pub id: String,
    pub status: ClaimStatus,
    pub village_id: String,
    /// Name of the village, if the reference resolves
    pub village_name: Option<String>,
    pub innovation_id: String,
    /// Name of the innovation, if the reference resolves
    pub innovation_name: Option<String>,
    pub innovator_name: Option<String>,
    pub evidence_count: usize,
    pub submitted_year: Option<i32>,
}

/// Description of the API
#[derive(Clone, Debug, Serialize)]
pub struct Schema {
    pub version: &'static str,
    pub operations: Vec<&'static str>,
    pub dashboards: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_test::{assert_de_tokens, assert_de_tokens_error, Token};

    #[test]
    fn test_top_villages_defaults() {
        let request: TopVillagesRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(
            TopVillagesRequest {
                limit: 5,
                statuses: vec![ClaimStatus::Terverifikasi],
                province: None,
                category: None,
            },
            request
        );
        request.validate().unwrap()
    }

    #[test]
    fn test_top_villages_all_fields() {
        let request = TopVillagesRequest {
            limit: 3,
            statuses: vec![ClaimStatus::Menunggu, ClaimStatus::Terverifikasi],
            province: Some("Bali".to_string()),
            category: Some(IdmCategory::Maju),
        };
        assert_de_tokens(
            &request,
            &[
                Token::Struct {
                    name: "TopVillagesRequest",
                    len: 4,
                },
                Token::Str("limit"),
                Token::U32(3),
                Token::Str("statuses"),
                Token::Seq { len: Some(2) },
                Token::Enum { name: "ClaimStatus" },
                Token::Str("Menunggu"),
                Token::Unit,
                Token::Enum { name: "ClaimStatus" },
                Token::Str("Terverifikasi"),
                Token::Unit,
                Token::SeqEnd,
                Token::Str("province"),
                Token::Some,
                Token::Str("Bali"),
                Token::Str("category"),
                Token::Some,
                Token::Enum {
                    name: "IdmCategory",
                },
                Token::Str("Maju"),
                Token::Unit,
                Token::StructEnd,
            ],
        );
        request.validate().unwrap()
    }

    #[test]
    fn test_unknown_field() {
        assert_de_tokens_error::<TopVillagesRequest>(
            &[
                Token::Struct {
                    name: "TopVillagesRequest",
                    len: 1,
                },
                Token::Str("foo"),
                Token::StructEnd,
            ],
            "unknown field `foo`, expected one of `limit`, `statuses`, `province`, `category`",
        )
    }

    #[test]
    fn test_invalid_status() {
        let result = serde_json::from_str::<TopVillagesRequest>(r#"{"statuses": ["Approved"]}"#);
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "limit must be between 1 and 100")]
    fn test_invalid_limit_zero() {
        let request: TopVillagesRequest = serde_json::from_str(r#"{"limit": 0}"#).unwrap();
        request.validate().unwrap()
    }

    #[test]
    #[should_panic(expected = "limit must be between 1 and 100")]
    fn test_invalid_limit_large() {
        let request: TopInnovationsRequest = serde_json::from_str(r#"{"limit": 101}"#).unwrap();
        request.validate().unwrap()
    }

    #[test]
    #[should_panic(expected = "statuses must not be empty")]
    fn test_invalid_empty_statuses() {
        let request: TopInnovatorsRequest =
            serde_json::from_str(r#"{"statuses": []}"#).unwrap();
        request.validate().unwrap()
    }

    #[test]
    fn test_innovator_metric() {
        let request: TopInnovatorsRequest =
            serde_json::from_str(r#"{"metric": "innovations"}"#).unwrap();
        assert_eq!(InnovatorMetric::Innovations, request.metric);
        let request: TopInnovatorsRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(InnovatorMetric::Villages, request.metric);
    }

    #[test]
    fn test_rank_request() {
        let request: RankRequest = serde_json::from_str(
            r#"{"items": [{"name": "A", "count": 3}, {"name": "B", "count": 5}], "limit": 5}"#,
        )
        .unwrap();
        assert_eq!(2, request.items.len());
        assert_eq!(Some(5), request.limit);
        request.validate().unwrap()
    }

    #[test]
    #[should_panic(expected = "name must not be empty")]
    fn test_rank_request_invalid_item() {
        let request: RankRequest =
            serde_json::from_str(r#"{"items": [{"name": "", "count": 3}]}"#).unwrap();
        request.validate().unwrap()
    }

    #[test]
    fn test_rank_request_negative_count() {
        let result = serde_json::from_str::<RankRequest>(r#"{"items": [{"name": "A", "count": -1}]}"#);
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "levels must be between 1 and 20")]
    fn test_invalid_levels() {
        let request: ProvincesRequest = serde_json::from_str(r#"{"levels": 0}"#).unwrap();
        request.validate().unwrap()
    }

    #[test]
    fn test_years_request() {
        let request: YearsRequest = serde_json::from_str(
            r#"{"entity": "claims", "range": {"start": 2020, "end": 2023, "width": 2}}"#,
        )
        .unwrap();
        assert_eq!(YearEntity::Claims, request.entity);
        assert_eq!(Some(YearRange::new(2020, 2023, 2)), request.range);
        request.validate().unwrap()
    }

    #[test]
    #[should_panic(expected = "Year range start must not be after end")]
    fn test_years_request_invalid_range() {
        let request: YearsRequest = serde_json::from_str(
            r#"{"entity": "innovations", "range": {"start": 2023, "end": 2020}}"#,
        )
        .unwrap();
        request.validate().unwrap()
    }

    #[test]
    fn test_missing_entity() {
        let result = serde_json::from_str::<CategoriesRequest>("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_claims_request_defaults() {
        let request: ClaimsRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(None, request.statuses);
        assert_eq!(1, request.page);
        assert_eq!(10, request.page_size);
        request.validate().unwrap()
    }

    #[test]
    #[should_panic(expected = "page must be greater than 0")]
    fn test_claims_request_invalid_page() {
        let request: ClaimsRequest = serde_json::from_str(r#"{"page": 0}"#).unwrap();
        request.validate().unwrap()
    }

    #[test]
    #[should_panic(expected = "page_size must be between 1 and 100")]
    fn test_claims_request_invalid_page_size() {
        let request: ClaimsRequest = serde_json::from_str(r#"{"page_size": 1000}"#).unwrap();
        request.validate().unwrap()
    }
}
