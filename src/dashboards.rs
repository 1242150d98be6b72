//! Role-specific dashboards.
//!
//! A dashboard composes several operations into the single document a page renders. The admin and
//! ministry dashboards work on the full dataset. The innovator dashboard only needs the documents
//! reachable from one innovator, which [innovator_dataset] fetches with `in` queries.

use hashbrown::HashSet;
use serde::Serialize;

use crate::aggregation::{self, ProvinceCount, ReadinessSummary, StatusSummary, YearBucket};
use crate::dataset::Dataset;
use crate::document_store::DocumentStore;
use crate::error::DashboardError;
use crate::models::{
    ClaimRow, ClaimsRequest, InnovatorMetric, Leaderboard, YearEntity, YearsRequest,
    DEFAULT_LEVELS, DEFAULT_LIMIT, DEFAULT_PAGE_SIZE,
};
use crate::operations;
use crate::pagination::Page;
use crate::ranking::{self, Ranked, Tally};
use crate::resource_manager::ResourceManager;
use crate::types::{
    Claim, ClaimStatus, IdmCategory, Innovation, Innovator, Readiness, Village,
};

/// Claim statuses counted as adoptions on the dashboards
const VERIFIED: [ClaimStatus; 1] = [ClaimStatus::Terverifikasi];

/// Names of all dashboards, as used in the API path.
pub const NAMES: [&str; 4] = ["admin", "ministry", "innovator/{id}", "village/{id}"];

/// Number of documents in each collection
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Totals {
    pub villages: usize,
    pub innovators: usize,
    pub innovations: usize,
    pub claims: usize,
}

/// Dashboard of the platform administrator
#[derive(Debug, PartialEq, Serialize)]
pub struct AdminDashboard {
    pub totals: Totals,
    pub claim_status: StatusSummary,
    pub top_villages: Leaderboard,
    pub top_innovations: Leaderboard,
    pub top_innovators: Leaderboard,
    /// First page of claims awaiting verification
    pub pending_claims: Page<ClaimRow>,
    /// Number of claims referencing a missing village or innovation
    pub orphaned_claims: usize,
}

/// Build the admin dashboard.
pub fn admin(dataset: &Dataset) -> AdminDashboard {
    let pending = ClaimsRequest {
        statuses: Some(vec![ClaimStatus::Menunggu]),
        village_id: None,
        innovation_id: None,
        page: 1,
        page_size: DEFAULT_PAGE_SIZE,
    };
    AdminDashboard {
        totals: Totals {
            villages: dataset.villages.len(),
            innovators: dataset.innovators.len(),
            innovations: dataset.innovations.len(),
            claims: dataset.claims.len(),
        },
        claim_status: aggregation::claim_status_summary(&dataset.claims),
        top_villages: top_villages(dataset),
        top_innovations: top_innovations(dataset),
        top_innovators: operations::leaderboard(
            operations::innovator_tallies(dataset, &VERIFIED, InnovatorMetric::Villages, None),
            Some(DEFAULT_LIMIT),
        ),
        pending_claims: operations::claims_table(dataset, &pending),
        orphaned_claims: dataset.orphaned_claims().count(),
    }
}

fn top_villages(dataset: &Dataset) -> Leaderboard {
    operations::leaderboard(
        operations::village_tallies(dataset, &VERIFIED, None, None),
        Some(DEFAULT_LIMIT),
    )
}

fn top_innovations(dataset: &Dataset) -> Leaderboard {
    operations::leaderboard(
        operations::innovation_tallies(dataset, &VERIFIED, None),
        Some(DEFAULT_LIMIT),
    )
}

/// Dashboard of the ministry
#[derive(Debug, PartialEq, Serialize)]
pub struct MinistryDashboard {
    /// Villages per IDM category
    pub idm_categories: Vec<Tally>,
    pub provinces: Vec<ProvinceCount>,
    /// Innovations per year of introduction
    pub innovation_years: Vec<YearBucket>,
    pub readiness: ReadinessSummary,
    pub top_villages: Leaderboard,
    pub top_innovations: Leaderboard,
}

/// Build the ministry dashboard.
pub fn ministry(dataset: &Dataset) -> MinistryDashboard {
    let adoptions = operations::village_adoptions(dataset, &VERIFIED);
    MinistryDashboard {
        idm_categories: aggregation::idm_breakdown(&dataset.villages),
        provinces: aggregation::province_choropleth(&dataset.villages, &adoptions, DEFAULT_LEVELS),
        innovation_years: innovation_years(dataset),
        readiness: aggregation::readiness_summary(&dataset.villages),
        top_villages: top_villages(dataset),
        top_innovations: top_innovations(dataset),
    }
}

fn innovation_years(dataset: &Dataset) -> Vec<YearBucket> {
    let request = YearsRequest {
        entity: YearEntity::Innovations,
        range: None,
        statuses: VERIFIED.to_vec(),
    };
    operations::years(dataset, &request)
}

/// A village in a list
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VillageSummary {
    pub id: String,
    pub name: String,
    pub province: String,
}

/// Dashboard of an innovator
#[derive(Debug, PartialEq, Serialize)]
pub struct InnovatorDashboard {
    pub innovator: Innovator,
    /// The innovator's innovations by adopting villages
    pub innovations: Leaderboard,
    /// Villages that adopted any of the innovator's innovations, by name
    pub villages_served: Vec<VillageSummary>,
    /// Claims for the innovator's innovations, including those of missing villages
    pub claim_status: StatusSummary,
    pub innovation_years: Vec<YearBucket>,
}

/// Fetch the documents reachable from an innovator.
///
/// Issues one query per collection in dependency order: the innovator, its innovations, the
/// claims for those innovations and the villages of those claims. The later queries are `in`
/// queries over the IDs found so far. The dataset holds the memory reserved for the responses.
#[tracing::instrument(level = "DEBUG", skip(store, resource_manager))]
pub async fn innovator_dataset(
    store: &DocumentStore,
    resource_manager: &ResourceManager,
    id: &str,
) -> Result<Dataset, DashboardError> {
    let memory = resource_manager.memory_loader().await;
    let innovators: Vec<Innovator> = store
        .fetch_where("id", vec![id.to_string()], resource_manager, &memory)
        .await?;
    if innovators.is_empty() {
        return Err(DashboardError::NotFound {
            entity: "innovator",
            id: id.to_string(),
        });
    }
    let innovations: Vec<Innovation> = store
        .fetch_where("innovatorId", vec![id.to_string()], resource_manager, &memory)
        .await?;
    let innovation_ids = innovations.iter().map(|i| i.id.clone()).collect();
    let claims: Vec<Claim> = store
        .fetch_where("innovationId", innovation_ids, resource_manager, &memory)
        .await?;
    let village_ids = claims.iter().map(|c| c.village_id.clone()).collect();
    let villages: Vec<Village> = store
        .fetch_where("id", village_ids, resource_manager, &memory)
        .await?;
    let dataset = Dataset::new(villages, innovators, innovations, claims);
    Ok(dataset.with_memory(memory.finish()))
}

/// Build the dashboard of an innovator.
///
/// The dataset must hold at least the documents returned by [innovator_dataset].
pub fn innovator(dataset: &Dataset, id: &str) -> Result<InnovatorDashboard, DashboardError> {
    let innovator = dataset
        .innovator(id)
        .ok_or_else(|| DashboardError::NotFound {
            entity: "innovator",
            id: id.to_string(),
        })?;

    let adoptions = operations::innovation_adoptions(dataset, &VERIFIED);
    let candidates: Vec<Tally> = dataset
        .innovations_of(id)
        .map(|innovation| {
            Tally::with_id(
                &innovation.id,
                &innovation.name,
                adoptions.get(innovation.id.as_str()).copied().unwrap_or(0),
            )
        })
        .collect();

    let mut seen = HashSet::new();
    let mut villages_served: Vec<VillageSummary> = dataset
        .adoptions(&VERIFIED)
        .filter(|adoption| adoption.innovation.innovator_id == id)
        .filter(|adoption| seen.insert(adoption.village.id.as_str()))
        .map(|adoption| VillageSummary {
            id: adoption.village.id.clone(),
            name: adoption.village.name.clone(),
            province: adoption.village.province.clone(),
        })
        .collect();
    villages_served.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    let innovation_ids: HashSet<&str> = dataset
        .innovations_of(id)
        .map(|innovation| innovation.id.as_str())
        .collect();
    let claim_status = aggregation::claim_status_summary(
        dataset
            .claims
            .iter()
            .filter(|claim| innovation_ids.contains(claim.innovation_id.as_str())),
    );

    let years: Vec<i32> = dataset
        .innovations_of(id)
        .filter_map(|innovation| innovation.year)
        .collect();
    let innovation_years = match aggregation::covering_range(years.iter().copied()) {
        Some(range) => aggregation::year_buckets(&range, years),
        None => vec![],
    };

    Ok(InnovatorDashboard {
        innovator: innovator.clone(),
        innovations: operations::leaderboard(candidates, Some(DEFAULT_LIMIT)),
        villages_served,
        claim_status,
        innovation_years,
    })
}

/// An innovation adopted by a village
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdoptedInnovation {
    pub id: String,
    pub name: String,
    pub category: String,
    pub innovator_name: Option<String>,
}

/// Dashboard of a village
#[derive(Debug, PartialEq, Serialize)]
pub struct VillageDashboard {
    pub village: Village,
    pub category: IdmCategory,
    /// Verified adoptions, by innovation name
    pub adopted_innovations: Vec<AdoptedInnovation>,
    /// Claims submitted by the village, including those of missing innovations
    pub claim_status: StatusSummary,
    pub readiness: Option<Readiness>,
    /// Position of the village among all villages by verified adoptions
    pub rank: Option<Ranked>,
}

/// Build the dashboard of a village.
pub fn village(dataset: &Dataset, id: &str) -> Result<VillageDashboard, DashboardError> {
    let village = dataset.village(id).ok_or_else(|| DashboardError::NotFound {
        entity: "village",
        id: id.to_string(),
    })?;

    let mut seen = HashSet::new();
    let mut adopted_innovations: Vec<AdoptedInnovation> = dataset
        .adoptions(&VERIFIED)
        .filter(|adoption| adoption.village.id == id)
        .filter(|adoption| seen.insert(adoption.innovation.id.as_str()))
        .map(|adoption| AdoptedInnovation {
            id: adoption.innovation.id.clone(),
            name: adoption.innovation.name.clone(),
            category: adoption.innovation.category.clone(),
            innovator_name: adoption.innovator.map(|innovator| innovator.name.clone()),
        })
        .collect();
    adopted_innovations.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    let claim_status = aggregation::claim_status_summary(
        dataset.claims.iter().filter(|claim| claim.village_id == id),
    );

    let ranked = ranking::rank(
        operations::village_tallies(dataset, &VERIFIED, None, None),
        None,
    );

    Ok(VillageDashboard {
        village: village.clone(),
        category: village.category(),
        adopted_innovations,
        claim_status,
        readiness: village.readiness,
        rank: ranking::rank_of(&ranked, id).cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::document_source_directory::DocumentSourceDirectory;
    use crate::ranking::PLACEHOLDER_NAME;
    use crate::test_utils;

    fn names(board: &Leaderboard) -> Vec<&str> {
        board
            .entries
            .iter()
            .map(|entry| entry.name.as_str())
            .collect()
    }

    #[test]
    fn test_admin() {
        let dashboard = admin(&test_utils::dataset());
        assert_eq!(
            Totals {
                villages: 5,
                innovators: 3,
                innovations: 4,
                claims: 9
            },
            dashboard.totals
        );
        assert_eq!(
            StatusSummary {
                menunggu: 1,
                terverifikasi: 7,
                ditolak: 1,
                total: 9
            },
            dashboard.claim_status
        );
        assert_eq!("Sukamaju", names(&dashboard.top_villages)[0]);
        assert_eq!("Pupuk Pintar", names(&dashboard.top_innovations)[0]);
        assert_eq!(
            vec![
                "Tani Digital",
                "Sehat Desa",
                "Kampus Merdeka",
                PLACEHOLDER_NAME,
                PLACEHOLDER_NAME
            ],
            names(&dashboard.top_innovators)
        );
        assert_eq!(1, dashboard.pending_claims.total_items);
        assert_eq!("c7", dashboard.pending_claims.items[0].id);
        assert_eq!(1, dashboard.orphaned_claims);
    }

    #[test]
    fn test_admin_empty() {
        let dashboard = admin(&Dataset::default());
        assert_eq!(5, dashboard.top_villages.entries.len());
        assert_eq!(0, dashboard.top_villages.candidates);
        assert!(dashboard.pending_claims.items.is_empty());
        assert_eq!(0, dashboard.orphaned_claims);
    }

    #[test]
    fn test_ministry() {
        let dashboard = ministry(&test_utils::dataset());
        assert_eq!(Tally::new("Mandiri", 1), dashboard.idm_categories[0]);
        assert_eq!(4, dashboard.provinces.len());
        let years: Vec<(&str, u64)> = dashboard
            .innovation_years
            .iter()
            .map(|bucket| (bucket.label.as_str(), bucket.count))
            .collect();
        assert_eq!(vec![("2019", 1), ("2020", 1), ("2021", 2)], years);
        assert_eq!(2, dashboard.readiness.villages);
        assert_eq!(70.0, dashboard.readiness.mean.infrastructure);
        assert_eq!(5, dashboard.top_innovations.entries.len());
    }

    #[test]
    fn test_innovator() {
        let dashboard = innovator(&test_utils::dataset(), "n1").unwrap();
        assert_eq!("Tani Digital", dashboard.innovator.name);
        assert_eq!(2, dashboard.innovations.candidates);
        let counts: Vec<(&str, u64)> = dashboard
            .innovations
            .entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.count))
            .collect();
        assert_eq!(
            vec![
                ("Pupuk Pintar", 3),
                ("eFishery Desa", 1),
                (PLACEHOLDER_NAME, 0),
                (PLACEHOLDER_NAME, 0),
                (PLACEHOLDER_NAME, 0),
            ],
            counts
        );
        let villages: Vec<&str> = dashboard
            .villages_served
            .iter()
            .map(|village| village.name.as_str())
            .collect();
        assert_eq!(vec!["Bantul", "Cibodas", "Sukamaju"], villages);
        // Includes c9, whose village does not exist.
        assert_eq!(
            StatusSummary {
                menunggu: 1,
                terverifikasi: 5,
                ditolak: 0,
                total: 6
            },
            dashboard.claim_status
        );
        assert_eq!(2, dashboard.innovation_years.len());
    }

    fn with_outlying_years() -> Dataset {
        let (villages, innovators, mut innovations, claims) = test_utils::collections();
        innovations.push(test_utils::innovation("i5", "A", "X", "n1", -1_000_000));
        innovations.push(test_utils::innovation("i6", "B", "X", "n1", 1_000_000));
        Dataset::new(villages, innovators, innovations, claims)
    }

    fn assert_bounded_years(buckets: &[YearBucket], count: u64) {
        assert!(buckets.len() as i64 <= aggregation::MAX_YEAR_BUCKETS);
        assert_eq!(-1_000_000, buckets[0].start);
        assert_eq!(1_000_000, buckets[buckets.len() - 1].end);
        assert_eq!(count, buckets.iter().map(|bucket| bucket.count).sum::<u64>());
    }

    #[test]
    fn test_ministry_outlying_years() {
        let dashboard = ministry(&with_outlying_years());
        assert_bounded_years(&dashboard.innovation_years, 6);
    }

    #[test]
    fn test_innovator_outlying_years() {
        let dashboard = innovator(&with_outlying_years(), "n1").unwrap();
        assert_bounded_years(&dashboard.innovation_years, 4);
    }

    #[test]
    fn test_innovator_without_innovations() {
        let dashboard = innovator(&test_utils::dataset(), "n3").unwrap();
        assert_eq!(0, dashboard.innovations.candidates);
        assert!(dashboard.villages_served.is_empty());
        assert_eq!(0, dashboard.claim_status.total);
        assert!(dashboard.innovation_years.is_empty());
    }

    #[test]
    fn test_innovator_not_found() {
        assert!(matches!(
            innovator(&test_utils::dataset(), "n9"),
            Err(DashboardError::NotFound {
                entity: "innovator",
                id: _
            })
        ));
    }

    #[tokio::test]
    async fn test_innovator_dataset_matches_full_dataset() {
        let dir = tempfile::tempdir().unwrap();
        test_utils::write_collections(dir.path());
        let source = DocumentSourceDirectory::new(dir.path().to_str().unwrap()).unwrap();
        // One value per query, so that every `in` query is chunked.
        let store = DocumentStore::directory(source, 1, None);
        let rm = ResourceManager::new(None, Some(1 << 20), None);
        let dataset = innovator_dataset(&store, &rm, "n1").await.unwrap();
        assert!(dataset.memory() > 0);
        assert_eq!(1, dataset.innovators.len());
        assert_eq!(2, dataset.innovations.len());
        assert_eq!(6, dataset.claims.len());
        assert_eq!(4, dataset.villages.len());
        assert_eq!(
            innovator(&test_utils::dataset(), "n1").unwrap(),
            innovator(&dataset, "n1").unwrap()
        );
    }

    #[tokio::test]
    async fn test_innovator_dataset_not_found() {
        let dir = tempfile::tempdir().unwrap();
        test_utils::write_collections(dir.path());
        let source = DocumentSourceDirectory::new(dir.path().to_str().unwrap()).unwrap();
        let store = DocumentStore::directory(source, 10, None);
        let rm = ResourceManager::new(None, None, None);
        let result = innovator_dataset(&store, &rm, "n9").await;
        assert!(matches!(result, Err(DashboardError::NotFound { .. })));
    }

    #[test]
    fn test_village() {
        let dashboard = village(&test_utils::dataset(), "v1").unwrap();
        assert_eq!(IdmCategory::Mandiri, dashboard.category);
        let adopted: Vec<&str> = dashboard
            .adopted_innovations
            .iter()
            .map(|innovation| innovation.name.as_str())
            .collect();
        assert_eq!(vec!["Pupuk Pintar", "Telemedis", "eFishery Desa"], adopted);
        assert_eq!(
            Some("Sehat Desa".to_string()),
            dashboard.adopted_innovations[1].innovator_name
        );
        assert_eq!(3, dashboard.claim_status.terverifikasi);
        assert_eq!(Some(80.0), dashboard.readiness.map(|r| r.infrastructure));
        let rank = dashboard.rank.unwrap();
        assert_eq!(1, rank.rank);
        assert_eq!("1st", rank.label);
    }

    #[test]
    fn test_village_tied_rank() {
        let dashboard = village(&test_utils::dataset(), "v5").unwrap();
        assert!(dashboard.adopted_innovations.is_empty());
        assert_eq!(1, dashboard.claim_status.ditolak);
        assert_eq!(IdmCategory::Unknown, dashboard.category);
        assert_eq!(4, dashboard.rank.unwrap().rank);
    }

    #[test]
    fn test_village_counts_claims_of_missing_innovations() {
        let (villages, innovators, innovations, mut claims) = test_utils::collections();
        claims.push(test_utils::claim("c10", "v5", "i9", ClaimStatus::Menunggu));
        let dataset = Dataset::new(villages, innovators, innovations, claims);
        let dashboard = village(&dataset, "v5").unwrap();
        assert_eq!(
            StatusSummary {
                menunggu: 1,
                terverifikasi: 0,
                ditolak: 1,
                total: 2
            },
            dashboard.claim_status
        );
        assert!(dashboard.adopted_innovations.is_empty());
    }

    #[test]
    fn test_village_not_found() {
        let result = village(&test_utils::dataset(), "v9");
        assert!(matches!(
            result,
            Err(DashboardError::NotFound {
                entity: "village",
                id: _
            })
        ));
    }
}
