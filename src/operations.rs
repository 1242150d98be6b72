//! Dashboard operations.
//!
//! Each operation is implemented as a struct that implements the
//! [Operation](crate::operation::Operation) trait. The functions behind them are public so that
//! the dashboards can compose them.

use hashbrown::{HashMap, HashSet};

use crate::aggregation::{self, ProvinceCount, YearBucket};
use crate::dataset::Dataset;
use crate::error::DashboardError;
use crate::models::{
    CategoriesRequest, CategoryEntity, ClaimRow, ClaimsRequest, InnovatorMetric, Leaderboard,
    ProvincesRequest, RankRequest, TopInnovationsRequest, TopInnovatorsRequest, TopVillagesRequest,
    YearEntity, YearsRequest,
};
use crate::operation::Operation;
use crate::pagination::{paginate, Page};
use crate::ranking::{self, Ranked, Tally};
use crate::types::{Claim, ClaimStatus, IdmCategory};

/// Number of distinct innovations adopted by each village.
///
/// Several claims for the same village and innovation count once.
pub fn village_adoptions<'a>(
    dataset: &'a Dataset,
    statuses: &'a [ClaimStatus],
) -> HashMap<&'a str, u64> {
    let pairs: HashSet<(&str, &str)> = dataset
        .adoptions(statuses)
        .map(|adoption| (adoption.village.id.as_str(), adoption.innovation.id.as_str()))
        .collect();
    aggregation::count_ids(pairs.into_iter().map(|(village, _)| village))
}

/// Number of distinct villages that adopted each innovation.
pub fn innovation_adoptions<'a>(
    dataset: &'a Dataset,
    statuses: &'a [ClaimStatus],
) -> HashMap<&'a str, u64> {
    let pairs: HashSet<(&str, &str)> = dataset
        .adoptions(statuses)
        .map(|adoption| (adoption.innovation.id.as_str(), adoption.village.id.as_str()))
        .collect();
    aggregation::count_ids(pairs.into_iter().map(|(innovation, _)| innovation))
}

/// Number of distinct villages that adopted any innovation of each innovator.
pub fn innovator_reach<'a>(
    dataset: &'a Dataset,
    statuses: &'a [ClaimStatus],
) -> HashMap<&'a str, u64> {
    let pairs: HashSet<(&str, &str)> = dataset
        .adoptions(statuses)
        .filter_map(|adoption| {
            adoption
                .innovator
                .map(|innovator| (innovator.id.as_str(), adoption.village.id.as_str()))
        })
        .collect();
    aggregation::count_ids(pairs.into_iter().map(|(innovator, _)| innovator))
}

/// Rank candidates into a leaderboard.
pub fn leaderboard(candidates: Vec<Tally>, limit: Option<usize>) -> Leaderboard {
    Leaderboard {
        candidates: candidates.len(),
        entries: ranking::rank(candidates, limit),
    }
}

fn count_of(counts: &HashMap<&str, u64>, id: &str) -> u64 {
    counts.get(id).copied().unwrap_or(0)
}

/// Tallies of villages by adopted innovations. Villages without adoptions count zero.
pub fn village_tallies(
    dataset: &Dataset,
    statuses: &[ClaimStatus],
    province: Option<&str>,
    category: Option<IdmCategory>,
) -> Vec<Tally> {
    let adoptions = village_adoptions(dataset, statuses);
    dataset
        .villages
        .iter()
        .filter(|village| province.map_or(true, |province| village.province == province))
        .filter(|village| category.map_or(true, |category| village.category() == category))
        .map(|village| {
            Tally::with_id(
                &village.id,
                &village.name,
                count_of(&adoptions, &village.id),
            )
        })
        .collect()
}

/// Tallies of innovations by adopting villages.
pub fn innovation_tallies(
    dataset: &Dataset,
    statuses: &[ClaimStatus],
    category: Option<&str>,
) -> Vec<Tally> {
    let adoptions = innovation_adoptions(dataset, statuses);
    dataset
        .innovations
        .iter()
        .filter(|innovation| category.map_or(true, |category| innovation.category == category))
        .map(|innovation| {
            Tally::with_id(
                &innovation.id,
                &innovation.name,
                count_of(&adoptions, &innovation.id),
            )
        })
        .collect()
}

/// Tallies of innovators by the chosen metric.
pub fn innovator_tallies(
    dataset: &Dataset,
    statuses: &[ClaimStatus],
    metric: InnovatorMetric,
    category: Option<&str>,
) -> Vec<Tally> {
    let counts = match metric {
        InnovatorMetric::Villages => innovator_reach(dataset, statuses),
        InnovatorMetric::Innovations => aggregation::count_ids(
            dataset
                .innovations
                .iter()
                .map(|innovation| innovation.innovator_id.as_str()),
        ),
    };
    dataset
        .innovators
        .iter()
        .filter(|innovator| category.map_or(true, |category| innovator.category == category))
        .map(|innovator| {
            Tally::with_id(
                &innovator.id,
                &innovator.name,
                count_of(&counts, &innovator.id),
            )
        })
        .collect()
}

/// Year buckets of innovations or claims.
///
/// Without a range, single-year buckets cover the years present. Claims are bucketed by the year
/// of submission and orphaned claims are skipped.
pub fn years(dataset: &Dataset, request: &YearsRequest) -> Vec<YearBucket> {
    let years: Vec<i32> = match request.entity {
        YearEntity::Innovations => dataset
            .innovations
            .iter()
            .filter_map(|innovation| innovation.year)
            .collect(),
        YearEntity::Claims => dataset
            .adoptions(&request.statuses)
            .filter_map(|adoption| adoption.claim.submitted_year)
            .collect(),
    };
    match request
        .range
        .or_else(|| aggregation::covering_range(years.iter().copied()))
    {
        Some(range) => aggregation::year_buckets(&range, years),
        None => vec![],
    }
}

/// A claim with the names of the documents it references.
pub fn claim_row(dataset: &Dataset, claim: &Claim) -> ClaimRow {
    let innovation = dataset.innovation(&claim.innovation_id);
    ClaimRow {
        id: claim.id.clone(),
        status: claim.status,
        village_id: claim.village_id.clone(),
        village_name: dataset
            .village(&claim.village_id)
            .map(|village| village.name.clone()),
        innovation_id: claim.innovation_id.clone(),
        innovation_name: innovation.map(|innovation| innovation.name.clone()),
        innovator_name: innovation
            .and_then(|innovation| dataset.innovator(&innovation.innovator_id))
            .map(|innovator| innovator.name.clone()),
        evidence_count: claim.evidence.len(),
        submitted_year: claim.submitted_year,
    }
}

/// Page of the claims table, newest first.
///
/// Orphaned claims are listed with their unresolved names left empty so that an administrator
/// can find them.
pub fn claims_table(dataset: &Dataset, request: &ClaimsRequest) -> Page<ClaimRow> {
    let statuses = request.statuses.as_deref().unwrap_or(&ClaimStatus::ALL);
    let mut claims: Vec<&Claim> = dataset
        .claims
        .iter()
        .filter(|claim| statuses.contains(&claim.status))
        .filter(|claim| {
            request
                .village_id
                .as_ref()
                .map_or(true, |id| &claim.village_id == id)
        })
        .filter(|claim| {
            request
                .innovation_id
                .as_ref()
                .map_or(true, |id| &claim.innovation_id == id)
        })
        .collect();
    claims.sort_by(|a, b| {
        b.submitted_year
            .cmp(&a.submitted_year)
            .then_with(|| a.id.cmp(&b.id))
    });
    let rows = claims
        .into_iter()
        .map(|claim| claim_row(dataset, claim))
        .collect();
    paginate(rows, request.page, request.page_size)
}

/// Rank arbitrary items.
pub struct Rank {}

impl Operation for Rank {
    const NAME: &'static str = "rank";
    type Request = RankRequest;
    type Output = Vec<Ranked>;

    fn execute(request: &RankRequest, _dataset: &Dataset) -> Result<Vec<Ranked>, DashboardError> {
        Ok(ranking::rank(request.items.iter().cloned(), request.limit))
    }
}

/// Rank villages by the number of innovations they adopted.
pub struct TopVillages {}

impl Operation for TopVillages {
    const NAME: &'static str = "top/villages";
    type Request = TopVillagesRequest;
    type Output = Leaderboard;

    fn execute(
        request: &TopVillagesRequest,
        dataset: &Dataset,
    ) -> Result<Leaderboard, DashboardError> {
        let candidates = village_tallies(
            dataset,
            &request.statuses,
            request.province.as_deref(),
            request.category,
        );
        Ok(leaderboard(candidates, Some(request.limit)))
    }
}

/// Rank innovations by the number of villages that adopted them.
pub struct TopInnovations {}

impl Operation for TopInnovations {
    const NAME: &'static str = "top/innovations";
    type Request = TopInnovationsRequest;
    type Output = Leaderboard;

    fn execute(
        request: &TopInnovationsRequest,
        dataset: &Dataset,
    ) -> Result<Leaderboard, DashboardError> {
        let candidates =
            innovation_tallies(dataset, &request.statuses, request.category.as_deref());
        Ok(leaderboard(candidates, Some(request.limit)))
    }
}

/// Rank innovators by villages reached or innovations introduced.
pub struct TopInnovators {}

impl Operation for TopInnovators {
    const NAME: &'static str = "top/innovators";
    type Request = TopInnovatorsRequest;
    type Output = Leaderboard;

    fn execute(
        request: &TopInnovatorsRequest,
        dataset: &Dataset,
    ) -> Result<Leaderboard, DashboardError> {
        let candidates = innovator_tallies(
            dataset,
            &request.statuses,
            request.metric,
            request.category.as_deref(),
        );
        Ok(leaderboard(candidates, Some(request.limit)))
    }
}

/// Villages and adoptions per province, with map legend levels.
pub struct Provinces {}

impl Operation for Provinces {
    const NAME: &'static str = "provinces";
    type Request = ProvincesRequest;
    type Output = Vec<ProvinceCount>;

    fn execute(
        request: &ProvincesRequest,
        dataset: &Dataset,
    ) -> Result<Vec<ProvinceCount>, DashboardError> {
        let adoptions = village_adoptions(dataset, &request.statuses);
        Ok(aggregation::province_choropleth(
            &dataset.villages,
            &adoptions,
            request.levels,
        ))
    }
}

/// Innovations or claims per bucket of years.
pub struct Years {}

impl Operation for Years {
    const NAME: &'static str = "years";
    type Request = YearsRequest;
    type Output = Vec<YearBucket>;

    fn execute(
        request: &YearsRequest,
        dataset: &Dataset,
    ) -> Result<Vec<YearBucket>, DashboardError> {
        Ok(years(dataset, request))
    }
}

/// Villages, innovations or innovators per category.
pub struct Categories {}

impl Operation for Categories {
    const NAME: &'static str = "categories";
    type Request = CategoriesRequest;
    type Output = Vec<Tally>;

    fn execute(
        request: &CategoriesRequest,
        dataset: &Dataset,
    ) -> Result<Vec<Tally>, DashboardError> {
        let breakdown = match request.entity {
            CategoryEntity::Villages => aggregation::idm_breakdown(&dataset.villages),
            CategoryEntity::Innovations => aggregation::category_breakdown(
                dataset
                    .innovations
                    .iter()
                    .map(|innovation| &innovation.category),
            ),
            CategoryEntity::Innovators => aggregation::category_breakdown(
                dataset
                    .innovators
                    .iter()
                    .map(|innovator| &innovator.category),
            ),
        };
        Ok(breakdown)
    }
}

/// Paginated table of claims.
pub struct Claims {}

impl Operation for Claims {
    const NAME: &'static str = "claims";
    type Request = ClaimsRequest;
    type Output = Page<ClaimRow>;

    fn execute(
        request: &ClaimsRequest,
        dataset: &Dataset,
    ) -> Result<Page<ClaimRow>, DashboardError> {
        Ok(claims_table(dataset, request))
    }
}

/// Names of all operations, in API order.
pub const NAMES: [&str; 8] = [
    Rank::NAME,
    TopVillages::NAME,
    TopInnovations::NAME,
    TopInnovators::NAME,
    Provinces::NAME,
    Years::NAME,
    Categories::NAME,
    Claims::NAME,
];
