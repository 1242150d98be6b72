//! Grouping and counting over document collections.
//!
//! These are the building blocks of the dashboard charts: tallies by key, year-range buckets,
//! province choropleth levels and per-category breakdowns. They are pure functions over
//! in-memory slices.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::ranking::Tally;
use crate::types::{Claim, ClaimStatus, IdmCategory, Readiness, Village};

/// Maximum number of buckets a year range may produce.
pub const MAX_YEAR_BUCKETS: i64 = 200;

/// Count occurrences of each key.
///
/// Returns one [Tally] per distinct key, ordered by name.
pub fn tally<I, K>(keys: I) -> Vec<Tally>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    for key in keys {
        let key = key.as_ref();
        match counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                counts.insert(key.to_string(), 1);
            }
        }
    }
    let mut tallies: Vec<Tally> = counts
        .into_iter()
        .map(|(name, count)| Tally::new(name, count))
        .collect();
    tallies.sort_by(|a, b| a.name.cmp(&b.name));
    tallies
}

/// Count occurrences of each ID.
pub fn count_ids<'a, I>(ids: I) -> HashMap<&'a str, u64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = HashMap::new();
    for id in ids {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

/// A contiguous, inclusive range of years split into buckets of equal width.
///
/// The final bucket is narrower when the range does not divide evenly.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_year_range"))]
pub struct YearRange {
    /// First year of the range
    pub start: i32,
    /// Last year of the range
    pub end: i32,
    /// Number of years per bucket
    #[serde(default = "default_width")]
    #[validate(range(min = 1, message = "width must be greater than 0"))]
    pub width: u32,
}

fn default_width() -> u32 {
    1
}

impl YearRange {
    /// Return a new YearRange object.
    pub fn new(start: i32, end: i32, width: u32) -> Self {
        YearRange { start, end, width }
    }

    /// Number of buckets in the range.
    pub fn num_buckets(&self) -> i64 {
        let span = i64::from(self.end) - i64::from(self.start) + 1;
        let width = i64::from(self.width.max(1));
        if span <= 0 {
            0
        } else {
            (span + width - 1) / width
        }
    }
}

/// Validate a year range
fn validate_year_range(range: &YearRange) -> Result<(), ValidationError> {
    if range.start > range.end {
        let mut error = ValidationError::new("Year range start must not be after end");
        error.add_param("start".into(), &range.start);
        error.add_param("end".into(), &range.end);
        return Err(error);
    }
    if range.num_buckets() > MAX_YEAR_BUCKETS {
        let mut error = ValidationError::new("Year range produces too many buckets");
        error.add_param("buckets".into(), &range.num_buckets());
        error.add_param("max".into(), &MAX_YEAR_BUCKETS);
        return Err(error);
    }
    Ok(())
}

/// Count of records falling into a bucket of years
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct YearBucket {
    /// "2020" for a single year, "2020-2022" for a wider bucket
    pub label: String,
    pub start: i32,
    pub end: i32,
    pub count: u64,
}

/// Count years into the buckets of a range.
///
/// Every bucket of the range is returned, including empty ones. Years outside the range are
/// ignored.
pub fn year_buckets<I>(range: &YearRange, years: I) -> Vec<YearBucket>
where
    I: IntoIterator<Item = i32>,
{
    let width = i64::from(range.width.max(1));
    let start = i64::from(range.start);
    let end = i64::from(range.end);
    let mut buckets: Vec<YearBucket> = (0..range.num_buckets())
        .map(|index| {
            let bucket_start = start + index * width;
            let bucket_end = (bucket_start + width - 1).min(end);
            // Both bounds lie within [range.start, range.end].
            let bucket_start = bucket_start as i32;
            let bucket_end = bucket_end as i32;
            let label = if bucket_start == bucket_end {
                bucket_start.to_string()
            } else {
                format!("{bucket_start}-{bucket_end}")
            };
            YearBucket {
                label,
                start: bucket_start,
                end: bucket_end,
                count: 0,
            }
        })
        .collect();
    for year in years {
        let year = i64::from(year);
        if year < start || year > end {
            continue;
        }
        let index = ((year - start) / width) as usize;
        buckets[index].count += 1;
    }
    buckets
}

/// Smallest range covering all the given years, if any.
///
/// Buckets are single years unless that would exceed [MAX_YEAR_BUCKETS], in which case the
/// width is the smallest that keeps within it.
pub fn covering_range<I>(years: I) -> Option<YearRange>
where
    I: IntoIterator<Item = i32>,
{
    let mut bounds: Option<(i32, i32)> = None;
    for year in years {
        bounds = Some(match bounds {
            None => (year, year),
            Some((min, max)) => (min.min(year), max.max(year)),
        });
    }
    bounds.map(|(start, end)| {
        let span = i64::from(end) - i64::from(start) + 1;
        let width = (span + MAX_YEAR_BUCKETS - 1) / MAX_YEAR_BUCKETS;
        // At most 2^32 / MAX_YEAR_BUCKETS.
        YearRange::new(start, end, u32::try_from(width).unwrap_or(u32::MAX))
    })
}

/// Aggregated figures for one province of the map
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProvinceCount {
    pub province: String,
    /// Number of villages in the province
    pub villages: u64,
    /// Number of adoptions by villages in the province
    pub adoptions: u64,
    /// Colour level on the map legend, from 0 to the requested number of levels
    pub level: u32,
}

/// Aggregate villages and adoptions per province.
///
/// The level of a province is `ceil(adoptions * levels / max_adoptions)`, so that the province
/// with the most adoptions has the top level and provinces without adoptions have level 0.
///
/// # Arguments
///
/// * `villages`: All villages
/// * `adoptions`: Number of adoptions per village ID
/// * `levels`: Number of non-zero legend levels
pub fn province_choropleth(
    villages: &[Village],
    adoptions: &HashMap<&str, u64>,
    levels: u32,
) -> Vec<ProvinceCount> {
    let mut provinces: HashMap<&str, (u64, u64)> = HashMap::new();
    for village in villages {
        let entry = provinces.entry(village.province.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += adoptions.get(village.id.as_str()).copied().unwrap_or(0);
    }
    let max_adoptions = provinces
        .values()
        .map(|(_, adoptions)| *adoptions)
        .max()
        .unwrap_or(0);
    let mut counts: Vec<ProvinceCount> = provinces
        .into_iter()
        .map(|(province, (villages, adoptions))| ProvinceCount {
            province: province.to_string(),
            villages,
            adoptions,
            level: legend_level(adoptions, max_adoptions, levels),
        })
        .collect();
    counts.sort_by(|a, b| a.province.cmp(&b.province));
    counts
}

/// Level of a value on a legend of `levels` steps with maximum `max`.
fn legend_level(value: u64, max: u64, levels: u32) -> u32 {
    if max == 0 || value == 0 {
        return 0;
    }
    let levels = u64::from(levels);
    let level = (value * levels + max - 1) / max;
    // level <= levels, which came from a u32.
    level.min(levels) as u32
}

/// Count villages per IDM category.
///
/// All known categories are returned in order of development, including empty ones. The unknown
/// category is only included when some village has no category.
pub fn idm_breakdown(villages: &[Village]) -> Vec<Tally> {
    let mut counts: HashMap<IdmCategory, u64> = HashMap::new();
    for village in villages {
        *counts.entry(village.category()).or_insert(0) += 1;
    }
    IdmCategory::ALL
        .iter()
        .filter_map(|category| {
            let count = counts.get(category).copied().unwrap_or(0);
            if *category == IdmCategory::Unknown && count == 0 {
                None
            } else {
                Some(Tally::new(category.to_string(), count))
            }
        })
        .collect()
}

/// Count records per free-text category.
///
/// Ordered by count descending, then by category name.
pub fn category_breakdown<I, K>(categories: I) -> Vec<Tally>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let mut tallies = tally(categories);
    tallies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    tallies
}

/// Number of claims per verification status
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StatusSummary {
    pub menunggu: u64,
    pub terverifikasi: u64,
    pub ditolak: u64,
    pub total: u64,
}

impl StatusSummary {
    /// Returns the count for a status.
    pub fn get(&self, status: ClaimStatus) -> u64 {
        match status {
            ClaimStatus::Menunggu => self.menunggu,
            ClaimStatus::Terverifikasi => self.terverifikasi,
            ClaimStatus::Ditolak => self.ditolak,
        }
    }
}

/// Count claims per verification status.
pub fn claim_status_summary<'a, I>(claims: I) -> StatusSummary
where
    I: IntoIterator<Item = &'a Claim>,
{
    let mut summary = StatusSummary::default();
    for claim in claims {
        match claim.status {
            ClaimStatus::Menunggu => summary.menunggu += 1,
            ClaimStatus::Terverifikasi => summary.terverifikasi += 1,
            ClaimStatus::Ditolak => summary.ditolak += 1,
        }
        summary.total += 1;
    }
    summary
}

/// Mean readiness scores over the villages that recorded them
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ReadinessSummary {
    /// Number of villages with readiness scores
    pub villages: u64,
    pub mean: Readiness,
}

/// Average the readiness scores of villages.
pub fn readiness_summary(villages: &[Village]) -> ReadinessSummary {
    let mut summary = ReadinessSummary::default();
    let mut total = Readiness::default();
    for readiness in villages.iter().filter_map(|village| village.readiness) {
        summary.villages += 1;
        total.infrastructure += readiness.infrastructure;
        total.digital_literacy += readiness.digital_literacy;
        total.governance += readiness.governance;
        total.economy += readiness.economy;
    }
    if summary.villages > 0 {
        let n = summary.villages as f64;
        summary.mean = Readiness {
            infrastructure: total.infrastructure / n,
            digital_literacy: total.digital_literacy / n,
            governance: total.governance / n,
            economy: total.economy / n,
        };
    }
    summary
}
