//! Ranking with ties.
//!
//! Every leaderboard on the dashboards is produced by [rank]: items are ordered by count
//! (descending) then by name (ascending), and assigned a standard competition rank (`1, 2, 2, 4`)
//! with an English ordinal label. A fixed-size layout may request exactly `N` entries, in which
//! case the list is truncated or padded with placeholder entries.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use validator::Validate;

/// Name of the entries used to pad a ranking to a fixed size.
pub const PLACEHOLDER_NAME: &str = "-";

/// A named count to be ranked.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Tally {
    /// ID of the ranked document, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub count: u64,
}

impl Tally {
    /// Return a new Tally without a document ID.
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Tally {
            id: None,
            name: name.into(),
            count,
        }
    }

    /// Return a new Tally for a document.
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, count: u64) -> Self {
        Tally {
            id: Some(id.into()),
            name: name.into(),
            count,
        }
    }

    /// Return a padding entry.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_NAME, 0)
    }

    /// Whether this is a padding entry.
    pub fn is_placeholder(&self) -> bool {
        self.id.is_none() && self.count == 0 && self.name == PLACEHOLDER_NAME
    }
}

impl From<Ranked> for Tally {
    fn from(ranked: Ranked) -> Self {
        Tally {
            id: ranked.id,
            name: ranked.name,
            count: ranked.count,
        }
    }
}

/// Podium position for the top three ranks
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// Returns the medal awarded for a competition rank, if any.
    pub fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            3 => Some(Self::Bronze),
            _ => None,
        }
    }
}

/// A ranked entry.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ranked {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub count: u64,
    /// Competition rank, starting at 1
    pub rank: usize,
    /// Ordinal label of the rank, e.g. "2nd"
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medal: Option<Medal>,
}

/// Returns the English ordinal label for a number, e.g. `1st`, `12th`, `22nd`.
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Display order of tallies: count descending, placeholders after real entries with the same
/// count, then name ascending. The ID breaks any remaining tie so that the order is total.
fn display_order(a: &Tally, b: &Tally) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.is_placeholder().cmp(&b.is_placeholder()))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Rank tallies using standard competition ranking.
///
/// Returns the tallies in display order annotated with their rank, ordinal label and podium
/// medal. Entries with equal counts share a rank and the following rank is skipped accordingly.
///
/// # Arguments
///
/// * `items`: Tallies to rank
/// * `limit`: Optional fixed size of the output. The ranking is truncated to the top `limit`
///   entries, or padded with placeholder entries (`"-"`, count 0) when there are fewer.
pub fn rank<I>(items: I, limit: Option<usize>) -> Vec<Ranked>
where
    I: IntoIterator<Item = Tally>,
{
    let mut items: Vec<Tally> = items.into_iter().collect();
    items.sort_by(display_order);
    if let Some(limit) = limit {
        // Ranks only depend on entries with a greater count, all of which precede an entry, so
        // truncating before ranking does not change them.
        items.truncate(limit);
        items.resize_with(limit, Tally::placeholder);
    }

    let mut ranked: Vec<Ranked> = Vec::with_capacity(items.len());
    let mut current_rank = 0;
    for (position, item) in items.into_iter().enumerate() {
        let tied = ranked
            .last()
            .map_or(false, |previous| previous.count == item.count);
        if !tied {
            current_rank = position + 1;
        }
        let medal = if item.is_placeholder() {
            None
        } else {
            Medal::for_rank(current_rank)
        };
        ranked.push(Ranked {
            id: item.id,
            name: item.name,
            count: item.count,
            rank: current_rank,
            label: ordinal(current_rank),
            medal,
        });
    }
    ranked
}

/// Returns the competition rank of the entry with the given ID, if present.
pub fn rank_of<'a>(ranked: &'a [Ranked], id: &str) -> Option<&'a Ranked> {
    ranked.iter().find(|entry| entry.id.as_deref() == Some(id))
}
