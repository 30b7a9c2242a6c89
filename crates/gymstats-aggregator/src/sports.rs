//! Sport popularity among active members

use gymstats_common::{share_percent, MemberProfile, SportId};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// One sport's share of the active members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportShare {
    /// Sport identifier
    pub sport_id: SportId,
    /// Sport name
    pub name: String,
    /// Active members practicing the sport
    pub count: usize,
    /// `count` as a percentage of all active members, two decimals
    pub percentage: f64,
}

/// The `limit` most practiced sports, by member count then sport id.
///
/// Percentages are relative to every active member passed in, including
/// those without a sport.
#[instrument(skip(active_members), fields(active = active_members.len()))]
pub fn top_sports(active_members: &[&MemberProfile], limit: usize) -> Vec<SportShare> {
    let mut counts: HashMap<SportId, (&str, usize)> = HashMap::new();
    for sport in active_members.iter().filter_map(|profile| profile.sport.as_ref()) {
        counts.entry(sport.id).or_insert((sport.name.as_str(), 0)).1 += 1;
    }

    let mut ranked: Vec<(SportId, &str, usize)> = counts
        .into_iter()
        .map(|(id, (name, count))| (id, name, count))
        .collect();
    ranked.sort_by_key(|&(id, _, count)| (Reverse(count), id));
    ranked.truncate(limit);

    let total = active_members.len();
    let shares: Vec<SportShare> = ranked
        .into_iter()
        .map(|(sport_id, name, count)| SportShare {
            sport_id,
            name: name.to_string(),
            count,
            percentage: share_percent(count, total),
        })
        .collect();
    debug!(sports = shares.len(), "Ranked sports");
    shares
}
