use futures::future::join_all;
use std::sync::Arc;

use crate::core::filters::{distance_within, matches_skill_level};
use crate::models::{Distance, PlayerProfile, SearchCriteria, SearchResultEntry};
use crate::services::Geocoder;

/// Player search orchestrator - implements the filtering pipeline
///
/// # Pipeline Stages
/// 1. Skill level filter
/// 2. Rating derivation
/// 3. Concurrent geocoding of every remaining player
/// 4. Radius filter and distance annotation (only when origin and radius are given)
#[derive(Clone)]
pub struct PlayerSearch {
    geocoder: Arc<dyn Geocoder>,
}

impl PlayerSearch {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Filter and annotate `roster` according to `criteria`.
    ///
    /// Output follows roster order. A player whose postal code cannot be
    /// resolved is kept as "Unknown location" without a distance filter and
    /// dropped with one. An unresolvable origin yields no results.
    pub async fn search(
        &self,
        roster: Vec<PlayerProfile>,
        criteria: &SearchCriteria,
    ) -> Vec<SearchResultEntry> {
        let total_candidates = roster.len();

        let players: Vec<PlayerProfile> = roster
            .into_iter()
            .filter(|profile| matches_skill_level(profile, criteria.skill_level))
            .collect();

        // join_all yields results in input order, whatever order lookups finish in
        let locations = join_all(
            players
                .iter()
                .map(|profile| self.geocoder.resolve(&profile.zipcode)),
        )
        .await;

        let entries: Vec<SearchResultEntry> = players
            .into_iter()
            .zip(locations)
            .map(|(profile, location)| SearchResultEntry::new(profile, location))
            .collect();

        let Some((origin_code, radius_miles)) = criteria.distance_filter() else {
            tracing::debug!(
                "Search kept {} of {} players (no distance filter)",
                entries.len(),
                total_candidates
            );
            return entries;
        };

        let Some(origin) = self.geocoder.resolve(origin_code).await else {
            tracing::info!("Origin postal code {:?} could not be resolved, returning no players", origin_code);
            return Vec::new();
        };

        let results: Vec<SearchResultEntry> = entries
            .into_iter()
            .filter_map(|entry| {
                let location = entry.location.as_ref()?;
                let miles = distance_within(&origin, location, radius_miles)?;
                Some(entry.with_distance(Distance::Miles(miles.round() as u64)))
            })
            .collect();

        tracing::debug!(
            "Search kept {} of {} players within {} mi of {}",
            results.len(),
            total_candidates,
            radius_miles,
            origin_code
        );

        results
    }
}
