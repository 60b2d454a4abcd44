use serde::Serialize;
use std::collections::HashMap;

use tourney_common::{
    data::{LeaderboardEntry, PaymentStatus, Registration, Tournament, TournamentType},
    store::{DataStore, Query, RecordStore},
};

use super::error::PublicError;
use crate::common::search::{filter_by_search, Searchable};

/// Leaderboard row with the tournament it belongs to and the payment status
/// of the registration it mirrors. The payment status is read live, so a
/// rejected registration shows up next to a still-active entry.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct StandingView {
    #[serde(flatten)]
    pub(crate) entry: LeaderboardEntry,
    pub(crate) tournament_name: Option<String>,
    pub(crate) tournament_type: Option<TournamentType>,
    pub(crate) payment_status: Option<PaymentStatus>,
}

impl Searchable for StandingView {
    fn search_fields(&self) -> [&str; 3] {
        self.entry.search_fields()
    }
}

/// Tournament standings in page order, optionally narrowed by a search term.
/// Filtering happens over the fetched list only.
pub(crate) async fn standings(
    store: &dyn DataStore,
    tournament_id: &str,
    search: Option<&str>,
) -> Result<Vec<StandingView>, PublicError> {
    let query = Query::all()
        .where_eq("tournament_id", tournament_id)
        .asc("rank")
        .desc("points")
        .desc("created_at");
    let entries: Vec<LeaderboardEntry> = store.fetch(&query).await?;

    let tournaments: Vec<Tournament> =
        store.fetch(&Query::all().where_eq("id", tournament_id)).await?;
    let tournament = tournaments.into_iter().next();
    let registrations: Vec<Registration> =
        store.fetch(&Query::all().where_eq("tournament_id", tournament_id)).await?;
    let payments: HashMap<String, PaymentStatus> = registrations
        .into_iter()
        .map(|registration| (registration.registration_id, registration.payment_status))
        .collect();

    let views: Vec<StandingView> = entries
        .into_iter()
        .map(|entry| StandingView {
            tournament_name: tournament.as_ref().map(|tournament| tournament.name.clone()),
            tournament_type: tournament.as_ref().map(|tournament| tournament.kind),
            payment_status: payments.get(&entry.registration_id).copied(),
            entry,
        })
        .collect();
    Ok(match search {
        Some(term) => filter_by_search(&views, term),
        None => views,
    })
}
