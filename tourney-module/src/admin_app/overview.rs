use serde::Serialize;
use std::collections::HashMap;

use tourney_common::{
    data::{
        ContactQuery, EntryStatus, LeaderboardEntry, PaymentStatus, QueryStatus, Registration,
        Tournament,
    },
    store::{DataStore, Query, RecordStore},
};

use super::error::AdminError;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub(crate) struct OverviewStats {
    pub(crate) active_tournaments: usize,
    pub(crate) total_registrations: usize,
    pub(crate) revenue: u64,
    pub(crate) unread_queries: usize,
    pub(crate) active_participants: usize,
    pub(crate) pending_verifications: usize,
}

impl OverviewStats {
    pub(crate) fn compute(
        tournaments: &[Tournament],
        registrations: &[Registration],
        entries: &[LeaderboardEntry],
        queries: &[ContactQuery],
    ) -> Self {
        let fees: HashMap<&str, u64> = tournaments
            .iter()
            .filter(|tournament| tournament.is_paid())
            .map(|tournament| (tournament.id.as_str(), tournament.entry_fee))
            .collect();
        let revenue = registrations
            .iter()
            .filter(|registration| registration.payment_status == PaymentStatus::Verified)
            .filter_map(|registration| fees.get(registration.tournament_id.as_str()))
            .sum();

        OverviewStats {
            active_tournaments: tournaments.iter().filter(|t| t.is_active).count(),
            total_registrations: registrations.len(),
            revenue,
            unread_queries: queries.iter().filter(|q| q.status == QueryStatus::Unread).count(),
            active_participants: entries.iter().filter(|e| e.status == EntryStatus::Active).count(),
            pending_verifications: registrations
                .iter()
                .filter(|r| r.payment_status == PaymentStatus::Pending)
                .count(),
        }
    }
}

pub(crate) async fn overview(store: &dyn DataStore) -> Result<OverviewStats, AdminError> {
    let tournaments: Vec<Tournament> = store.fetch(&Query::all()).await?;
    let registrations: Vec<Registration> = store.fetch(&Query::all()).await?;
    let entries: Vec<LeaderboardEntry> = store.fetch(&Query::all()).await?;
    let queries: Vec<ContactQuery> = store.fetch(&Query::all()).await?;
    Ok(OverviewStats::compute(&tournaments, &registrations, &entries, &queries))
}
