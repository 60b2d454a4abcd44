use tourney_common::{
    data::Tournament,
    store::{DataStore, Query, RecordStore},
};

use super::error::PublicError;

/// Active tournaments, soonest first.
pub(crate) async fn active_tournaments(store: &dyn DataStore) -> Result<Vec<Tournament>, PublicError> {
    let query = Query::all().where_eq("is_active", true).asc("date");
    Ok(store.fetch(&query).await?)
}

pub(crate) async fn tournament_details(
    store: &dyn DataStore,
    id: &str,
) -> Result<Tournament, PublicError> {
    Ok(store.fetch_one(id).await?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::fixtures::new_tournament;
    use chrono::{Duration, TimeZone, Utc};
    use tourney_common::{data::TournamentType, memory_store::MemoryStore};

    #[tokio::test]
    async fn test_lists_only_active_by_date() {
        let store = MemoryStore::new();
        let base = Utc.with_ymd_and_hms(2026, 11, 1, 18, 0, 0).unwrap();
        for (name, offset_days, active) in [("late", 5, true), ("hidden", 1, false), ("soon", 2, true)] {
            let mut new = new_tournament(name, TournamentType::Free, 0);
            new.date = base + Duration::days(offset_days);
            new.is_active = active;
            let _: Tournament = store.create(&new).await.expect("Tournament should be stored");
        }

        let names: Vec<String> = active_tournaments(&store)
            .await
            .expect("Listing should succeed")
            .into_iter()
            .map(|tournament| tournament.name)
            .collect();
        assert_eq!(names, vec!["soon", "late"]);
    }

    #[tokio::test]
    async fn test_unknown_tournament_is_an_error() {
        let store = MemoryStore::new();
        assert!(tournament_details(&store, "missing").await.is_err());
    }
}
