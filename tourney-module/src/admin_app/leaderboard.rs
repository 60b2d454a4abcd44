use log::{error, info};
use serde::Serialize;
use std::sync::Arc;

use tourney_common::{
    data::{LeaderboardEntry, LeaderboardPatch},
    store::{DataStore, Query, RecordStore},
};

use super::error::AdminError;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub(crate) struct RankUpdate {
    pub(crate) entry_id: String,
    pub(crate) team_name: String,
    pub(crate) points: u32,
    pub(crate) rank: u32,
}

/// Assigns ranks 1..=n by points, highest first. Equal points keep the
/// earlier entry ahead, then the incoming order.
pub(crate) fn compute_ranks(entries: &[LeaderboardEntry]) -> Vec<RankUpdate> {
    let mut ordered: Vec<&LeaderboardEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| b.points.cmp(&a.points).then(a.created_at.cmp(&b.created_at)));
    ordered
        .into_iter()
        .zip(1u32..)
        .map(|(entry, rank)| RankUpdate {
            entry_id: entry.id.clone(),
            team_name: entry.team_name.clone(),
            points: entry.points,
            rank,
        })
        .collect()
}

pub(crate) struct LeaderboardManager {
    store: Arc<dyn DataStore>,
}

impl LeaderboardManager {
    pub(crate) fn new(store: Arc<dyn DataStore>) -> Self {
        LeaderboardManager { store }
    }

    pub(crate) async fn entries(
        &self,
        tournament_id: &str,
    ) -> Result<Vec<LeaderboardEntry>, AdminError> {
        let query = Query::all().where_eq("tournament_id", tournament_id).asc("rank").desc("points");
        Ok(self.store.fetch(&query).await?)
    }

    /// Writes only the given entry; other ranks are left as they are.
    pub(crate) async fn edit_entry(
        &self,
        id: &str,
        patch: LeaderboardPatch,
    ) -> Result<(), AdminError> {
        if patch.is_empty() {
            return Err(AdminError::EmptyUpdate);
        }
        self.store.patch::<LeaderboardEntry, _>(id, &patch).await?;
        info!("Leaderboard entry updated, id: {}", id);
        Ok(())
    }

    /// Re-ranks every entry of a tournament by points. Writes are issued one
    /// by one; a failure stops the pass and reports how many landed.
    pub(crate) async fn auto_rank(&self, tournament_id: &str) -> Result<Vec<RankUpdate>, AdminError> {
        let query = Query::all()
            .where_eq("tournament_id", tournament_id)
            .desc("points")
            .asc("created_at");
        let entries: Vec<LeaderboardEntry> = self.store.fetch(&query).await?;
        let updates = compute_ranks(&entries);
        let total = updates.len();

        for (applied, update) in updates.iter().enumerate() {
            let patch = LeaderboardPatch {
                rank: Some(update.rank),
                ..Default::default()
            };
            let written = self.store.patch::<LeaderboardEntry, _>(&update.entry_id, &patch).await;
            if let Err(source) = written {
                error!(
                    "Auto-rank of {} stopped at {}/{}: {}",
                    tournament_id, applied, total, source
                );
                return Err(AdminError::PartialRank {
                    applied,
                    total,
                    source,
                });
            }
        }
        info!("Auto-ranked {} entries of tournament {}", total, tournament_id);
        Ok(updates)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::fixtures::leaderboard_entry;
    use chrono::Duration;
    use tourney_common::{
        data::{EntryStatus, NewLeaderboardEntry},
        memory_store::MemoryStore,
    };

    async fn seed(store: &MemoryStore, tournament_id: &str, team: &str, points: u32) -> LeaderboardEntry {
        let entry = NewLeaderboardEntry {
            tournament_id: tournament_id.to_owned(),
            registration_id: format!("REG-{}", team),
            team_name: team.to_owned(),
            leader_name: format!("{} lead", team),
            points,
            rank: 0,
            status: EntryStatus::Active,
        };
        store.create(&entry).await.expect("Entry should be stored")
    }

    async fn ranks_by_team(store: &MemoryStore, tournament_id: &str) -> Vec<(String, u32)> {
        let entries: Vec<LeaderboardEntry> = store
            .fetch(&Query::all().where_eq("tournament_id", tournament_id))
            .await
            .expect("Entries should load");
        entries.into_iter().map(|entry| (entry.team_name, entry.rank)).collect()
    }

    #[test]
    fn test_compute_ranks_orders_by_points() {
        let entries = vec![
            leaderboard_entry("a", "REG-1", "A", "a", 50),
            leaderboard_entry("b", "REG-2", "B", "b", 80),
            leaderboard_entry("c", "REG-3", "C", "c", 80),
            leaderboard_entry("d", "REG-4", "D", "d", 10),
        ];
        let ranks: Vec<(String, u32)> = compute_ranks(&entries)
            .into_iter()
            .map(|update| (update.entry_id, update.rank))
            .collect();
        assert_eq!(
            ranks,
            vec![
                ("b".to_owned(), 1),
                ("c".to_owned(), 2),
                ("a".to_owned(), 3),
                ("d".to_owned(), 4)
            ]
        );
    }

    #[test]
    fn test_compute_ranks_prefers_earlier_entry_on_tie() {
        let mut late = leaderboard_entry("late", "REG-1", "Late", "l", 40);
        late.created_at += Duration::minutes(5);
        let early = leaderboard_entry("early", "REG-2", "Early", "e", 40);
        let updates = compute_ranks(&[late, early]);
        assert_eq!(updates[0].entry_id, "early");
        assert_eq!(updates[1].entry_id, "late");
        assert!(compute_ranks(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_auto_rank_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        for (team, points) in [("A", 50), ("B", 80), ("C", 80), ("D", 10)] {
            seed(&store, "t1", team, points).await;
        }
        seed(&store, "t2", "Other", 99).await;
        let manager = LeaderboardManager::new(store.clone());

        manager.auto_rank("t1").await.expect("Auto-rank should succeed");
        let first = ranks_by_team(&store, "t1").await;
        assert_eq!(
            first,
            vec![("A".to_owned(), 3), ("B".to_owned(), 1), ("C".to_owned(), 2), ("D".to_owned(), 4)]
        );

        manager.auto_rank("t1").await.expect("Auto-rank should succeed");
        assert_eq!(ranks_by_team(&store, "t1").await, first);
        assert_eq!(ranks_by_team(&store, "t2").await, vec![("Other".to_owned(), 0)]);
    }

    #[tokio::test]
    async fn test_edit_entry_touches_one_row() {
        let store = Arc::new(MemoryStore::new());
        let a = seed(&store, "t1", "A", 10).await;
        seed(&store, "t1", "B", 20).await;
        let manager = LeaderboardManager::new(store.clone());
        manager.auto_rank("t1").await.expect("Auto-rank should succeed");

        let patch = LeaderboardPatch {
            points: Some(30),
            status: Some(EntryStatus::Eliminated),
            ..Default::default()
        };
        manager.edit_entry(&a.id, patch).await.expect("Edit should succeed");

        let entries = manager.entries("t1").await.expect("Entries should load");
        let b = entries.iter().find(|entry| entry.team_name == "B").expect("B should exist");
        let a = entries.iter().find(|entry| entry.team_name == "A").expect("A should exist");
        assert_eq!((a.points, a.rank, a.status), (30, 2, EntryStatus::Eliminated));
        assert_eq!((b.points, b.rank), (20, 1));
        assert!(matches!(
            manager.edit_entry(&a.id, LeaderboardPatch::default()).await,
            Err(AdminError::EmptyUpdate)
        ));
    }

    #[tokio::test]
    async fn test_auto_rank_reports_partial_failure() {
        let store = Arc::new(MemoryStore::new());
        for (team, points) in [("A", 30), ("B", 20), ("C", 10)] {
            seed(&store, "t1", team, points).await;
        }
        store.fail_updates_after(1).await;
        let manager = LeaderboardManager::new(store.clone());

        match manager.auto_rank("t1").await {
            Err(AdminError::PartialRank { applied, total, .. }) => {
                assert_eq!((applied, total), (1, 3));
            }
            other => panic!("Expected partial rank failure, got {:?}", other.map(|u| u.len())),
        }
        assert_eq!(
            ranks_by_team(&store, "t1").await,
            vec![("A".to_owned(), 1), ("B".to_owned(), 0), ("C".to_owned(), 0)]
        );
    }
}
