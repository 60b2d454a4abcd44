use log::info;
use std::sync::Arc;

use tourney_common::{
    data::{NewTournament, Tournament, TournamentPatch},
    store::{DataStore, Query, RecordStore},
};

use super::error::AdminError;

pub(crate) struct TournamentManager {
    store: Arc<dyn DataStore>,
}

impl TournamentManager {
    pub(crate) fn new(store: Arc<dyn DataStore>) -> Self {
        TournamentManager { store }
    }

    /// Every tournament, newest first.
    pub(crate) async fn list(&self) -> Result<Vec<Tournament>, AdminError> {
        Ok(self.store.fetch(&Query::all().desc("created_at")).await?)
    }

    /// Active tournaments offered in the leaderboard picker, newest first.
    pub(crate) async fn list_active(&self) -> Result<Vec<Tournament>, AdminError> {
        let query = Query::all().where_eq("is_active", true).desc("created_at");
        Ok(self.store.fetch(&query).await?)
    }

    pub(crate) async fn create(&self, new: NewTournament) -> Result<Tournament, AdminError> {
        if new.name.trim().is_empty() {
            return Err(AdminError::MissingField("name"));
        }
        let tournament: Tournament = self.store.create(&new).await?;
        info!("Tournament created, id: {}, type: {}", tournament.id, tournament.kind);
        Ok(tournament)
    }

    pub(crate) async fn update(&self, id: &str, patch: TournamentPatch) -> Result<(), AdminError> {
        if patch.is_empty() {
            return Err(AdminError::EmptyUpdate);
        }
        if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(AdminError::MissingField("name"));
        }
        self.store.patch::<Tournament, _>(id, &patch).await?;
        info!("Tournament updated, id: {}", id);
        Ok(())
    }

    /// Removes the tournament row only; its registrations and entries are untouched.
    pub(crate) async fn delete(&self, id: &str) -> Result<(), AdminError> {
        self.store.remove::<Tournament>(id).await?;
        info!("Tournament deleted, id: {}", id);
        Ok(())
    }

    /// Flips `is_active` and returns the new value.
    pub(crate) async fn toggle_active(&self, id: &str) -> Result<bool, AdminError> {
        let tournament: Tournament = self.store.fetch_one(id).await?;
        let is_active = !tournament.is_active;
        let patch = TournamentPatch {
            is_active: Some(is_active),
            ..Default::default()
        };
        self.store.patch::<Tournament, _>(id, &patch).await?;
        info!("Tournament {} is_active: {}", id, is_active);
        Ok(is_active)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::fixtures::new_tournament;
    use tourney_common::{data::TournamentType, memory_store::MemoryStore};

    fn manager() -> (Arc<MemoryStore>, TournamentManager) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), TournamentManager::new(store))
    }

    #[tokio::test]
    async fn test_create_update_toggle_delete() {
        let (_, manager) = manager();
        let created = manager
            .create(new_tournament("Night Cup", TournamentType::Paid, 150))
            .await
            .expect("Tournament should be created");
        assert!(created.is_active);
        assert_eq!(created.max_teams, NewTournament::DEFAULT_MAX_TEAMS);

        let patch = TournamentPatch {
            prize: Some("25,000".to_owned()),
            max_teams: Some(64),
            ..Default::default()
        };
        manager.update(&created.id, patch).await.expect("Update should succeed");
        assert!(!manager.toggle_active(&created.id).await.expect("Toggle should succeed"));
        assert!(manager.list_active().await.expect("Listing should succeed").is_empty());

        let all = manager.list().await.expect("Listing should succeed");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].prize, "25,000");
        assert_eq!(all[0].max_teams, 64);
        assert_eq!(all[0].entry_fee, 150);

        manager.delete(&created.id).await.expect("Delete should succeed");
        assert!(manager.list().await.expect("Listing should succeed").is_empty());
        assert!(manager.delete(&created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_blank_name_and_empty_patch() {
        let (store, manager) = manager();
        let blank = new_tournament("  ", TournamentType::Free, 0);
        assert!(matches!(manager.create(blank).await, Err(AdminError::MissingField("name"))));
        assert!(matches!(
            manager.update("any", TournamentPatch::default()).await,
            Err(AdminError::EmptyUpdate)
        ));
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (_, manager) = manager();
        for name in ["first", "second"] {
            manager
                .create(new_tournament(name, TournamentType::Free, 0))
                .await
                .expect("Tournament should be created");
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        let names: Vec<String> = manager
            .list()
            .await
            .expect("Listing should succeed")
            .into_iter()
            .map(|tournament| tournament.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }
}
