use clap::ValueEnum;
use log::{debug, info, warn};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};

use tourney_common::{
    blob_storage::{BlobStorage, PAYMENT_SCREENSHOTS_BUCKET},
    data::{PaymentStatus, Registration, RegistrationPatch, Tournament, TournamentType},
    store::{DataStore, Query, RecordStore},
};

use super::error::AdminError;
use crate::common::search::matches_search;

/// Registration joined with the tournament it belongs to. The tournament
/// fields are empty when the tournament has since been deleted.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct RegistrationView {
    #[serde(flatten)]
    pub(crate) registration: Registration,
    pub(crate) tournament_name: Option<String>,
    pub(crate) tournament_type: Option<TournamentType>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct RegistrationFilter {
    pub(crate) search: Option<String>,
    pub(crate) kind: Option<TournamentType>,
    pub(crate) status: Option<PaymentStatus>,
}

impl RegistrationFilter {
    pub(crate) fn matches(&self, view: &RegistrationView) -> bool {
        let search_ok =
            self.search.as_deref().map_or(true, |term| matches_search(&view.registration, term));
        let kind_ok = self.kind.map_or(true, |kind| view.tournament_type == Some(kind));
        let status_ok =
            self.status.map_or(true, |status| view.registration.payment_status == status);
        search_ok && kind_ok && status_ok
    }

    pub(crate) fn apply(&self, views: Vec<RegistrationView>) -> Vec<RegistrationView> {
        views.into_iter().filter(|view| self.matches(view)).collect()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum PaymentDecision {
    Verified,
    Rejected,
}

impl From<PaymentDecision> for PaymentStatus {
    fn from(value: PaymentDecision) -> Self {
        match value {
            PaymentDecision::Verified => PaymentStatus::Verified,
            PaymentDecision::Rejected => PaymentStatus::Rejected,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub(crate) enum VerificationOutcome {
    Unchanged { status: PaymentStatus },
    Updated { from: PaymentStatus, to: PaymentStatus },
}

pub(crate) struct RegistrationManager {
    store: Arc<dyn DataStore>,
    blobs: Arc<dyn BlobStorage>,
}

impl RegistrationManager {
    pub(crate) fn new(store: Arc<dyn DataStore>, blobs: Arc<dyn BlobStorage>) -> Self {
        RegistrationManager { store, blobs }
    }

    /// All registrations joined with their tournament, newest first.
    pub(crate) async fn list(&self) -> Result<Vec<RegistrationView>, AdminError> {
        let registrations: Vec<Registration> =
            self.store.fetch(&Query::all().desc("created_at")).await?;
        let tournaments: Vec<Tournament> = self.store.fetch(&Query::all()).await?;
        let by_id: HashMap<&str, &Tournament> =
            tournaments.iter().map(|tournament| (tournament.id.as_str(), tournament)).collect();

        Ok(registrations
            .into_iter()
            .map(|registration| {
                let tournament = by_id.get(registration.tournament_id.as_str());
                RegistrationView {
                    tournament_name: tournament.map(|tournament| tournament.name.clone()),
                    tournament_type: tournament.map(|tournament| tournament.kind),
                    registration,
                }
            })
            .collect())
    }

    /// Sets the payment status of one registration. Re-applying the current
    /// status writes nothing. The linked leaderboard entry is never touched.
    pub(crate) async fn set_payment_status(
        &self,
        id: &str,
        decision: PaymentDecision,
    ) -> Result<VerificationOutcome, AdminError> {
        let registration: Registration = self.store.fetch_one(id).await?;
        let target = PaymentStatus::from(decision);
        let current = registration.payment_status;
        if current == target {
            debug!("Registration {} already {}", registration.registration_id, target);
            return Ok(VerificationOutcome::Unchanged { status: current });
        }
        if current != PaymentStatus::Pending {
            warn!(
                "Registration {} moves from {} to {} after review",
                registration.registration_id, current, target
            );
        }
        let patch = RegistrationPatch {
            payment_status: Some(target),
        };
        self.store.patch::<Registration, _>(id, &patch).await?;
        info!("Registration {} payment {}", registration.registration_id, target);
        Ok(VerificationOutcome::Updated {
            from: current,
            to: target,
        })
    }

    pub(crate) async fn payment_screenshot_url(&self, id: &str) -> Result<String, AdminError> {
        let registration: Registration = self.store.fetch_one(id).await?;
        let path = registration
            .payment_screenshot_url
            .ok_or_else(|| AdminError::NoPaymentProof(registration.registration_id.clone()))?;
        Ok(self.blobs.public_url(PAYMENT_SCREENSHOTS_BUCKET, &path))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::fixtures::seed_tournament;
    use tourney_common::{
        blob_storage::MemoryBlobStorage,
        data::{EntryStatus, LeaderboardEntry, NewLeaderboardEntry, NewRegistration},
        memory_store::MemoryStore,
    };

    async fn seed_registration(
        store: &MemoryStore,
        tournament: &Tournament,
        team: &str,
        status: PaymentStatus,
        screenshot: Option<&str>,
    ) -> Registration {
        let new = NewRegistration {
            tournament_id: tournament.id.clone(),
            team_name: team.to_owned(),
            leader_name: format!("{} lead", team),
            game_uid: "uid".to_owned(),
            whatsapp_number: "12345".to_owned(),
            payment_status: status,
            payment_screenshot_url: screenshot.map(str::to_owned),
        };
        let registration: Registration = store.create(&new).await.expect("Registration stored");
        let _: LeaderboardEntry = store
            .create(&NewLeaderboardEntry::for_registration(&registration))
            .await
            .expect("Entry stored");
        registration
    }

    fn manager(store: &Arc<MemoryStore>) -> RegistrationManager {
        RegistrationManager::new(
            store.clone(),
            Arc::new(MemoryBlobStorage::new("https://cdn.example.com/storage")),
        )
    }

    #[tokio::test]
    async fn test_verify_pending_payment() {
        let store = Arc::new(MemoryStore::new());
        let paid = seed_tournament(store.as_ref(), "Pro", TournamentType::Paid, 100).await;
        let registration =
            seed_registration(&store, &paid, "Alpha", PaymentStatus::Pending, Some("p.png")).await;
        let manager = manager(&store);

        let outcome = manager
            .set_payment_status(&registration.id, PaymentDecision::Verified)
            .await
            .expect("Verification should succeed");
        assert_eq!(
            outcome,
            VerificationOutcome::Updated {
                from: PaymentStatus::Pending,
                to: PaymentStatus::Verified
            }
        );
        let stored: Registration = store.fetch_one(&registration.id).await.expect("Stored");
        assert_eq!(stored.payment_status, PaymentStatus::Verified);
    }

    #[tokio::test]
    async fn test_repeated_decision_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        let paid = seed_tournament(store.as_ref(), "Pro", TournamentType::Paid, 100).await;
        let registration =
            seed_registration(&store, &paid, "Alpha", PaymentStatus::Pending, None).await;
        let manager = manager(&store);

        manager
            .set_payment_status(&registration.id, PaymentDecision::Rejected)
            .await
            .expect("Rejection should succeed");
        let writes = store.update_count();
        let outcome = manager
            .set_payment_status(&registration.id, PaymentDecision::Rejected)
            .await
            .expect("Repeated rejection should succeed");

        assert_eq!(outcome, VerificationOutcome::Unchanged { status: PaymentStatus::Rejected });
        assert_eq!(store.update_count(), writes);
    }

    #[tokio::test]
    async fn test_rejection_does_not_touch_leaderboard() {
        let store = Arc::new(MemoryStore::new());
        let paid = seed_tournament(store.as_ref(), "Pro", TournamentType::Paid, 100).await;
        let registration =
            seed_registration(&store, &paid, "Alpha", PaymentStatus::Verified, None).await;

        manager(&store)
            .set_payment_status(&registration.id, PaymentDecision::Rejected)
            .await
            .expect("Post-hoc rejection should succeed");

        let entries: Vec<LeaderboardEntry> = store.fetch(&Query::all()).await.expect("Entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, EntryStatus::Active);
    }

    #[tokio::test]
    async fn test_list_joins_and_filters() {
        let store = Arc::new(MemoryStore::new());
        let free = seed_tournament(store.as_ref(), "Free Cup", TournamentType::Free, 0).await;
        let paid = seed_tournament(store.as_ref(), "Pro", TournamentType::Paid, 100).await;
        seed_registration(&store, &free, "Alpha", PaymentStatus::Verified, None).await;
        seed_registration(&store, &paid, "Bravo", PaymentStatus::Pending, Some("b.png")).await;
        seed_registration(&store, &paid, "Alphonso", PaymentStatus::Rejected, None).await;

        let views = manager(&store).list().await.expect("Listing should succeed");
        assert_eq!(views.len(), 3);
        assert!(views.iter().all(|view| view.tournament_name.is_some()));

        let filter = RegistrationFilter {
            search: Some("alph".to_owned()),
            kind: Some(TournamentType::Paid),
            status: None,
        };
        let found = filter.apply(views.clone());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].registration.team_name, "Alphonso");
        assert_eq!(found[0].tournament_name.as_deref(), Some("Pro"));

        let pending = RegistrationFilter {
            status: Some(PaymentStatus::Pending),
            ..Default::default()
        };
        assert_eq!(pending.apply(views.clone()).len(), 1);
        assert_eq!(RegistrationFilter::default().apply(views).len(), 3);
    }

    #[tokio::test]
    async fn test_screenshot_url() {
        let store = Arc::new(MemoryStore::new());
        let paid = seed_tournament(store.as_ref(), "Pro", TournamentType::Paid, 100).await;
        let with_proof =
            seed_registration(&store, &paid, "Alpha", PaymentStatus::Pending, Some("p.png")).await;
        let without_proof =
            seed_registration(&store, &paid, "Bravo", PaymentStatus::Pending, None).await;
        let manager = manager(&store);

        assert_eq!(
            manager.payment_screenshot_url(&with_proof.id).await.expect("Url should resolve"),
            "https://cdn.example.com/storage/payment-screenshots/p.png"
        );
        assert!(matches!(
            manager.payment_screenshot_url(&without_proof.id).await,
            Err(AdminError::NoPaymentProof(_))
        ));
    }
}
