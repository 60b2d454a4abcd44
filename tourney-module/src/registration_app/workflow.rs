use log::{debug, error, info};
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tourney_common::{
    blob_storage::{BlobStorage, PAYMENT_SCREENSHOTS_BUCKET},
    data::{LeaderboardEntry, NewLeaderboardEntry, NewRegistration, Registration, Tournament},
    store::{DataStore, RecordStore},
    utils::get_time_ms,
};

use super::error::RegistrationError;

#[derive(Clone, Debug)]
pub(crate) struct TeamDetails {
    pub(crate) team_name: String,
    pub(crate) leader_name: String,
    pub(crate) game_uid: String,
    pub(crate) whatsapp_number: String,
}

impl TeamDetails {
    /// Required-field check run at the input boundary before the workflow starts.
    pub(crate) fn validate(&self) -> Result<(), RegistrationError> {
        let fields = [
            ("team_name", &self.team_name),
            ("leader_name", &self.leader_name),
            ("game_uid", &self.game_uid),
            ("whatsapp_number", &self.whatsapp_number),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(RegistrationError::MissingField(*name)),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct PaymentProof {
    pub(crate) file_name: String,
    pub(crate) bytes: Vec<u8>,
}

impl PaymentProof {
    pub(crate) async fn read(path: &Path) -> Result<PaymentProof, RegistrationError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            error!("Failed to read payment proof {}: {}", path.display(), err);
            RegistrationError::PaymentProofRead(err)
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "screenshot".to_owned());
        Ok(PaymentProof { file_name, bytes })
    }

    fn storage_name(&self, at_ms: u64) -> String {
        format!("payment-{}-{}", at_ms, self.file_name)
    }
}

/// Where the payment proof comes from. A file is only read once the
/// tournament turns out to be paid.
#[derive(Clone, Debug)]
pub(crate) enum PaymentProofSource {
    File(PathBuf),
    Loaded(PaymentProof),
}

impl PaymentProofSource {
    async fn load(self) -> Result<PaymentProof, RegistrationError> {
        match self {
            PaymentProofSource::File(path) => PaymentProof::read(&path).await,
            PaymentProofSource::Loaded(proof) => Ok(proof),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RegistrationRequest {
    pub(crate) tournament_id: String,
    pub(crate) team: TeamDetails,
    pub(crate) payment_proof: Option<PaymentProofSource>,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct RegistrationReceipt {
    pub(crate) registration_id: String,
    pub(crate) registration: Registration,
    pub(crate) leaderboard_entry: LeaderboardEntry,
}

/// Turns a team's submission into a registration plus its leaderboard entry.
///
/// The two inserts are independent writes: if the leaderboard insert fails the
/// registration stays behind and the failure names it, nothing is rolled back.
pub(crate) struct Registrar {
    store: Arc<dyn DataStore>,
    blobs: Arc<dyn BlobStorage>,
}

impl Registrar {
    pub(crate) fn new(store: Arc<dyn DataStore>, blobs: Arc<dyn BlobStorage>) -> Self {
        Registrar { store, blobs }
    }

    pub(crate) async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationReceipt, RegistrationError> {
        let RegistrationRequest {
            tournament_id,
            team,
            payment_proof,
        } = request;
        let tournament: Tournament = self.store.fetch_one(&tournament_id).await?;

        let payment_screenshot_url = if tournament.is_paid() {
            let source = payment_proof.ok_or(RegistrationError::PaymentProofRequired)?;
            let proof = source.load().await?;
            Some(self.upload_payment_proof(proof).await?)
        } else {
            if payment_proof.is_some() {
                debug!("Ignoring payment proof for free tournament {}", tournament.id);
            }
            None
        };

        let new_registration = NewRegistration {
            tournament_id: tournament.id.clone(),
            team_name: team.team_name,
            leader_name: team.leader_name,
            game_uid: team.game_uid,
            whatsapp_number: team.whatsapp_number,
            payment_status: tournament.initial_payment_status(),
            payment_screenshot_url,
        };
        let registration: Registration = self.store.create(&new_registration).await?;
        info!(
            "Registration stored, registration_id: {}, tournament: {}, payment_status: {}",
            registration.registration_id, tournament.id, registration.payment_status
        );

        let new_entry = NewLeaderboardEntry::for_registration(&registration);
        let leaderboard_entry: LeaderboardEntry =
            self.store.create(&new_entry).await.map_err(|source| {
                error!(
                    "Registration {} has no leaderboard entry: {}",
                    registration.registration_id, source
                );
                RegistrationError::LeaderboardEntry {
                    registration_id: registration.registration_id.clone(),
                    source,
                }
            })?;

        Ok(RegistrationReceipt {
            registration_id: registration.registration_id.clone(),
            registration,
            leaderboard_entry,
        })
    }

    async fn upload_payment_proof(&self, proof: PaymentProof) -> Result<String, RegistrationError> {
        let name = proof.storage_name(get_time_ms());
        let path = self.blobs.upload(PAYMENT_SCREENSHOTS_BUCKET, &name, proof.bytes).await.map_err(
            |err| {
                error!("Failed to upload payment proof {}: {}", name, err);
                RegistrationError::from(err)
            },
        )?;
        debug!("Payment proof uploaded: {}", path);
        Ok(path)
    }
}
