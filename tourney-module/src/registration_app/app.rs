use clap::Args;
use log::{error, info};
use std::path::PathBuf;

use crate::common::{
    config::AppConfig,
    context::AppContext,
    output::{print_failure, print_json},
};

use super::{
    error::RegistrationError,
    workflow::{
        PaymentProofSource, Registrar, RegistrationReceipt, RegistrationRequest, TeamDetails,
    },
};

const REGISTRATION_FAILURE_NOTICE: &str = "Registration failed. Please try again.";

#[derive(Args, Clone, Debug)]
pub(crate) struct RegistrationForm {
    #[arg(long, help = "Tournament id to register for")]
    tournament: String,
    #[arg(long, help = "Team name")]
    team_name: String,
    #[arg(long, help = "Team leader name")]
    leader_name: String,
    #[arg(long, help = "Leader's in-game identifier")]
    game_uid: String,
    #[arg(long, help = "Contact (WhatsApp) number")]
    whatsapp_number: String,
    #[arg(long, help = "Payment screenshot, required for paid tournaments")]
    screenshot: Option<PathBuf>,
}

pub(crate) struct RegistrationApp {
    registrar: Registrar,
}

impl RegistrationApp {
    pub(crate) async fn execute(config_path: &str, form: RegistrationForm) {
        let Ok(config) = AppConfig::try_from_path(config_path) else {
            print_failure(REGISTRATION_FAILURE_NOTICE);
            return;
        };
        let Ok(app) = RegistrationApp::try_new(config).await else {
            print_failure(REGISTRATION_FAILURE_NOTICE);
            return;
        };
        match app.execute_impl(form).await {
            Ok(receipt) => {
                info!("Registered, registration_id: {}", receipt.registration_id);
                print_json(&receipt);
            }
            Err(err) => {
                error!("Registration failed: {}", err);
                print_failure(REGISTRATION_FAILURE_NOTICE);
            }
        }
    }

    async fn try_new(config: AppConfig) -> Result<RegistrationApp, RegistrationError> {
        let context = AppContext::try_new(config).await.map_err(|err| {
            error!("Failed to set up store: {}", err);
            RegistrationError::Config
        })?;
        Ok(RegistrationApp {
            registrar: Registrar::new(context.store, context.blobs),
        })
    }

    async fn execute_impl(
        &self,
        form: RegistrationForm,
    ) -> Result<RegistrationReceipt, RegistrationError> {
        let team = TeamDetails {
            team_name: form.team_name,
            leader_name: form.leader_name,
            game_uid: form.game_uid,
            whatsapp_number: form.whatsapp_number,
        };
        team.validate()?;
        self.registrar
            .register(RegistrationRequest {
                tournament_id: form.tournament,
                team,
                payment_proof: form.screenshot.map(PaymentProofSource::File),
            })
            .await
    }
}
