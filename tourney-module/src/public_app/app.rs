use clap::Subcommand;
use log::error;
use std::sync::Arc;

use tourney_common::store::DataStore;

use crate::common::{
    config::AppConfig,
    context::AppContext,
    output::{print_failure, print_json, FAILURE_NOTICE},
};

use super::{
    contact::{submit_contact_query, ContactForm},
    error::PublicError,
    standings::standings,
    tournaments::{active_tournaments, tournament_details},
};

#[derive(Subcommand, Clone, Debug)]
pub(crate) enum PublicCommand {
    #[command(about = "Lists active tournaments, soonest first")]
    Tournaments,
    #[command(about = "Shows one tournament")]
    Tournament {
        #[arg(long, help = "Tournament id")]
        id: String,
    },
    #[command(about = "Shows a tournament leaderboard")]
    Leaderboard {
        #[arg(long, help = "Tournament id")]
        tournament: String,
        #[arg(long, help = "Filter by registration id, team name or leader name")]
        search: Option<String>,
    },
    #[command(about = "Sends a message to the organisers")]
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        message: String,
    },
}

pub(crate) struct PublicApp {
    store: Arc<dyn DataStore>,
}

impl PublicApp {
    pub(crate) async fn execute(config_path: &str, command: PublicCommand) {
        let Ok(config) = AppConfig::try_from_path(config_path) else {
            print_failure(FAILURE_NOTICE);
            return;
        };
        let Ok(app) = PublicApp::try_new(config).await else {
            print_failure(FAILURE_NOTICE);
            return;
        };
        if let Err(err) = app.execute_impl(command).await {
            error!("Public request failed: {}", err);
            print_failure(FAILURE_NOTICE);
        }
    }

    async fn try_new(config: AppConfig) -> Result<PublicApp, PublicError> {
        let context = AppContext::try_new(config).await.map_err(|err| {
            error!("Failed to set up store: {}", err);
            PublicError::Config
        })?;
        Ok(PublicApp {
            store: context.store,
        })
    }

    async fn execute_impl(&self, command: PublicCommand) -> Result<(), PublicError> {
        let store = self.store.as_ref();
        match command {
            PublicCommand::Tournaments => print_json(&active_tournaments(store).await?),
            PublicCommand::Tournament { id } => print_json(&tournament_details(store, &id).await?),
            PublicCommand::Leaderboard { tournament, search } => {
                print_json(&standings(store, &tournament, search.as_deref()).await?)
            }
            PublicCommand::Contact {
                name,
                email,
                phone,
                message,
            } => {
                let form = ContactForm {
                    name,
                    email,
                    phone,
                    message,
                };
                let query = submit_contact_query(store, form).await?;
                println!("Message received, reference: {}", query.id);
            }
        }
        Ok(())
    }
}
