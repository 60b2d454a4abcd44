use chrono::{DateTime, NaiveDateTime, Utc};
use clap::Subcommand;
use log::error;
use std::{path::PathBuf, sync::Arc};

use tourney_common::{
    blob_storage::BlobStorage,
    data::{
        EntryStatus, LeaderboardPatch, NewTournament, PaymentStatus, QueryStatus, TournamentPatch,
        TournamentType,
    },
    store::DataStore,
};

use crate::common::{
    config::AppConfig,
    context::AppContext,
    output::{print_failure, print_json, FAILURE_NOTICE},
    search::filter_by_search,
};

use super::{
    error::AdminError,
    export::{default_export_file_name, write_registrations_csv},
    leaderboard::LeaderboardManager,
    overview::overview,
    queries::QueryInbox,
    registrations::{PaymentDecision, RegistrationFilter, RegistrationManager},
    tournaments::TournamentManager,
};

/// Accepts RFC 3339 or the `YYYY-MM-DDTHH:MM` form of a datetime-local input (UTC).
fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .map(|date| date.and_utc())
        .map_err(|err| format!("Invalid date {}: {}", value, err))
}

#[derive(Subcommand, Clone, Debug)]
pub(crate) enum AdminCommand {
    #[command(about = "Lists every tournament, newest first")]
    Tournaments,
    #[command(about = "Creates a tournament")]
    CreateTournament {
        #[arg(long)]
        name: String,
        #[arg(long = "type", help = "free or paid")]
        kind: TournamentType,
        #[arg(long, value_parser = parse_date, help = "RFC 3339 or YYYY-MM-DDTHH:MM (UTC)")]
        date: DateTime<Utc>,
        #[arg(long, default_value = "")]
        prize: String,
        #[arg(long, default_value_t = 0)]
        entry_fee: u64,
        #[arg(long, default_value = "")]
        rules: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = NewTournament::DEFAULT_MAX_TEAMS)]
        max_teams: u32,
    },
    #[command(about = "Updates the given fields of a tournament")]
    UpdateTournament {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        kind: Option<TournamentType>,
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
        #[arg(long)]
        prize: Option<String>,
        #[arg(long)]
        entry_fee: Option<u64>,
        #[arg(long)]
        rules: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        max_teams: Option<u32>,
    },
    #[command(about = "Deletes a tournament")]
    DeleteTournament {
        #[arg(long)]
        id: String,
    },
    #[command(about = "Activates or deactivates a tournament")]
    ToggleTournament {
        #[arg(long)]
        id: String,
    },
    #[command(about = "Lists registrations with their tournament")]
    Registrations {
        #[command(flatten)]
        filter: RegistrationFilterArgs,
    },
    #[command(about = "Verifies or rejects a registration payment")]
    VerifyPayment {
        #[arg(long, help = "Registration row id")]
        id: String,
        #[arg(long, value_enum)]
        status: PaymentDecision,
    },
    #[command(about = "Prints the public url of a payment screenshot")]
    ScreenshotUrl {
        #[arg(long, help = "Registration row id")]
        id: String,
    },
    #[command(about = "Writes the filtered registrations as CSV")]
    ExportRegistrations {
        #[arg(long, help = "Output file, registrations-<date>.csv by default")]
        output: Option<PathBuf>,
        #[command(flatten)]
        filter: RegistrationFilterArgs,
    },
    #[command(about = "Lists active tournaments for leaderboard management")]
    LeaderboardTournaments,
    #[command(about = "Shows a tournament leaderboard")]
    Leaderboard {
        #[arg(long, help = "Tournament id")]
        tournament: String,
        #[arg(long)]
        search: Option<String>,
    },
    #[command(about = "Edits points, rank or status of one leaderboard entry")]
    EditEntry {
        #[arg(long, help = "Leaderboard entry id")]
        id: String,
        #[arg(long)]
        points: Option<u32>,
        #[arg(long)]
        rank: Option<u32>,
        #[arg(long, help = "active, eliminated or disqualified")]
        status: Option<EntryStatus>,
    },
    #[command(about = "Ranks every entry of a tournament by points")]
    AutoRank {
        #[arg(long, help = "Tournament id")]
        tournament: String,
    },
    #[command(about = "Lists contact queries, newest first")]
    Queries {
        #[arg(long, help = "unread, read or responded")]
        status: Option<QueryStatus>,
    },
    #[command(about = "Shows a contact query, marking it read")]
    OpenQuery {
        #[arg(long)]
        id: String,
    },
    #[command(about = "Stores a response note and marks the query responded")]
    RespondQuery {
        #[arg(long)]
        id: String,
        #[arg(long)]
        notes: String,
    },
    #[command(about = "Prints dashboard statistics")]
    Overview,
}

#[derive(clap::Args, Clone, Debug)]
pub(crate) struct RegistrationFilterArgs {
    #[arg(long, help = "Registration id, team name or leader name")]
    search: Option<String>,
    #[arg(long = "type", help = "free or paid")]
    kind: Option<TournamentType>,
    #[arg(long, help = "pending, verified or rejected")]
    status: Option<PaymentStatus>,
}

impl From<RegistrationFilterArgs> for RegistrationFilter {
    fn from(value: RegistrationFilterArgs) -> Self {
        RegistrationFilter {
            search: value.search,
            kind: value.kind,
            status: value.status,
        }
    }
}

pub(crate) struct AdminApp {
    store: Arc<dyn DataStore>,
    blobs: Arc<dyn BlobStorage>,
}

impl AdminApp {
    pub(crate) async fn execute(config_path: &str, command: AdminCommand) {
        let Ok(config) = AppConfig::try_from_path(config_path) else {
            print_failure(FAILURE_NOTICE);
            return;
        };
        let Ok(app) = AdminApp::try_new(config).await else {
            print_failure(FAILURE_NOTICE);
            return;
        };
        if let Err(err) = app.execute_impl(command).await {
            error!("Admin request failed: {}", err);
            print_failure(FAILURE_NOTICE);
        }
    }

    async fn try_new(config: AppConfig) -> Result<AdminApp, AdminError> {
        let context = AppContext::try_new(config).await.map_err(|err| {
            error!("Failed to set up store: {}", err);
            AdminError::Config
        })?;
        Ok(AdminApp {
            store: context.store,
            blobs: context.blobs,
        })
    }

    async fn execute_impl(&self, command: AdminCommand) -> Result<(), AdminError> {
        let tournaments = TournamentManager::new(self.store.clone());
        let registrations = RegistrationManager::new(self.store.clone(), self.blobs.clone());
        let leaderboard = LeaderboardManager::new(self.store.clone());
        let inbox = QueryInbox::new(self.store.clone());

        match command {
            AdminCommand::Tournaments => print_json(&tournaments.list().await?),
            AdminCommand::CreateTournament {
                name,
                kind,
                date,
                prize,
                entry_fee,
                rules,
                description,
                max_teams,
            } => {
                let new = NewTournament {
                    name,
                    kind,
                    date,
                    prize,
                    entry_fee,
                    rules,
                    description,
                    max_teams,
                    is_active: true,
                };
                print_json(&tournaments.create(new).await?);
            }
            AdminCommand::UpdateTournament {
                id,
                name,
                kind,
                date,
                prize,
                entry_fee,
                rules,
                description,
                max_teams,
            } => {
                let patch = TournamentPatch {
                    name,
                    kind,
                    date,
                    prize,
                    entry_fee,
                    rules,
                    description,
                    max_teams,
                    is_active: None,
                };
                tournaments.update(&id, patch).await?;
                println!("Tournament {} updated", id);
            }
            AdminCommand::DeleteTournament { id } => {
                tournaments.delete(&id).await?;
                println!("Tournament {} deleted", id);
            }
            AdminCommand::ToggleTournament { id } => {
                let is_active = tournaments.toggle_active(&id).await?;
                println!("Tournament {} is_active: {}", id, is_active);
            }
            AdminCommand::Registrations { filter } => {
                let filter = RegistrationFilter::from(filter);
                print_json(&filter.apply(registrations.list().await?));
            }
            AdminCommand::VerifyPayment { id, status } => {
                print_json(&registrations.set_payment_status(&id, status).await?)
            }
            AdminCommand::ScreenshotUrl { id } => {
                println!("{}", registrations.payment_screenshot_url(&id).await?)
            }
            AdminCommand::ExportRegistrations { output, filter } => {
                let filter = RegistrationFilter::from(filter);
                let views = filter.apply(registrations.list().await?);
                let path = output.unwrap_or_else(|| {
                    PathBuf::from(default_export_file_name(Utc::now().date_naive()))
                });
                write_registrations_csv(&path, &views).await?;
                println!("Exported {} registrations to {}", views.len(), path.display());
            }
            AdminCommand::LeaderboardTournaments => print_json(&tournaments.list_active().await?),
            AdminCommand::Leaderboard { tournament, search } => {
                let entries = leaderboard.entries(&tournament).await?;
                match search {
                    Some(term) => print_json(&filter_by_search(&entries, &term)),
                    None => print_json(&entries),
                }
            }
            AdminCommand::EditEntry {
                id,
                points,
                rank,
                status,
            } => {
                let patch = LeaderboardPatch {
                    points,
                    rank,
                    status,
                };
                leaderboard.edit_entry(&id, patch).await?;
                println!("Leaderboard entry {} updated", id);
            }
            AdminCommand::AutoRank { tournament } => {
                print_json(&leaderboard.auto_rank(&tournament).await?)
            }
            AdminCommand::Queries { status } => print_json(&inbox.list(status).await?),
            AdminCommand::OpenQuery { id } => print_json(&inbox.open(&id).await?),
            AdminCommand::RespondQuery { id, notes } => {
                inbox.respond(&id, &notes).await?;
                println!("Query {} marked responded", id);
            }
            AdminCommand::Overview => print_json(&overview(self.store.as_ref()).await?),
        }
        Ok(())
    }
}
