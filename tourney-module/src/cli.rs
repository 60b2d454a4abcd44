use clap::{Parser, Subcommand};

use super::{
    admin_app::{AdminApp, AdminCommand},
    public_app::{PublicApp, PublicCommand},
    registration_app::{RegistrationApp, RegistrationForm},
};

#[derive(Subcommand)]
enum Command {
    #[command(about = "Browses tournaments and leaderboards or contacts the organisers")]
    Public {
        #[arg(long, help = "Tourney config path")]
        config: String,
        #[command(subcommand)]
        command: PublicCommand,
    },
    #[command(about = "Registers a team for a tournament")]
    Register {
        #[arg(long, help = "Tourney config path")]
        config: String,
        #[command(flatten)]
        form: RegistrationForm,
    },
    #[command(about = "Manages tournaments, registrations, leaderboards and queries")]
    Admin {
        #[arg(long, help = "Tourney config path")]
        config: String,
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub(super) struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub(super) async fn execute(args: impl Iterator<Item = String>) {
        let parsed_cli = Self::parse_from(args);
        match parsed_cli.command {
            Command::Public { config, command } => PublicApp::execute(&config, command).await,
            Command::Register { config, form } => RegistrationApp::execute(&config, form).await,
            Command::Admin { config, command } => AdminApp::execute(&config, command).await,
        }
    }
}
