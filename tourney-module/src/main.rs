mod admin_app;
mod cli;
mod common;
mod logging;
mod public_app;
mod registration_app;

use std::env;

#[tokio::main]
async fn main() {
    logging::init_logging();
    cli::Cli::execute(env::args()).await;
}
