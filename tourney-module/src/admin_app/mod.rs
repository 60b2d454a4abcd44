mod app;
mod error;
mod export;
mod leaderboard;
mod overview;
mod queries;
mod registrations;
mod tournaments;

pub(super) use app::{AdminApp, AdminCommand};
