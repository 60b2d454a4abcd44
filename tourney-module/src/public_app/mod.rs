mod app;
mod contact;
mod error;
mod standings;
mod tournaments;

pub(super) use app::{PublicApp, PublicCommand};
