mod app;
mod error;
mod workflow;

pub(super) use app::{RegistrationApp, RegistrationForm};
