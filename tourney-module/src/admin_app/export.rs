use chrono::NaiveDate;
use log::info;
use std::path::Path;

use super::{error::AdminError, registrations::RegistrationView};

const HEADER: [&str; 8] = [
    "Registration ID",
    "Tournament",
    "Team Name",
    "Leader Name",
    "Game UID",
    "WhatsApp",
    "Payment Status",
    "Registration Date",
];

pub(crate) fn default_export_file_name(date: NaiveDate) -> String {
    format!("registrations-{}.csv", date.format("%Y-%m-%d"))
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields.iter().map(|field| quote(field.as_ref())).collect::<Vec<_>>().join(",")
}

/// Renders the given rows, already filtered, as CSV with a header line.
pub(crate) fn registrations_csv(views: &[RegistrationView]) -> String {
    let mut lines = vec![csv_line(&HEADER)];
    for view in views {
        let registration = &view.registration;
        let date = registration.created_at.format("%Y-%m-%d").to_string();
        lines.push(csv_line(&[
            registration.registration_id.as_str(),
            view.tournament_name.as_deref().unwrap_or_default(),
            registration.team_name.as_str(),
            registration.leader_name.as_str(),
            registration.game_uid.as_str(),
            registration.whatsapp_number.as_str(),
            registration.payment_status.as_str(),
            date.as_str(),
        ]));
    }
    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

pub(crate) async fn write_registrations_csv(
    path: &Path,
    views: &[RegistrationView],
) -> Result<(), AdminError> {
    tokio::fs::write(path, registrations_csv(views)).await?;
    info!("Exported {} registrations to {}", views.len(), path.display());
    Ok(())
}
