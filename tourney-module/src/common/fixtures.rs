use chrono::{TimeZone, Utc};

use tourney_common::{
    data::{EntryStatus, LeaderboardEntry, NewTournament, Tournament, TournamentType},
    store::{DataStore, RecordStore},
};

pub(crate) fn new_tournament(name: &str, kind: TournamentType, entry_fee: u64) -> NewTournament {
    NewTournament {
        name: name.to_owned(),
        kind,
        date: Utc.with_ymd_and_hms(2026, 11, 1, 18, 0, 0).unwrap(),
        prize: "10,000".to_owned(),
        entry_fee,
        rules: "No emulators".to_owned(),
        description: "Squad battle".to_owned(),
        max_teams: NewTournament::DEFAULT_MAX_TEAMS,
        is_active: true,
    }
}

pub(crate) async fn seed_tournament(
    store: &dyn DataStore,
    name: &str,
    kind: TournamentType,
    entry_fee: u64,
) -> Tournament {
    store
        .create(&new_tournament(name, kind, entry_fee))
        .await
        .expect("Tournament should be stored")
}

pub(crate) fn leaderboard_entry(
    id: &str,
    registration_id: &str,
    team_name: &str,
    leader_name: &str,
    points: u32,
) -> LeaderboardEntry {
    let created_at = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();
    LeaderboardEntry {
        id: id.to_owned(),
        tournament_id: "t1".to_owned(),
        registration_id: registration_id.to_owned(),
        team_name: team_name.to_owned(),
        leader_name: leader_name.to_owned(),
        points,
        rank: 0,
        status: EntryStatus::Active,
        created_at,
        updated_at: created_at,
    }
}
