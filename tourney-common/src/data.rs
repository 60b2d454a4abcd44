use chrono::{DateTime, Utc};
use mongodb::bson::Bson;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use super::utils::{serialize_optional_timestamp, serialize_timestamp};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Collection {
    Tournaments,
    Registrations,
    Leaderboard,
    ContactQueries,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Tournaments => "tournaments",
            Collection::Registrations => "registrations",
            Collection::Leaderboard => "leaderboard",
            Collection::ContactQueries => "contact_queries",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A row type stored in one of the store collections.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
}

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("Unknown {}: {}", stringify!($name), other)),
                }
            }
        }

        impl From<$name> for Bson {
            fn from(value: $name) -> Bson {
                Bson::String(value.as_str().to_owned())
            }
        }
    };
}

string_enum!(TournamentType { Free => "free", Paid => "paid" });
string_enum!(PaymentStatus { Pending => "pending", Verified => "verified", Rejected => "rejected" });
string_enum!(EntryStatus { Active => "active", Eliminated => "eliminated", Disqualified => "disqualified" });
string_enum!(QueryStatus { Unread => "unread", Read => "read", Responded => "responded" });

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TournamentType,
    #[serde(serialize_with = "serialize_timestamp")]
    pub date: DateTime<Utc>,
    pub prize: String,
    pub entry_fee: u64,
    pub rules: String,
    pub description: String,
    pub max_teams: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    pub fn is_paid(&self) -> bool {
        self.kind == TournamentType::Paid
    }

    /// Payment status a fresh registration for this tournament starts with.
    pub fn initial_payment_status(&self) -> PaymentStatus {
        match self.kind {
            TournamentType::Free => PaymentStatus::Verified,
            TournamentType::Paid => PaymentStatus::Pending,
        }
    }
}

impl Record for Tournament {
    const COLLECTION: Collection = Collection::Tournaments;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TournamentType,
    #[serde(serialize_with = "serialize_timestamp")]
    pub date: DateTime<Utc>,
    pub prize: String,
    #[serde(default)]
    pub entry_fee: u64,
    #[serde(default)]
    pub rules: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "NewTournament::default_max_teams")]
    pub max_teams: u32,
    #[serde(default = "NewTournament::default_is_active")]
    pub is_active: bool,
}

impl NewTournament {
    pub const DEFAULT_MAX_TEAMS: u32 = 100;

    fn default_max_teams() -> u32 {
        Self::DEFAULT_MAX_TEAMS
    }

    fn default_is_active() -> bool {
        true
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TournamentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TournamentType>,
    #[serde(
        serialize_with = "serialize_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_fee: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_teams: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl TournamentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.kind.is_none()
            && self.date.is_none()
            && self.prize.is_none()
            && self.entry_fee.is_none()
            && self.rules.is_none()
            && self.description.is_none()
            && self.max_teams.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Registration {
    pub id: String,
    pub tournament_id: String,
    pub team_name: String,
    pub leader_name: String,
    pub game_uid: String,
    pub whatsapp_number: String,
    pub payment_status: PaymentStatus,
    pub payment_screenshot_url: Option<String>,
    pub registration_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Registration {
    const COLLECTION: Collection = Collection::Registrations;

    fn id(&self) -> &str {
        &self.id
    }
}

/// `registration_id` is absent on purpose: the store generates it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewRegistration {
    pub tournament_id: String,
    pub team_name: String,
    pub leader_name: String,
    pub game_uid: String,
    pub whatsapp_number: String,
    pub payment_status: PaymentStatus,
    pub payment_screenshot_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RegistrationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub tournament_id: String,
    pub registration_id: String,
    pub team_name: String,
    pub leader_name: String,
    pub points: u32,
    pub rank: u32,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn is_ranked(&self) -> bool {
        self.rank != 0
    }
}

impl Record for LeaderboardEntry {
    const COLLECTION: Collection = Collection::Leaderboard;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewLeaderboardEntry {
    pub tournament_id: String,
    pub registration_id: String,
    pub team_name: String,
    pub leader_name: String,
    pub points: u32,
    pub rank: u32,
    pub status: EntryStatus,
}

impl NewLeaderboardEntry {
    /// Unranked, zero-point, active entry mirroring a registration.
    pub fn for_registration(registration: &Registration) -> Self {
        NewLeaderboardEntry {
            tournament_id: registration.tournament_id.clone(),
            registration_id: registration.registration_id.clone(),
            team_name: registration.team_name.clone(),
            leader_name: registration.leader_name.clone(),
            points: 0,
            rank: 0,
            status: EntryStatus::Active,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LeaderboardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntryStatus>,
}

impl LeaderboardPatch {
    pub fn is_empty(&self) -> bool {
        self.points.is_none() && self.rank.is_none() && self.status.is_none()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ContactQuery {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub status: QueryStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ContactQuery {
    const COLLECTION: Collection = Collection::ContactQueries;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewContactQuery {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub status: QueryStatus,
    pub admin_notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ContactQueryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<QueryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_status_text_matches_serde() {
        for status in [PaymentStatus::Pending, PaymentStatus::Verified, PaymentStatus::Rejected] {
            let bson = mongodb::bson::to_bson(&status).expect("Status should serialize");
            assert_eq!(bson, Bson::from(status));
            assert_eq!(status.as_str().parse::<PaymentStatus>(), Ok(status));
        }
        assert!("approved".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_tournament_dates_keep_fixed_precision() {
        use chrono::{Duration, TimeZone};

        let whole = Utc.with_ymd_and_hms(2026, 11, 1, 18, 0, 0).unwrap();
        let new = NewTournament {
            name: "Night Cup".to_owned(),
            kind: TournamentType::Free,
            date: whole,
            prize: String::new(),
            entry_fee: 0,
            rules: String::new(),
            description: String::new(),
            max_teams: NewTournament::DEFAULT_MAX_TEAMS,
            is_active: true,
        };
        let doc = mongodb::bson::to_document(&new).expect("Tournament should serialize");
        let stored_whole = doc.get_str("date").expect("Date should be a string").to_owned();
        assert_eq!(stored_whole, "2026-11-01T18:00:00.000Z");

        let patch = TournamentPatch {
            date: Some(whole + Duration::milliseconds(500)),
            ..Default::default()
        };
        let doc = mongodb::bson::to_document(&patch).expect("Patch should serialize");
        let stored_half = doc.get_str("date").expect("Date should be a string").to_owned();
        assert_eq!(stored_half, "2026-11-01T18:00:00.500Z");
        assert!(stored_whole < stored_half);

        let decoded: NewTournament =
            mongodb::bson::from_document(mongodb::bson::to_document(&new).expect("Serialize"))
                .expect("Tournament should decode");
        assert_eq!(decoded.date, whole);
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = LeaderboardPatch {
            rank: Some(3),
            ..Default::default()
        };
        let doc = mongodb::bson::to_document(&patch).expect("Patch should serialize");
        assert_eq!(doc.len(), 1);
        assert!(doc.contains_key("rank"));
    }
}
