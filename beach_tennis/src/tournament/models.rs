//! Tournament data models for categories, registrations and the group stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Tournament ID type
pub type TournamentId = Uuid;

/// Category ID type
pub type CategoryId = Uuid;

/// Team (registration) ID type
pub type TeamId = Uuid;

/// Group ID type
pub type GroupId = Uuid;

/// Round ID type
pub type RoundId = Uuid;

/// Match ID type
pub type MatchId = Uuid;

/// Name given to the group created by the single-group policy
pub const SINGLE_GROUP_NAME: &str = "Grupo Único";

/// Error returned when a stored enum tag cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Registration status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    /// Awaiting organizer review
    Pending,
    /// Accepted by the organizer
    Approved,
    /// Refused by the organizer
    Rejected,
    /// Entry fee paid
    Paid,
}

impl RegistrationStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [RegistrationStatus; 4] = [
        RegistrationStatus::Pending,
        RegistrationStatus::Approved,
        RegistrationStatus::Rejected,
        RegistrationStatus::Paid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "PENDING",
            RegistrationStatus::Approved => "APPROVED",
            RegistrationStatus::Rejected => "REJECTED",
            RegistrationStatus::Paid => "PAID",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(RegistrationStatus::Pending),
            "APPROVED" => Ok(RegistrationStatus::Approved),
            "REJECTED" => Ok(RegistrationStatus::Rejected),
            "PAID" => Ok(RegistrationStatus::Paid),
            _ => Err(UnknownVariant {
                kind: "registration status",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchPhase {
    /// Round-robin group stage
    Group,
    /// Elimination rounds (not generated here)
    Knockout,
}

impl MatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPhase::Group => "GROUP",
            MatchPhase::Knockout => "KNOCKOUT",
        }
    }
}

impl FromStr for MatchPhase {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GROUP" => Ok(MatchPhase::Group),
            "KNOCKOUT" => Ok(MatchPhase::Knockout),
            _ => Err(UnknownVariant {
                kind: "match phase",
                value: s.to_string(),
            }),
        }
    }
}

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Created, not yet played
    Scheduled,
    /// Being played
    InProgress,
    /// Result recorded
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "SCHEDULED",
            MatchStatus::InProgress => "IN_PROGRESS",
            MatchStatus::Finished => "FINISHED",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(MatchStatus::Scheduled),
            "IN_PROGRESS" => Ok(MatchStatus::InProgress),
            "FINISHED" => Ok(MatchStatus::Finished),
            _ => Err(UnknownVariant {
                kind: "match status",
                value: s.to_string(),
            }),
        }
    }
}

/// Category lookup result
///
/// `tournament_id` is `None` when the category row exists but its owning
/// tournament cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub tournament_id: Option<TournamentId>,
}

/// A registered team (one or two athletes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub category_id: CategoryId,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
}

impl Team {
    /// Create a pending registration stamped now
    pub fn new(category_id: CategoryId) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            status: RegistrationStatus::Pending,
            registered_at: Utc::now(),
        }
    }

    /// Set the registration status
    pub fn with_status(mut self, status: RegistrationStatus) -> Self {
        self.status = status;
        self
    }
}

/// Group of teams playing each other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub category_id: CategoryId,
    pub name: String,
    /// Member teams
    pub team_ids: Vec<TeamId>,
}

/// Round of a category's group stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub category_id: CategoryId,
    /// Sequence number (1-indexed)
    pub number: u32,
    /// Deadline for the round's matches
    pub deadline: Option<DateTime<Utc>>,
}

/// A stored match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub category_id: CategoryId,
    pub group_id: Option<GroupId>,
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub phase: MatchPhase,
    pub status: MatchStatus,
    pub round_number: Option<u32>,
}

impl Match {
    /// Whether the match involves the given team
    pub fn involves(&self, team_id: TeamId) -> bool {
        self.team_a == team_id || self.team_b == team_id
    }
}

/// Stored group stage of one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySchedule {
    pub groups: Vec<Group>,
    pub rounds: Vec<Round>,
    /// Group-phase matches ordered by round number
    pub matches: Vec<Match>,
}

impl CategorySchedule {
    /// Matches of a given round
    pub fn matches_in_round(&self, round_number: u32) -> impl Iterator<Item = &Match> {
        self.matches
            .iter()
            .filter(move |m| m.round_number == Some(round_number))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.rounds.is_empty() && self.matches.is_empty()
    }
}
