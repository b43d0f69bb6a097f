//! Tournament entities touched by group-stage scheduling.

pub mod models;

pub use models::{
    Category, CategoryId, CategorySchedule, Group, GroupId, Match, MatchId, MatchPhase,
    MatchStatus, RegistrationStatus, Round, RoundId, SINGLE_GROUP_NAME, Team, TeamId,
    TournamentId,
};
