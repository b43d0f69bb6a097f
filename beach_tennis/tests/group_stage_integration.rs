//! Integration tests for group-stage generation
//!
//! These tests drive the scheduler end to end against the in-memory store:
//! resets, eligibility, draws, failure atomicity and concurrent runs.

use beach_tennis::db::{FailurePoint, InMemoryStore};
use beach_tennis::scheduling::{
    DEFAULT_GROUP_SIZE, GroupStageScheduler, GroupingStrategy, SchedulerConfig, SchedulingError,
    TeamOrdering,
};
use beach_tennis::tournament::{
    Category, CategoryId, Match, MatchPhase, MatchStatus, RegistrationStatus, SINGLE_GROUP_NAME,
    Team, TeamId,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

struct Fixture {
    store: Arc<InMemoryStore>,
    category_id: CategoryId,
    tournament_id: Uuid,
    teams: Vec<TeamId>,
}

async fn fixture(team_count: usize) -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let tournament_id = Uuid::new_v4();
    let category_id = Uuid::new_v4();

    store
        .insert_category(Category {
            id: category_id,
            name: "Masculina Open".to_string(),
            tournament_id: Some(tournament_id),
        })
        .await;

    let mut teams = Vec::new();
    for _ in 0..team_count {
        let team = Team::new(category_id);
        teams.push(team.id);
        store.insert_team(team).await;
    }

    Fixture {
        store,
        category_id,
        tournament_id,
        teams,
    }
}

fn scheduler(f: &Fixture, config: SchedulerConfig) -> GroupStageScheduler {
    GroupStageScheduler::with_store(f.store.clone(), config)
}

fn pair_key(m: &Match) -> (TeamId, TeamId) {
    (m.team_a.min(m.team_b), m.team_a.max(m.team_b))
}

#[tokio::test]
async fn test_four_teams_single_group() {
    let f = fixture(4).await;
    let s = scheduler(&f, SchedulerConfig::default());

    s.schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
        .await
        .unwrap();
    let schedule = s.load_schedule(f.category_id).await.unwrap();

    assert_eq!(schedule.groups.len(), 1);
    assert_eq!(schedule.groups[0].name, SINGLE_GROUP_NAME);
    assert_eq!(schedule.groups[0].team_ids, f.teams);

    let numbers: Vec<u32> = schedule.rounds.iter().map(|r| r.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(schedule.rounds.iter().all(|r| r.deadline.is_none()));

    assert_eq!(schedule.matches.len(), 6);
    for round in 1..=3 {
        assert_eq!(schedule.matches_in_round(round).count(), 2);
    }

    let pairs: HashSet<_> = schedule.matches.iter().map(pair_key).collect();
    assert_eq!(pairs.len(), 6);

    assert!(schedule.matches.iter().all(|m| {
        m.phase == MatchPhase::Group
            && m.status == MatchStatus::Scheduled
            && m.tournament_id == f.tournament_id
            && m.category_id == f.category_id
            && m.group_id == Some(schedule.groups[0].id)
    }));

    // Registration order is kept: round 1 is A-D and B-C
    let (a, b, c, d) = (f.teams[0], f.teams[1], f.teams[2], f.teams[3]);
    let round_one: HashSet<_> = schedule.matches_in_round(1).map(pair_key).collect();
    assert!(round_one.contains(&(a.min(d), a.max(d))));
    assert!(round_one.contains(&(b.min(c), b.max(c))));
}

#[tokio::test]
async fn test_five_teams_each_idle_once() {
    let f = fixture(5).await;
    let s = scheduler(&f, SchedulerConfig::default());

    let summary = s
        .schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
        .await
        .unwrap();
    assert_eq!(summary.rounds_created, 5);
    assert_eq!(summary.matches_created, 10);

    let schedule = s.load_schedule(f.category_id).await.unwrap();
    for team in &f.teams {
        let idle = (1..=5)
            .filter(|round| !schedule.matches_in_round(*round).any(|m| m.involves(*team)))
            .count();
        assert_eq!(idle, 1);
    }
}

#[tokio::test]
async fn test_rerun_replaces_previous_schedule() {
    let f = fixture(6).await;
    let s = scheduler(&f, SchedulerConfig::default());

    s.schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
        .await
        .unwrap();
    let first = s.load_schedule(f.category_id).await.unwrap();

    s.schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
        .await
        .unwrap();
    let second = s.load_schedule(f.category_id).await.unwrap();

    assert_eq!(second.groups.len(), 1);
    assert_eq!(second.rounds.len(), 5);
    assert_eq!(second.matches.len(), 15);
    assert_ne!(first.groups[0].id, second.groups[0].id);

    let first_ids: HashSet<_> = first.matches.iter().map(|m| m.id).collect();
    assert!(second.matches.iter().all(|m| !first_ids.contains(&m.id)));
    assert_eq!(f.store.replace_count(), 2);
}

#[tokio::test]
async fn test_too_few_teams_leaves_store_untouched() {
    for count in [0, 1] {
        let f = fixture(count).await;
        let s = scheduler(&f, SchedulerConfig::default());

        let err = s
            .schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::InsufficientTeams { needed: 2, current } if current == count
        ));
        assert_eq!(f.store.replace_count(), 0);
        assert!(s.load_schedule(f.category_id).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_too_few_teams_keeps_existing_schedule() {
    let f = fixture(3).await;
    let s = scheduler(&f, SchedulerConfig::default());
    s.schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
        .await
        .unwrap();

    let strict = scheduler(
        &f,
        SchedulerConfig::default().with_eligible_statuses(&[RegistrationStatus::Paid]),
    );
    let outcome = strict.run_group_stage(f.category_id, DEFAULT_GROUP_SIZE).await;

    assert!(!outcome.success);
    assert_eq!(
        outcome.message,
        "At least 2 teams are required to generate matches."
    );
    assert_eq!(s.load_schedule(f.category_id).await.unwrap().matches.len(), 3);
}

#[tokio::test]
async fn test_unknown_category_is_not_found() {
    let f = fixture(4).await;
    let s = scheduler(&f, SchedulerConfig::default());

    let missing = Uuid::new_v4();
    let err = s
        .schedule_group_stage(missing, DEFAULT_GROUP_SIZE)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(id) if id == missing));
    assert!(matches!(
        s.load_schedule(missing).await,
        Err(SchedulingError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_category_without_tournament_is_integrity_error() {
    let f = fixture(4).await;
    f.store
        .insert_category(Category {
            id: f.category_id,
            name: "Orphan".to_string(),
            tournament_id: None,
        })
        .await;
    let s = scheduler(&f, SchedulerConfig::default());

    let outcome = s.run_group_stage(f.category_id, DEFAULT_GROUP_SIZE).await;
    assert!(!outcome.success);
    assert_eq!(
        outcome.message,
        "Category is not linked to a valid tournament."
    );
    assert_eq!(f.store.replace_count(), 0);
}

#[tokio::test]
async fn test_only_eligible_statuses_are_drawn() {
    let f = fixture(0).await;
    let mut approved = Vec::new();
    for status in [
        RegistrationStatus::Approved,
        RegistrationStatus::Pending,
        RegistrationStatus::Paid,
        RegistrationStatus::Rejected,
        RegistrationStatus::Approved,
    ] {
        let team = Team::new(f.category_id).with_status(status);
        if matches!(status, RegistrationStatus::Approved | RegistrationStatus::Paid) {
            approved.push(team.id);
        }
        f.store.insert_team(team).await;
    }

    let config = SchedulerConfig::default()
        .with_eligible_statuses(&[RegistrationStatus::Approved, RegistrationStatus::Paid]);
    let s = scheduler(&f, config);
    let summary = s
        .schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
        .await
        .unwrap();
    assert_eq!(summary.matches_created, 3);

    let schedule = s.load_schedule(f.category_id).await.unwrap();
    assert_eq!(schedule.groups[0].team_ids, approved);
}

#[tokio::test]
async fn test_default_config_draws_every_status() {
    let f = fixture(0).await;
    for status in RegistrationStatus::ALL {
        f.store
            .insert_team(Team::new(f.category_id).with_status(status))
            .await;
    }

    let s = scheduler(&f, SchedulerConfig::default());
    let summary = s
        .schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
        .await
        .unwrap();
    assert_eq!(summary.matches_created, 6);
}

#[tokio::test]
async fn test_seeded_draw_is_reproducible() {
    let f = fixture(10).await;
    let config = SchedulerConfig::default()
        .with_strategy(GroupingStrategy::FixedSizeGroups(4))
        .with_ordering(TeamOrdering::Seeded(2024));
    let s = scheduler(&f, config);

    let preview = s.preview_group_stage(f.category_id).await.unwrap();
    s.schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
        .await
        .unwrap();
    let schedule = s.load_schedule(f.category_id).await.unwrap();

    let stored: Vec<_> = schedule.groups.iter().map(|g| g.team_ids.clone()).collect();
    let previewed: Vec<_> = preview.groups.iter().map(|g| g.team_ids.clone()).collect();
    assert_eq!(stored, previewed);
}

#[tokio::test]
async fn test_fixed_size_groups() {
    let f = fixture(10).await;
    let config = SchedulerConfig::default().with_strategy(GroupingStrategy::FixedSizeGroups(4));
    let s = scheduler(&f, config);

    let summary = s
        .schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
        .await
        .unwrap();
    // Groups of 4, 3 and 3
    assert_eq!(summary.groups_created, 3);
    assert_eq!(summary.rounds_created, 3);
    assert_eq!(summary.matches_created, 6 + 3 + 3);

    let schedule = s.load_schedule(f.category_id).await.unwrap();
    let names: Vec<_> = schedule.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Grupo A", "Grupo B", "Grupo C"]);

    for m in &schedule.matches {
        let group = schedule
            .groups
            .iter()
            .find(|g| Some(g.id) == m.group_id)
            .unwrap();
        assert!(group.team_ids.contains(&m.team_a));
        assert!(group.team_ids.contains(&m.team_b));
    }
}

#[tokio::test]
async fn test_explicit_strategy_overrides_config() {
    let f = fixture(8).await;
    let s = scheduler(&f, SchedulerConfig::default());

    let summary = s
        .schedule_with_strategy(f.category_id, GroupingStrategy::FixedSizeGroups(4))
        .await
        .unwrap();
    assert_eq!(summary.groups_created, 2);
    assert_eq!(summary.matches_created, 12);
}

#[tokio::test]
async fn test_store_failure_keeps_previous_schedule() {
    let f = fixture(4).await;
    let s = scheduler(&f, SchedulerConfig::default());
    s.schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
        .await
        .unwrap();
    let before = s.load_schedule(f.category_id).await.unwrap();

    f.store.fail_at(Some(FailurePoint::InsertMatches)).await;
    let outcome = s.run_group_stage(f.category_id, DEFAULT_GROUP_SIZE).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Internal error while generating matches.");

    assert_eq!(s.load_schedule(f.category_id).await.unwrap(), before);

    f.store.fail_at(None).await;
    assert!(s.run_group_stage(f.category_id, DEFAULT_GROUP_SIZE).await.success);
}

#[tokio::test]
async fn test_knockout_matches_are_preserved() {
    let f = fixture(4).await;
    let knockout = Match {
        id: Uuid::new_v4(),
        tournament_id: f.tournament_id,
        category_id: f.category_id,
        group_id: None,
        team_a: f.teams[0],
        team_b: f.teams[3],
        phase: MatchPhase::Knockout,
        status: MatchStatus::Finished,
        round_number: None,
    };
    f.store.insert_match(knockout.clone()).await;

    let s = scheduler(&f, SchedulerConfig::default());
    s.schedule_group_stage(f.category_id, DEFAULT_GROUP_SIZE)
        .await
        .unwrap();

    let all = f.store.all_matches(f.category_id).await;
    assert_eq!(all.len(), 7);
    assert!(all.contains(&knockout));
}

#[tokio::test]
async fn test_concurrent_runs_leave_one_schedule() {
    let f = fixture(7).await;
    let s = scheduler(&f, SchedulerConfig::default());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let s = s.clone();
        let category_id = f.category_id;
        handles.push(tokio::spawn(async move {
            s.schedule_group_stage(category_id, DEFAULT_GROUP_SIZE).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let schedule = s.load_schedule(f.category_id).await.unwrap();
    assert_eq!(schedule.groups.len(), 1);
    assert_eq!(schedule.rounds.len(), 7);
    assert_eq!(schedule.matches.len(), 21);
    assert_eq!(f.store.replace_count(), 8);
}
