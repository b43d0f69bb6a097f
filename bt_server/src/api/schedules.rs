//! Group-stage API handlers.
//!
//! - Generating (or regenerating) a category's group stage
//! - Previewing the draw without storing it
//! - Reading back the stored schedule
//!
//! # Examples
//!
//! Generate the group stage of a category:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/admin/categories/$CATEGORY/group-stage \
//!   -H "Content-Type: application/json" \
//!   -d '{"group_size": 4}'
//! ```

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use beach_tennis::{
    scheduling::{
        DEFAULT_GROUP_SIZE, FailureKind, GroupStagePlan, ScheduleOutcome, SchedulingError,
    },
    tournament::{CategoryId, CategorySchedule, TeamId},
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{AppState, request_id::RequestId};
use crate::logging::log_scheduling_run;

#[derive(Debug, Deserialize)]
pub struct GenerateGroupStageRequest {
    #[serde(default = "default_group_size")]
    pub group_size: usize,
}

impl Default for GenerateGroupStageRequest {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
        }
    }
}

fn default_group_size() -> usize {
    DEFAULT_GROUP_SIZE
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlannedPairing {
    pub team_a: TeamId,
    pub team_b: TeamId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlannedRound {
    pub number: u32,
    pub matches: Vec<PlannedPairing>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlannedGroupResponse {
    pub name: String,
    pub team_ids: Vec<TeamId>,
    pub rounds: Vec<PlannedRound>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupStagePreview {
    pub groups: Vec<PlannedGroupResponse>,
    pub round_count: usize,
    pub match_count: usize,
}

impl From<GroupStagePlan> for GroupStagePreview {
    fn from(plan: GroupStagePlan) -> Self {
        let round_count = plan.round_count();
        let match_count = plan.match_count();

        let groups = plan
            .groups
            .into_iter()
            .map(|group| PlannedGroupResponse {
                rounds: group
                    .rounds
                    .iter()
                    .enumerate()
                    .map(|(index, pairings)| PlannedRound {
                        number: index as u32 + 1,
                        matches: pairings
                            .iter()
                            .map(|p| PlannedPairing {
                                team_a: p.home,
                                team_b: p.away,
                            })
                            .collect(),
                    })
                    .collect(),
                name: group.name,
                team_ids: group.team_ids,
            })
            .collect();

        Self {
            groups,
            round_count,
            match_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// HTTP status for a scheduling failure
pub fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::DataIntegrity => StatusCode::CONFLICT,
        FailureKind::InsufficientTeams => StatusCode::UNPROCESSABLE_ENTITY,
        FailureKind::StoreFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &SchedulingError) -> (StatusCode, Json<ErrorResponse>) {
    (
        status_for(error.kind()),
        Json(ErrorResponse {
            error: error.client_message(),
        }),
    )
}

/// Generate the group stage of a category, replacing any previous one.
///
/// # Request Body
///
/// Optional; `group_size` defaults to 4.
/// ```json
/// { "group_size": 4 }
/// ```
///
/// # Response
///
/// Runs through [`GroupStageScheduler::run_group_stage`], which logs refusals
/// and store failures. Returns `200 OK` with the outcome:
/// ```json
/// {
///   "success": true,
///   "message": "6 matches generated in 1 group(s) over 3 round(s).",
///   "summary": { "groups_created": 1, "rounds_created": 3, "matches_created": 6 }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body
/// - `404 Not Found`: Category doesn't exist
/// - `409 Conflict`: Category has no valid tournament
/// - `422 Unprocessable Entity`: Fewer than two eligible teams
/// - `500 Internal Server Error`: Store failure; the previous schedule is kept
///
/// Failed outcomes carry `"success": false` and an `error` code such as
/// `"INSUFFICIENT_TEAMS"`.
///
/// [`GroupStageScheduler::run_group_stage`]: beach_tennis::GroupStageScheduler::run_group_stage
pub async fn generate_group_stage(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(category_id): Path<CategoryId>,
    body: Bytes,
) -> Result<Json<ScheduleOutcome>, (StatusCode, Json<ScheduleOutcome>)> {
    let request: GenerateGroupStageRequest = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateGroupStageRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ScheduleOutcome {
                    success: false,
                    message: format!("Invalid request body: {e}"),
                    summary: None,
                    error: None,
                }),
            )
        })?
    };

    let started = Instant::now();
    let outcome = state
        .scheduler
        .run_group_stage(category_id, request.group_size)
        .await;

    log_scheduling_run(
        request_id.as_str(),
        &category_id.to_string(),
        outcome.success,
        started.elapsed(),
    );

    let failure = outcome.error;
    match failure {
        None => Ok(Json(outcome)),
        Some(kind) => Err((status_for(kind), Json(outcome))),
    }
}

/// Preview the draw of a category without storing anything.
///
/// Returns `200 OK` with groups, per-round pairings and totals. With a
/// seeded or preserved ordering the preview matches what a generate call
/// would store.
///
/// # Errors
///
/// Same mapping as [`generate_group_stage`].
pub async fn preview_group_stage(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<GroupStagePreview>, (StatusCode, Json<ErrorResponse>)> {
    state
        .scheduler
        .preview_group_stage(category_id)
        .await
        .map(|plan| Json(plan.into()))
        .map_err(|e| error_response(&e))
}

/// Get the stored group stage of a category.
///
/// Returns `200 OK` with `groups`, `rounds` and `matches`; all three are
/// empty when no group stage has been generated yet.
///
/// # Errors
///
/// - `404 Not Found`: Category doesn't exist
/// - `500 Internal Server Error`: Store failure
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<CategorySchedule>, (StatusCode, Json<ErrorResponse>)> {
    state
        .scheduler
        .load_schedule(category_id)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let id = Uuid::new_v4();
        let cases = [
            (SchedulingError::NotFound(id), StatusCode::NOT_FOUND),
            (
                SchedulingError::DataIntegrity {
                    category_id: id,
                    reason: "no tournament".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (
                SchedulingError::InsufficientTeams {
                    needed: 2,
                    current: 0,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                SchedulingError::StoreFailure("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(status_for(error.kind()), status);
            assert_eq!(error_response(&error).0, status);
        }
    }

    #[test]
    fn test_request_defaults_group_size() {
        let request: GenerateGroupStageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.group_size, DEFAULT_GROUP_SIZE);

        let request: GenerateGroupStageRequest =
            serde_json::from_str(r#"{"group_size": 6}"#).unwrap();
        assert_eq!(request.group_size, 6);
    }
}
