//! Handlers for write-off acts.
//!
//! Storekeepers file acts against a stock line; a director approves or
//! rejects them. Approval decrements the stock in the same transaction.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use warehub_core::error::CoreError;
use warehub_core::statuses::WriteOffActStatus;
use warehub_core::types::DbId;
use warehub_core::validation::{validate_name, validate_positive_quantity, validate_text};
use warehub_core::workflow::{check_transition, WRITE_OFF_TRANSITIONS};
use warehub_db::models::write_off::{CreateWriteOffAct, WriteOffAct, WriteOffFilter};
use warehub_db::repositories::{ApprovalOutcome, StorageZoneRepo, WriteOffActRepo, ZoneProductRepo};
use warehub_events::bus::{WRITE_OFF_CREATED, WRITE_OFF_DECIDED};
use warehub_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthEmployee;
use crate::middleware::rbac::{RequireDirector, RequireStorekeeper};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /write-off-acts`.
#[derive(Debug, Deserialize)]
pub struct CreateWriteOffRequest {
    pub zone_id: DbId,
    pub product_id: DbId,
    pub quantity: i32,
    pub reason: String,
}

/// Optional note attached to a decision.
#[derive(Debug, Default, Deserialize)]
pub struct DecisionRequest {
    pub note: Option<String>,
}

/// GET /api/v1/write-off-acts?status=&limit=&offset=
pub async fn list_acts(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Query(mut filter): Query<WriteOffFilter>,
) -> AppResult<Json<DataResponse<Vec<WriteOffAct>>>> {
    filter.status = filter
        .status
        .as_deref()
        .map(|s| WriteOffActStatus::from_str_db(s.trim()).map(|s| s.as_str().to_string()))
        .transpose()?;
    let acts = WriteOffActRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: acts }))
}

/// POST /api/v1/write-off-acts
///
/// The zone must currently hold the product; the quantity is checked again
/// at approval time.
pub async fn create_act(
    State(state): State<AppState>,
    RequireStorekeeper(storekeeper): RequireStorekeeper,
    Json(input): Json<CreateWriteOffRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<WriteOffAct>>)> {
    validate_positive_quantity(input.quantity)?;
    let reason = input.reason.trim().to_string();
    validate_name("Reason", &reason)?;
    validate_text("Reason", &reason)?;

    StorageZoneRepo::find_by_id(&state.pool, input.zone_id)
        .await?
        .ok_or_else(|| AppError::not_found("StorageZone", input.zone_id))?;
    let held = ZoneProductRepo::list_by_zone(&state.pool, input.zone_id)
        .await?
        .into_iter()
        .find(|l| l.product_id == input.product_id)
        .map_or(0, |l| l.quantity);
    if held < input.quantity {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Zone {} holds {held} unit(s) of product {}",
            input.zone_id, input.product_id
        ))));
    }

    let act = WriteOffActRepo::create(
        &state.pool,
        &CreateWriteOffAct {
            zone_id: input.zone_id,
            product_id: input.product_id,
            quantity: input.quantity,
            reason,
            created_by: storekeeper.employee_id,
        },
    )
    .await?;

    tracing::info!(act_id = act.id, zone_id = act.zone_id, quantity = act.quantity, "Write-off act filed");
    state.publish(
        DomainEvent::new(WRITE_OFF_CREATED)
            .with_entity("write_off_act", act.id)
            .with_actor(storekeeper.actor())
            .with_payload(json!({ "created_by": act.created_by, "quantity": act.quantity })),
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: act })))
}

/// GET /api/v1/write-off-acts/{id}
pub async fn get_act(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<WriteOffAct>>> {
    let act = WriteOffActRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("WriteOffAct", id))?;
    Ok(Json(DataResponse { data: act }))
}

/// POST /api/v1/write-off-acts/{id}/approve
pub async fn approve_act(
    State(state): State<AppState>,
    RequireDirector(director): RequireDirector,
    Path(id): Path<DbId>,
    body: Option<Json<DecisionRequest>>,
) -> AppResult<Json<DataResponse<WriteOffAct>>> {
    let note = decision_note(body)?;
    precheck(&state, id, WriteOffActStatus::Approved, &director).await?;

    let outcome = WriteOffActRepo::approve(&state.pool, id, director.employee_id, note.as_deref())
        .await?
        .ok_or_else(|| AppError::not_found("WriteOffAct", id))?;
    let act = match outcome {
        ApprovalOutcome::Approved(act) => act,
        ApprovalOutcome::NotPending(act) => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Write-off act {id} was already decided ('{}')",
                act.status
            ))));
        }
        ApprovalOutcome::InsufficientStock { available } => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Not enough stock to write off: {available} unit(s) left in the zone"
            ))));
        }
    };

    tracing::info!(act_id = id, director_id = director.employee_id, "Write-off approved");
    publish_decision(&state, &act, &director);
    Ok(Json(DataResponse { data: act }))
}

/// POST /api/v1/write-off-acts/{id}/reject
pub async fn reject_act(
    State(state): State<AppState>,
    RequireDirector(director): RequireDirector,
    Path(id): Path<DbId>,
    body: Option<Json<DecisionRequest>>,
) -> AppResult<Json<DataResponse<WriteOffAct>>> {
    let note = decision_note(body)?;
    precheck(&state, id, WriteOffActStatus::Rejected, &director).await?;

    let act = WriteOffActRepo::reject(&state.pool, id, director.employee_id, note.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Write-off act {id} was already decided"
            )))
        })?;

    tracing::info!(act_id = id, director_id = director.employee_id, "Write-off rejected");
    publish_decision(&state, &act, &director);
    Ok(Json(DataResponse { data: act }))
}

fn decision_note(body: Option<Json<DecisionRequest>>) -> AppResult<Option<String>> {
    let note = body
        .and_then(|Json(b)| b.note)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    if let Some(note) = &note {
        validate_text("Decision note", note)?;
    }
    Ok(note)
}

/// Existence and workflow check before the locking repository call.
async fn precheck(
    state: &AppState,
    id: DbId,
    target: WriteOffActStatus,
    director: &AuthEmployee,
) -> AppResult<()> {
    let act = WriteOffActRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("WriteOffAct", id))?;
    let from = WriteOffActStatus::from_str_db(&act.status)?;
    check_transition(WRITE_OFF_TRANSITIONS, "write-off act", from, target, director.role)?;
    Ok(())
}

fn publish_decision(state: &AppState, act: &WriteOffAct, director: &AuthEmployee) {
    state.publish(
        DomainEvent::new(WRITE_OFF_DECIDED)
            .with_entity("write_off_act", act.id)
            .with_actor(director.actor())
            .with_payload(json!({ "created_by": act.created_by, "status": act.status })),
    );
}
