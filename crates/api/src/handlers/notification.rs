//! Handlers for in-app notifications.
//!
//! Employees use `/notifications`, visitors `/visitor/notifications`. A
//! principal only ever sees and marks its own rows.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use warehub_core::roles::PrincipalKind;
use warehub_core::types::DbId;
use warehub_db::models::notification::Notification;
use warehub_db::repositories::NotificationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthEmployee, AuthVisitor};
use crate::query::NotificationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked: u64,
}

/// The recipient a notification request acts for.
#[derive(Debug, Clone, Copy)]
struct Recipient {
    kind: PrincipalKind,
    id: DbId,
}

impl From<AuthEmployee> for Recipient {
    fn from(e: AuthEmployee) -> Self {
        Self {
            kind: PrincipalKind::Employee,
            id: e.employee_id,
        }
    }
}

impl From<AuthVisitor> for Recipient {
    fn from(v: AuthVisitor) -> Self {
        Self {
            kind: PrincipalKind::Visitor,
            id: v.visitor_id,
        }
    }
}

async fn list(
    state: &AppState,
    who: Recipient,
    params: NotificationParams,
) -> AppResult<Vec<Notification>> {
    Ok(NotificationRepo::list_for(
        &state.pool,
        who.kind.as_str(),
        who.id,
        params.unread_only,
        params.limit,
        params.offset,
    )
    .await?)
}

async fn mark_read(state: &AppState, who: Recipient, id: DbId) -> AppResult<StatusCode> {
    if NotificationRepo::mark_read(&state.pool, id, who.kind.as_str(), who.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Notification", id))
    }
}

async fn mark_all(state: &AppState, who: Recipient) -> AppResult<MarkedRead> {
    let marked = NotificationRepo::mark_all_read(&state.pool, who.kind.as_str(), who.id).await?;
    Ok(MarkedRead { marked })
}

async fn unread(state: &AppState, who: Recipient) -> AppResult<UnreadCount> {
    let unread = NotificationRepo::unread_count(&state.pool, who.kind.as_str(), who.id).await?;
    Ok(UnreadCount { unread })
}

// ---------------------------------------------------------------------------
// Employee
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications?unread_only=&limit=&offset=
pub async fn list_employee(
    State(state): State<AppState>,
    employee: AuthEmployee,
    Query(params): Query<NotificationParams>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let data = list(&state, employee.into(), params).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/notifications/{id}/read
pub async fn read_employee(
    State(state): State<AppState>,
    employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    mark_read(&state, employee.into(), id).await
}

/// POST /api/v1/notifications/read-all
pub async fn read_all_employee(
    State(state): State<AppState>,
    employee: AuthEmployee,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let data = mark_all(&state, employee.into()).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_employee(
    State(state): State<AppState>,
    employee: AuthEmployee,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let data = unread(&state, employee.into()).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Visitor
// ---------------------------------------------------------------------------

/// GET /api/v1/visitor/notifications?unread_only=&limit=&offset=
pub async fn list_visitor(
    State(state): State<AppState>,
    visitor: AuthVisitor,
    Query(params): Query<NotificationParams>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let data = list(&state, visitor.into(), params).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/visitor/notifications/{id}/read
pub async fn read_visitor(
    State(state): State<AppState>,
    visitor: AuthVisitor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    mark_read(&state, visitor.into(), id).await
}

/// POST /api/v1/visitor/notifications/read-all
pub async fn read_all_visitor(
    State(state): State<AppState>,
    visitor: AuthVisitor,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let data = mark_all(&state, visitor.into()).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/visitor/notifications/unread-count
pub async fn unread_visitor(
    State(state): State<AppState>,
    visitor: AuthVisitor,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let data = unread(&state, visitor.into()).await?;
    Ok(Json(DataResponse { data }))
}
