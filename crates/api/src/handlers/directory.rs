//! Handlers for counterparties: `/clients`, `/suppliers` and the visitor's
//! own `/visitor/profile`.
//!
//! Any employee may read; writes need manager or admin. INN uniqueness is
//! left to the `uq_*_inn` constraints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use warehub_core::error::CoreError;
use warehub_core::roles::Role;
use warehub_core::types::DbId;
use warehub_core::validation::{normalize_email, validate_inn, validate_name};
use warehub_db::models::directory::{
    Client, CreateClient, CreateSupplier, Supplier, UpdateClient, UpdateSupplier,
};
use warehub_db::repositories::{ClientRepo, RoleRepo, SupplierRepo, VisitorRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthEmployee, AuthVisitor};
use crate::middleware::rbac::RequireManager;
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn normalize_optional_email(email: Option<String>) -> AppResult<Option<String>> {
    Ok(email
        .filter(|e| !e.trim().is_empty())
        .map(|e| normalize_email(&e))
        .transpose()?)
}

/// A visitor linked to a counterparty must hold the matching role.
async fn check_visitor_link(state: &AppState, visitor_id: DbId, role: Role) -> AppResult<()> {
    let visitor = VisitorRepo::find_by_id(&state.pool, visitor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Visitor", visitor_id))?;
    let role_name = RoleRepo::resolve_name(&state.pool, visitor.role_id).await?;
    if role_name != role.as_str() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Visitor {visitor_id} is not a {role} account"
        ))));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

/// GET /api/v1/clients?q=
pub async fn list_clients(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Client>>>> {
    let clients = ClientRepo::list(&state.pool, params.q.as_deref()).await?;
    Ok(Json(DataResponse { data: clients }))
}

/// POST /api/v1/clients
pub async fn create_client(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Json(mut input): Json<CreateClient>,
) -> AppResult<(StatusCode, Json<DataResponse<Client>>)> {
    validate_name("Client name", &input.name)?;
    input.inn = validate_inn(&input.inn)?;
    input.email = normalize_optional_email(input.email)?;
    if let Some(visitor_id) = input.visitor_id {
        check_visitor_link(&state, visitor_id, Role::Client).await?;
    }

    let client = ClientRepo::create(&state.pool, &input).await?;
    tracing::info!(client_id = client.id, "Client created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: client })))
}

/// GET /api/v1/clients/{id}
pub async fn get_client(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Client>>> {
    let client = ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Client", id))?;
    Ok(Json(DataResponse { data: client }))
}

/// PUT /api/v1/clients/{id}
pub async fn update_client(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateClient>,
) -> AppResult<Json<DataResponse<Client>>> {
    if let Some(name) = &input.name {
        validate_name("Client name", name)?;
    }
    input.inn = input.inn.as_deref().map(validate_inn).transpose()?;
    input.email = normalize_optional_email(input.email)?;

    let client = ClientRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Client", id))?;
    Ok(Json(DataResponse { data: client }))
}

/// DELETE /api/v1/clients/{id}
///
/// Clients with orders are protected by the foreign key (409).
pub async fn delete_client(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ClientRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Client", id))
    }
}

// ---------------------------------------------------------------------------
// Suppliers
// ---------------------------------------------------------------------------

/// GET /api/v1/suppliers?q=
pub async fn list_suppliers(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Supplier>>>> {
    let suppliers = SupplierRepo::list(&state.pool, params.q.as_deref()).await?;
    Ok(Json(DataResponse { data: suppliers }))
}

/// POST /api/v1/suppliers
pub async fn create_supplier(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Json(mut input): Json<CreateSupplier>,
) -> AppResult<(StatusCode, Json<DataResponse<Supplier>>)> {
    validate_name("Supplier name", &input.name)?;
    input.inn = validate_inn(&input.inn)?;
    input.email = normalize_optional_email(input.email)?;
    if let Some(visitor_id) = input.visitor_id {
        check_visitor_link(&state, visitor_id, Role::Supplier).await?;
    }

    let supplier = SupplierRepo::create(&state.pool, &input).await?;
    tracing::info!(supplier_id = supplier.id, "Supplier created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: supplier })))
}

/// GET /api/v1/suppliers/{id}
pub async fn get_supplier(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Supplier>>> {
    let supplier = SupplierRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Supplier", id))?;
    Ok(Json(DataResponse { data: supplier }))
}

/// PUT /api/v1/suppliers/{id}
pub async fn update_supplier(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateSupplier>,
) -> AppResult<Json<DataResponse<Supplier>>> {
    if let Some(name) = &input.name {
        validate_name("Supplier name", name)?;
    }
    input.inn = input.inn.as_deref().map(validate_inn).transpose()?;
    input.email = normalize_optional_email(input.email)?;

    let supplier = SupplierRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Supplier", id))?;
    Ok(Json(DataResponse { data: supplier }))
}

/// DELETE /api/v1/suppliers/{id}
pub async fn delete_supplier(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SupplierRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Supplier", id))
    }
}

// ---------------------------------------------------------------------------
// Visitor profile
// ---------------------------------------------------------------------------

/// The counterparty record a visitor acts for.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Profile {
    Client(Client),
    Supplier(Supplier),
}

/// Request body for `PUT /visitor/profile`.
///
/// `name` and `inn` are required the first time, when the record is created.
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub inn: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Suppliers only.
    pub contact_person: Option<String>,
}

/// GET /api/v1/visitor/profile
pub async fn get_profile(
    State(state): State<AppState>,
    visitor: AuthVisitor,
) -> AppResult<Json<DataResponse<Profile>>> {
    let no_profile = || {
        AppError::Core(CoreError::Validation(
            "No counterparty record is linked to this account yet".into(),
        ))
    };
    let profile = match visitor.role {
        Role::Client => Profile::Client(
            ClientRepo::find_by_visitor(&state.pool, visitor.visitor_id)
                .await?
                .ok_or_else(no_profile)?,
        ),
        _ => Profile::Supplier(
            SupplierRepo::find_by_visitor(&state.pool, visitor.visitor_id)
                .await?
                .ok_or_else(no_profile)?,
        ),
    };
    Ok(Json(DataResponse { data: profile }))
}

/// PUT /api/v1/visitor/profile
///
/// Creates the linked client/supplier record on first use, updates it after.
pub async fn put_profile(
    State(state): State<AppState>,
    visitor: AuthVisitor,
    Json(input): Json<ProfileRequest>,
) -> AppResult<Json<DataResponse<Profile>>> {
    if let Some(name) = &input.name {
        validate_name("Name", name)?;
    }
    let inn = input.inn.as_deref().map(validate_inn).transpose()?;
    let email = normalize_optional_email(input.email)?;

    let profile = match visitor.role {
        Role::Client => {
            let client = match ClientRepo::find_by_visitor(&state.pool, visitor.visitor_id).await? {
                Some(existing) => {
                    let update = UpdateClient {
                        name: input.name,
                        inn,
                        address: input.address,
                        phone: input.phone,
                        email,
                    };
                    ClientRepo::update(&state.pool, existing.id, &update)
                        .await?
                        .ok_or_else(|| AppError::not_found("Client", existing.id))?
                }
                None => {
                    let (name, inn) = require_name_and_inn(input.name, inn)?;
                    let create = CreateClient {
                        name,
                        inn,
                        address: input.address,
                        phone: input.phone,
                        email,
                        visitor_id: Some(visitor.visitor_id),
                    };
                    ClientRepo::create(&state.pool, &create).await?
                }
            };
            Profile::Client(client)
        }
        _ => {
            let supplier =
                match SupplierRepo::find_by_visitor(&state.pool, visitor.visitor_id).await? {
                    Some(existing) => {
                        let update = UpdateSupplier {
                            name: input.name,
                            inn,
                            address: input.address,
                            phone: input.phone,
                            email,
                            contact_person: input.contact_person,
                        };
                        SupplierRepo::update(&state.pool, existing.id, &update)
                            .await?
                            .ok_or_else(|| AppError::not_found("Supplier", existing.id))?
                    }
                    None => {
                        let (name, inn) = require_name_and_inn(input.name, inn)?;
                        let create = CreateSupplier {
                            name,
                            inn,
                            address: input.address,
                            phone: input.phone,
                            email,
                            contact_person: input.contact_person,
                            visitor_id: Some(visitor.visitor_id),
                        };
                        SupplierRepo::create(&state.pool, &create).await?
                    }
                };
            Profile::Supplier(supplier)
        }
    };

    Ok(Json(DataResponse { data: profile }))
}

fn require_name_and_inn(
    name: Option<String>,
    inn: Option<String>,
) -> AppResult<(String, String)> {
    match (name, inn) {
        (Some(name), Some(inn)) => Ok((name, inn)),
        _ => Err(AppError::Core(CoreError::Validation(
            "Name and INN are required to create a profile".into(),
        ))),
    }
}
