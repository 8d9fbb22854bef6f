//! Employee handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::{
    Identity,
    guard::{EmployeeAction, EmployeeDirectory, authorize_employee},
    hierarchy::ensure_acyclic_change,
    models::{EmployeeUpdate, NewEmployee},
    response::ApiResponse,
    roles::RoleTier,
};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{EmployeeFilter, EmployeeListQuery, EmployeeListResponse, ListScope, Pagination},
    state::AppState,
};

/// Rows a list request may see, narrowed by the caller's tier
pub async fn list_scope(
    identity: &Identity,
    directory: &dyn EmployeeDirectory,
) -> ApiResult<ListScope> {
    if identity.has_universal_access() {
        return Ok(ListScope::All);
    }

    let scope = match RoleTier::from_role_id(&identity.role) {
        RoleTier::Manager => ListScope::ReportsOf(identity.employee_id.clone()),
        RoleTier::DepartmentHead => match directory.department_of(&identity.employee_id).await? {
            Some(department) => ListScope::Department(department),
            None => ListScope::Only(identity.employee_id.clone()),
        },
        _ => ListScope::All,
    };

    Ok(scope)
}

/// `GET /api/employees`
pub async fn list_employees(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<EmployeeListQuery>,
) -> ApiResult<Json<EmployeeListResponse>> {
    let (page, limit) = query.page_window();
    let filter = EmployeeFilter {
        scope: list_scope(&identity, &state.employees).await?,
        department: query.department,
        status: query.status,
        search: query.search,
        page,
        limit,
    };

    let (employees, total) = state
        .employees
        .list(&filter)
        .await
        .map_err(ApiError::internal("Failed to get employees"))?;

    Ok(Json(EmployeeListResponse {
        success: true,
        data: employees,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// `POST /api/employees`
pub async fn create_employee(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<impl IntoResponse> {
    let new: NewEmployee = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid employee: {}", e)))?;
    new.validate().map_err(ApiError::BadRequest)?;

    if let Some(manager_id) = new.manager_id.as_deref().filter(|m| !m.trim().is_empty()) {
        let exists = state
            .employees
            .exists(manager_id)
            .await
            .map_err(ApiError::internal("Failed to create employee"))?;
        if !exists {
            return Err(ApiError::BadRequest("Manager not found".to_string()));
        }
    }

    let employee = state
        .employees
        .create(&new)
        .await
        .map_err(ApiError::internal("Failed to create employee"))?;

    info!("User {} created employee {}", identity.id, employee.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(employee).with_message("Employee created successfully")),
    ))
}

/// `GET /api/employees/:id`
pub async fn get_employee(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    authorize_employee(&identity, &id, EmployeeAction::View, &state.employees).await?;

    let employee = state
        .employees
        .find(&id)
        .await
        .map_err(ApiError::internal("Failed to get employee"))?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    Ok(Json(ApiResponse::ok(employee)))
}

/// `PUT /api/employees/:id`
pub async fn update_employee(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<impl IntoResponse> {
    let access = authorize_employee(&identity, &id, EmployeeAction::Edit, &state.employees).await?;

    let update: EmployeeUpdate = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid update: {}", e)))?;
    let mut update = access.apply(update)?;
    update.normalize();

    if update.is_empty() {
        return Err(ApiError::BadRequest("No valid fields to update".to_string()));
    }

    if let Some(Some(manager_id)) = update.manager_change() {
        let exists = state
            .employees
            .exists(manager_id)
            .await
            .map_err(ApiError::internal("Failed to update employee"))?;
        if !exists {
            return Err(ApiError::BadRequest("Manager not found".to_string()));
        }

        let links = state
            .employees
            .manager_links()
            .await
            .map_err(ApiError::internal("Failed to update employee"))?;
        ensure_acyclic_change(
            links.iter().map(|(e, m)| (e.as_str(), m.as_deref())),
            &id,
            Some(manager_id),
        )?;
    }

    let employee = state
        .employees
        .update(&id, &update)
        .await
        .map_err(ApiError::internal("Failed to update employee"))?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    Ok(Json(
        ApiResponse::ok(employee).with_message("Employee updated successfully"),
    ))
}

/// `GET /api/employees/managers/:department_id`
pub async fn managers_by_department(
    State(state): State<AppState>,
    Path(department_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let managers = state
        .employees
        .managers_in_department(&department_id)
        .await
        .map_err(ApiError::internal("Failed to get managers"))?;

    Ok(Json(ApiResponse::ok(managers)))
}

/// `GET /api/employees/:id/documents`
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !identity.can_view_records_of(&id) {
        info!("Denied user {} the documents of {}", identity.id, id);
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    let documents = state
        .documents
        .for_employee(&id)
        .await
        .map_err(ApiError::internal("Failed to get documents"))?;

    Ok(Json(ApiResponse::ok(documents)))
}
