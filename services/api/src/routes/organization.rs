//! Organization read models

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use common::{Identity, chain, hierarchy::build_forest, response::ApiResponse};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{DepartmentDetails, OrganizationStructure, SearchQuery},
    state::AppState,
};

/// `GET /api/organization/structure`
pub async fn structure(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let employees = state
        .employees
        .organization_members()
        .await
        .map_err(ApiError::internal("Failed to get organization structure"))?;
    let departments = state
        .departments
        .list()
        .await
        .map_err(ApiError::internal("Failed to get organization structure"))?;

    let hierarchy = build_forest(&employees);

    Ok(Json(ApiResponse::ok(OrganizationStructure {
        hierarchy,
        departments,
        employees,
    })))
}

/// `GET /api/organization/:employee_id/reporting-chain`
pub async fn reporting_chain(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(employee_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !identity.can_view_records_of(&employee_id) {
        info!(
            "Denied user {} the reporting chain of {}",
            identity.id, employee_id
        );
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    let chain = chain::reporting_chain(&state.employees, &employee_id).await?;
    Ok(Json(ApiResponse::ok(chain)))
}

/// `GET /api/organization/search`
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let employees = state
        .employees
        .search(&query)
        .await
        .map_err(ApiError::internal("Failed to search employees"))?;

    Ok(Json(ApiResponse::ok(employees)))
}

/// `GET /api/organization/departments/:department_id`
pub async fn department_details(
    State(state): State<AppState>,
    Path(department_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let department = state
        .departments
        .find(&department_id)
        .await
        .map_err(ApiError::internal("Failed to get department details"))?
        .ok_or_else(|| ApiError::NotFound("Department not found".to_string()))?;

    let employees = state
        .departments
        .members(&department_id)
        .await
        .map_err(ApiError::internal("Failed to get department details"))?;

    Ok(Json(ApiResponse::ok(DepartmentDetails {
        department,
        employees,
    })))
}

