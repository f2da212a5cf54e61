// src/handlers/dashboard.rs

use axum::{extract::State, Json};
use axum_extra::extract::Query;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::dashboard::{DashboardFilterQuery, DashboardOptions, DashboardResponse},
};

// GET /dashboard
// O extrator Query do axum-extra aceita o parâmetro repetido
// (?courseIds=a&courseIds=b); o do axum puro não aceita.
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Dashboard",
    params(DashboardFilterQuery),
    responses(
        (status = 200, description = "Resumo, gráficos e tabela do painel", body = DashboardResponse),
        (status = 400, description = "Filtro malformado"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard_data(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filters): Query<DashboardFilterQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let data = app_state.dashboard_service.get_dashboard_data(&filters).await?;
    Ok(Json(data))
}

// GET /dashboard/options
#[utoipa::path(
    get,
    path = "/dashboard/options",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Categorias e cursos para os controles de filtro", body = DashboardOptions),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_options(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<DashboardOptions>, AppError> {
    let options = app_state.dashboard_service.get_options().await?;
    Ok(Json(options))
}
