// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard_data,
        handlers::dashboard::get_options,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::CourseRevenueEntry,
            models::dashboard::CategoryRevenueEntry,
            models::dashboard::RecentSaleEntry,
            models::dashboard::LeadStatusEntry,
            models::dashboard::SalesHistoryPoint,
            models::dashboard::SalesHistorySeries,
            models::dashboard::DashboardCharts,
            models::dashboard::DashboardResponse,
            models::dashboard::CategoryOption,
            models::dashboard::CourseOption,
            models::dashboard::DashboardOptions,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
