// src/models/dashboard.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ---
// Filtros (entrada)
// ---

// Parâmetros de query do GET /dashboard. Datas malformadas são rejeitadas
// aqui, na desserialização, antes de chegar no construtor de filtros.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct DashboardFilterQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub course_name: Option<String>,
    // Parâmetro repetido: ?courseIds=a&courseIds=b
    pub course_ids: Vec<Uuid>,
    pub category_id: Option<Uuid>,
    pub status: Option<String>,
}

// Restrições no nível do curso (nome, IDs, categoria).
// Só existe quando pelo menos uma regra se aplica.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseFilter {
    pub name_contains: Option<String>,
    pub ids: Option<Vec<Uuid>>,
    pub category_id: Option<Uuid>,
}

// Predicado imutável compartilhado por todas as queries de agregação.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionFilter {
    // Só filtra por data quando AMBAS as pontas vierem preenchidas.
    pub period: Option<(NaiveDate, NaiveDate)>,
    pub status: Option<String>,
    pub course: Option<CourseFilter>,
}

impl SubscriptionFilter {
    // Função pura: nunca toca o banco, nunca muta o DTO de entrada.
    pub fn from_query(query: &DashboardFilterQuery) -> Self {
        let name_contains = query
            .course_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);

        // Lista vazia é tratada igual a ausente: sem restrição de IDs.
        let ids = if query.course_ids.is_empty() {
            None
        } else {
            Some(query.course_ids.clone())
        };

        let course = if name_contains.is_none() && ids.is_none() && query.category_id.is_none() {
            None
        } else {
            Some(CourseFilter {
                name_contains,
                ids,
                category_id: query.category_id,
            })
        };

        Self {
            period: period_from_bounds(query.start_date, query.end_date),
            status: query.status.clone(),
            course,
        }
    }
}

// Predicado mais estreito, aplicado na tabela de leads (não em subscriptions).
#[derive(Debug, Clone, PartialEq)]
pub struct LeadFilter {
    pub period: Option<(NaiveDate, NaiveDate)>,
    pub category_id: Option<Uuid>,
}

impl LeadFilter {
    pub fn from_query(query: &DashboardFilterQuery) -> Self {
        Self {
            period: period_from_bounds(query.start_date, query.end_date),
            category_id: query.category_id,
        }
    }
}

// Par parcial (só start ou só end) não restringe nada.
fn period_from_bounds(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Option<(NaiveDate, NaiveDate)> {
    match (start, end) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => None,
    }
}

// ---
// Linhas intermediárias (saem do banco, entram nas funções de agrupamento)
// ---

#[derive(Debug, FromRow)]
pub struct SummaryRow {
    pub total_revenue: Decimal,
    pub total_sales: i64,
}

#[derive(Debug, FromRow)]
pub struct CategorySaleRow {
    pub paid_price: Decimal,
    // NULL quando o curso não tem categoria (ou a assinatura aponta para curso inexistente)
    pub category: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct SaleHistoryRow {
    pub course_name: String,
    pub sale_date: DateTime<Utc>,
    pub paid_price: Decimal,
}

// ---
// Resposta (saída)
// ---

// 1. Cards de resumo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_revenue: Decimal,
    pub total_sales: i64,
    pub average_ticket: Decimal,
}

// 2. Top 5 cursos por receita
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRevenueEntry {
    pub name: String,
    pub total_revenue: Decimal,
    pub count: i64,
}

// 3. Receita por categoria (agrupada em memória)
#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRevenueEntry {
    pub category: String,
    pub value: Decimal,
}

// 4. Tabela de vendas recentes
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentSaleEntry {
    pub id: Uuid,
    pub status: String,
    pub sale_date: DateTime<Utc>,
    pub paid_price: Decimal,
    pub user_name: String,
    pub user_email: String,
    pub course_name: String,
}

// 5. Funil de leads
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadStatusEntry {
    pub status: String,
    pub count: i64,
}

// 6. Série temporal de vendas por curso
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesHistoryPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesHistorySeries {
    pub name: String,
    pub data: Vec<SalesHistoryPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub sales_by_course: Vec<CourseRevenueEntry>,
    pub sales_by_category: Vec<CategoryRevenueEntry>,
    pub leads_status: Vec<LeadStatusEntry>,
    pub sales_history: Vec<SalesHistorySeries>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub summary: DashboardSummary,
    pub charts: DashboardCharts,
    pub table: Vec<RecentSaleEntry>,
}

// Opções para popular os controles de filtro do front
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOption {
    pub id: Uuid,
    pub description: String,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseOption {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOptions {
    pub categories: Vec<CategoryOption>,
    pub courses: Vec<CourseOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("data válida no teste")
    }

    #[test]
    fn query_vazia_gera_predicado_sem_restricao() {
        let filter = SubscriptionFilter::from_query(&DashboardFilterQuery::default());
        assert_eq!(filter.period, None);
        assert_eq!(filter.status, None);
        assert_eq!(filter.course, None);
    }

    #[test]
    fn par_parcial_de_datas_nao_restringe() {
        let only_start = DashboardFilterQuery {
            start_date: Some(date("2026-01-01")),
            ..Default::default()
        };
        let only_end = DashboardFilterQuery {
            end_date: Some(date("2026-01-31")),
            ..Default::default()
        };

        assert_eq!(SubscriptionFilter::from_query(&only_start).period, None);
        assert_eq!(SubscriptionFilter::from_query(&only_end).period, None);
        assert_eq!(LeadFilter::from_query(&only_start).period, None);
    }

    #[test]
    fn par_completo_de_datas_vira_periodo() {
        let query = DashboardFilterQuery {
            start_date: Some(date("2026-01-01")),
            end_date: Some(date("2026-01-31")),
            ..Default::default()
        };
        let filter = SubscriptionFilter::from_query(&query);
        assert_eq!(filter.period, Some((date("2026-01-01"), date("2026-01-31"))));
    }

    #[test]
    fn lista_vazia_de_ids_equivale_a_ausente() {
        let query = DashboardFilterQuery {
            course_ids: vec![],
            ..Default::default()
        };
        assert_eq!(SubscriptionFilter::from_query(&query).course, None);
    }

    #[test]
    fn nome_em_branco_nao_gera_filtro_de_curso() {
        let query = DashboardFilterQuery {
            course_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(SubscriptionFilter::from_query(&query).course, None);
    }

    #[test]
    fn regras_de_curso_se_juntam_em_um_unico_predicado() {
        let id = Uuid::new_v4();
        let category_id = Uuid::new_v4();
        let query = DashboardFilterQuery {
            course_name: Some("Enem".to_string()),
            course_ids: vec![id],
            category_id: Some(category_id),
            status: Some("active".to_string()),
            ..Default::default()
        };

        let filter = SubscriptionFilter::from_query(&query);
        let course = filter.course.expect("deve ter filtro de curso");
        assert_eq!(course.name_contains.as_deref(), Some("Enem"));
        assert_eq!(course.ids, Some(vec![id]));
        assert_eq!(course.category_id, Some(category_id));
        assert_eq!(filter.status.as_deref(), Some("active"));
    }

    #[test]
    fn construtor_e_puro_e_deterministico() {
        let query = DashboardFilterQuery {
            start_date: Some(date("2026-02-01")),
            end_date: Some(date("2026-02-28")),
            course_name: Some("Médio".to_string()),
            status: Some("cancelled".to_string()),
            ..Default::default()
        };
        assert_eq!(
            SubscriptionFilter::from_query(&query),
            SubscriptionFilter::from_query(&query)
        );
    }

    #[test]
    fn filtro_de_leads_usa_so_categoria_e_periodo() {
        let category_id = Uuid::new_v4();
        let query = DashboardFilterQuery {
            start_date: Some(date("2026-01-01")),
            end_date: Some(date("2026-03-31")),
            course_name: Some("ignorado".to_string()),
            category_id: Some(category_id),
            status: Some("active".to_string()),
            ..Default::default()
        };

        let filter = LeadFilter::from_query(&query);
        assert_eq!(filter.category_id, Some(category_id));
        assert_eq!(filter.period, Some((date("2026-01-01"), date("2026-03-31"))));
    }
}
