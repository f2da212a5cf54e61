// src/db/dashboard_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::dashboard::{
        CategoryOption, CategorySaleRow, CourseOption, CourseRevenueEntry, LeadFilter,
        LeadStatusEntry, RecentSaleEntry, SaleHistoryRow, SubscriptionFilter, SummaryRow,
    },
};

// Nome exibido quando a assinatura aponta para um curso que não existe mais.
pub const UNKNOWN_COURSE: &str = "Desconhecido";

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Resumo: soma e contagem numa passada só
    pub async fn fetch_summary(&self, filter: &SubscriptionFilter) -> Result<SummaryRow, AppError> {
        let row = summary_query(filter)
            .build_query_as::<SummaryRow>()
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    // 2. Top 5 cursos por receita somada
    pub async fn fetch_sales_by_course(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<CourseRevenueEntry>, AppError> {
        let rows = sales_by_course_query(filter)
            .build_query_as::<CourseRevenueEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    // 3. Linhas cruas (preço pago + descrição da categoria).
    // O agrupamento por categoria acontece em memória, no service.
    pub async fn fetch_category_sales(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<CategorySaleRow>, AppError> {
        let rows = category_sales_query(filter)
            .build_query_as::<CategorySaleRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    // 4. Tabela: as 10 vendas mais recentes, com comprador e curso
    pub async fn fetch_recent_sales(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<RecentSaleEntry>, AppError> {
        let rows = recent_sales_query(filter)
            .build_query_as::<RecentSaleEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    // 5. Funil: leads agrupados por status direto no banco.
    pub async fn fetch_leads_status(
        &self,
        filter: &LeadFilter,
    ) -> Result<Vec<LeadStatusEntry>, AppError> {
        let rows = leads_status_query(filter)
            .build_query_as::<LeadStatusEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    // 6. Linhas cruas da série temporal; o bucketing por (curso, dia) é do service
    pub async fn fetch_sales_history(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<SaleHistoryRow>, AppError> {
        let rows = sales_history_query(filter)
            .build_query_as::<SaleHistoryRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    // Opções dos controles de filtro do front
    pub async fn fetch_categories(&self) -> Result<Vec<CategoryOption>, AppError> {
        let rows = sqlx::query_as::<_, CategoryOption>(
            "SELECT id, description FROM categories ORDER BY description",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn fetch_courses(&self) -> Result<Vec<CourseOption>, AppError> {
        let rows = sqlx::query_as::<_, CourseOption>("SELECT id, name FROM courses ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

// ---
// Montagem das queries (separada da execução para dar para testar o SQL gerado)
// ---

fn summary_query(filter: &SubscriptionFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = subscription_query(
        "SELECT COALESCE(SUM(s.paid_price), 0) AS total_revenue,
                COUNT(s.id) AS total_sales",
    );
    push_subscription_filter(&mut qb, filter);
    qb
}

fn sales_by_course_query(filter: &SubscriptionFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = subscription_query(&format!(
        "SELECT COALESCE(c.name, '{UNKNOWN_COURSE}') AS name,
                SUM(s.paid_price) AS total_revenue,
                COUNT(s.id) AS count"
    ));
    push_subscription_filter(&mut qb, filter);
    qb.push(" GROUP BY c.id, c.name ORDER BY total_revenue DESC LIMIT 5");
    qb
}

fn category_sales_query(filter: &SubscriptionFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = subscription_query(
        "SELECT s.paid_price,
                cat.description AS category",
    );
    qb.push(" LEFT JOIN categories cat ON cat.id = c.category_id");
    push_subscription_filter(&mut qb, filter);
    qb
}

fn recent_sales_query(filter: &SubscriptionFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = subscription_query(&format!(
        "SELECT s.id,
                s.status,
                s.sale_date,
                s.paid_price,
                u.name AS user_name,
                u.email AS user_email,
                COALESCE(c.name, '{UNKNOWN_COURSE}') AS course_name"
    ));
    qb.push(" JOIN users u ON u.id = s.user_id");
    push_subscription_filter(&mut qb, filter);
    qb.push(" ORDER BY s.sale_date DESC LIMIT 10");
    qb
}

// Status sem nenhum lead simplesmente não sai do GROUP BY (sem zero-fill).
fn leads_status_query(filter: &LeadFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT l.status, COUNT(l.id) AS count FROM leads l WHERE 1 = 1",
    );

    if let Some(category_id) = filter.category_id {
        qb.push(" AND l.interested_category_id = ").push_bind(category_id);
    }
    if let Some((start, end)) = filter.period {
        qb.push(" AND l.created_at::date >= ").push_bind(start);
        qb.push(" AND l.created_at::date <= ").push_bind(end);
    }
    qb.push(" GROUP BY l.status");
    qb
}

fn sales_history_query(filter: &SubscriptionFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = subscription_query(&format!(
        "SELECT COALESCE(c.name, '{UNKNOWN_COURSE}') AS course_name,
                s.sale_date,
                s.paid_price"
    ));
    push_subscription_filter(&mut qb, filter);
    qb.push(" ORDER BY s.sale_date ASC");
    qb
}

// Base comum: toda query de assinatura faz LEFT JOIN com courses,
// para o filtro de curso e para o fallback de nome funcionarem.
fn subscription_query(select: &str) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(select);
    qb.push(" FROM subscriptions s LEFT JOIN courses c ON c.id = s.course_id");
    qb
}

// Traduz o predicado imutável em cláusulas SQL, sempre com bind (nunca interpola valor).
fn push_subscription_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &SubscriptionFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some((start, end)) = filter.period {
        // Intervalo inclusivo de dias de calendário sobre a data da venda
        qb.push(" AND s.sale_date::date >= ").push_bind(start);
        qb.push(" AND s.sale_date::date <= ").push_bind(end);
    }

    if let Some(status) = &filter.status {
        qb.push(" AND s.status = ").push_bind(status.clone());
    }

    if let Some(course) = &filter.course {
        if let Some(name) = &course.name_contains {
            qb.push(" AND c.name ILIKE ").push_bind(format!("%{name}%"));
        }
        if let Some(ids) = &course.ids {
            qb.push(" AND c.id = ANY(").push_bind(ids.clone()).push(")");
        }
        if let Some(category_id) = course.category_id {
            qb.push(" AND c.category_id = ").push_bind(category_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::CourseFilter;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn empty_filter() -> SubscriptionFilter {
        SubscriptionFilter {
            period: None,
            status: None,
            course: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("data válida no teste")
    }

    fn filter_sql(filter: &SubscriptionFilter) -> String {
        let mut qb = subscription_query("SELECT 1");
        push_subscription_filter(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn predicado_vazio_nao_emite_clausula_nenhuma() {
        let sql = filter_sql(&empty_filter());
        assert!(sql.ends_with(" WHERE 1 = 1"));
        assert!(!sql.contains(" AND "));
    }

    #[test]
    fn periodo_vira_intervalo_inclusivo_com_binds() {
        let filter = SubscriptionFilter {
            period: Some((date("2026-01-01"), date("2026-01-31"))),
            ..empty_filter()
        };
        let sql = filter_sql(&filter);
        assert!(sql.contains("s.sale_date::date >= $1"));
        assert!(sql.contains("s.sale_date::date <= $2"));
    }

    #[test]
    fn status_vira_igualdade_com_bind() {
        let filter = SubscriptionFilter {
            status: Some("active".to_string()),
            ..empty_filter()
        };
        let sql = filter_sql(&filter);
        assert!(sql.contains("s.status = $1"));
        assert!(!sql.contains("active"), "valor tem que ir por bind, não interpolado");
    }

    #[test]
    fn cada_regra_de_curso_emite_sua_clausula() {
        let filter = SubscriptionFilter {
            course: Some(CourseFilter {
                name_contains: Some("Enem".to_string()),
                ids: Some(vec![Uuid::new_v4()]),
                category_id: Some(Uuid::new_v4()),
            }),
            ..empty_filter()
        };
        let sql = filter_sql(&filter);
        assert!(sql.contains("c.name ILIKE $1"));
        assert!(sql.contains("c.id = ANY($2)"));
        assert!(sql.contains("c.category_id = $3"));
    }

    #[test]
    fn top_cursos_ordena_por_receita_e_corta_em_cinco() {
        let mut qb = sales_by_course_query(&empty_filter());
        let sql = qb.sql().to_string();
        assert!(sql.ends_with("ORDER BY total_revenue DESC LIMIT 5"));
        assert!(sql.contains(UNKNOWN_COURSE));
    }

    #[test]
    fn vendas_recentes_ordena_desc_e_corta_em_dez() {
        let mut qb = recent_sales_query(&empty_filter());
        assert!(qb.sql().ends_with("ORDER BY s.sale_date DESC LIMIT 10"));
    }

    #[test]
    fn historico_sai_em_ordem_ascendente_de_data() {
        let mut qb = sales_history_query(&empty_filter());
        assert!(qb.sql().ends_with("ORDER BY s.sale_date ASC"));
    }

    #[test]
    fn query_de_leads_agrupa_sem_zero_fill() {
        let filter = LeadFilter {
            period: None,
            category_id: None,
        };
        let mut qb = leads_status_query(&filter);
        let sql = qb.sql();
        // Só GROUP BY: status ausente não ganha linha com contagem zero
        assert!(sql.ends_with(" GROUP BY l.status"));
        assert!(!sql.contains("COALESCE"));
        assert!(!sql.contains(" AND "));
    }

    #[test]
    fn query_de_leads_filtra_categoria_e_periodo() {
        let filter = LeadFilter {
            period: Some((date("2026-01-01"), date("2026-03-31"))),
            category_id: Some(Uuid::new_v4()),
        };
        let mut qb = leads_status_query(&filter);
        let sql = qb.sql();
        assert!(sql.contains("l.interested_category_id = $1"));
        assert!(sql.contains("l.created_at::date >= $2"));
        assert!(sql.contains("l.created_at::date <= $3"));
    }
}
