// src/services/dashboard_service.rs

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::{
        CategoryRevenueEntry, CategorySaleRow, DashboardCharts, DashboardFilterQuery,
        DashboardOptions, DashboardResponse, DashboardSummary, LeadFilter, SaleHistoryRow,
        SalesHistoryPoint, SalesHistorySeries, SubscriptionFilter, SummaryRow,
    },
};

// Balde para cursos sem categoria (curso com category_id órfão, etc.)
pub const UNCATEGORIZED: &str = "Sem categoria";

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    // Função mestra: constrói o predicado uma vez e dispara as seis
    // queries em paralelo. Qualquer falha derruba a requisição inteira
    // (sem resultado parcial), que é exatamente o que o try_join! dá.
    pub async fn get_dashboard_data(
        &self,
        query: &DashboardFilterQuery,
    ) -> Result<DashboardResponse, AppError> {
        let filter = SubscriptionFilter::from_query(query);
        let lead_filter = LeadFilter::from_query(query);

        let (summary_row, sales_by_course, category_rows, recent_sales, leads_status, history_rows) =
            tokio::try_join!(
                self.repo.fetch_summary(&filter),
                self.repo.fetch_sales_by_course(&filter),
                self.repo.fetch_category_sales(&filter),
                self.repo.fetch_recent_sales(&filter),
                self.repo.fetch_leads_status(&lead_filter),
                self.repo.fetch_sales_history(&filter),
            )?;

        Ok(DashboardResponse {
            summary: build_summary(summary_row),
            charts: DashboardCharts {
                sales_by_course,
                sales_by_category: group_sales_by_category(category_rows),
                leads_status,
                sales_history: build_sales_history(history_rows),
            },
            table: recent_sales,
        })
    }

    pub async fn get_options(&self) -> Result<DashboardOptions, AppError> {
        let (categories, courses) =
            tokio::try_join!(self.repo.fetch_categories(), self.repo.fetch_courses())?;

        Ok(DashboardOptions { categories, courses })
    }
}

// ---
// Funções puras de agregação (testáveis sem banco)
// ---

pub fn build_summary(row: SummaryRow) -> DashboardSummary {
    let average_ticket = if row.total_sales > 0 {
        row.total_revenue / Decimal::from(row.total_sales)
    } else {
        Decimal::ZERO
    };

    DashboardSummary {
        total_revenue: row.total_revenue,
        total_sales: row.total_sales,
        average_ticket,
    }
}

// Agrupamento em memória por descrição da categoria.
// A saída segue a ordem de primeira aparição (o contrato não define ordem).
pub fn group_sales_by_category(rows: Vec<CategorySaleRow>) -> Vec<CategoryRevenueEntry> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, Decimal> = HashMap::new();

    for row in rows {
        let category = row.category.unwrap_or_else(|| UNCATEGORIZED.to_string());
        if !totals.contains_key(&category) {
            order.push(category.clone());
        }
        *totals.entry(category).or_insert(Decimal::ZERO) += row.paid_price;
    }

    order
        .into_iter()
        .map(|category| {
            let value = totals.remove(&category).unwrap_or(Decimal::ZERO);
            CategoryRevenueEntry { category, value }
        })
        .collect()
}

// Bucketing por (curso, dia de calendário), somando vendas do mesmo dia.
// Uma série por curso, na ordem em que o curso aparece; pontos em ordem
// ascendente de data (o BTreeMap garante).
pub fn build_sales_history(rows: Vec<SaleHistoryRow>) -> Vec<SalesHistorySeries> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, BTreeMap<chrono::NaiveDate, Decimal>> = HashMap::new();

    for row in rows {
        if !buckets.contains_key(&row.course_name) {
            order.push(row.course_name.clone());
        }
        let day = row.sale_date.date_naive();
        *buckets
            .entry(row.course_name)
            .or_default()
            .entry(day)
            .or_insert(Decimal::ZERO) += row.paid_price;
    }

    order
        .into_iter()
        .map(|name| {
            let data = buckets
                .remove(&name)
                .unwrap_or_default()
                .into_iter()
                .map(|(date, value)| SalesHistoryPoint { date, value })
                .collect();
            SalesHistorySeries { name, data }
        })
        .collect()
}

// Achata as séries por curso numa série única (soma por dia), o mesmo
// reshape que o front aplica para a linha de tendência geral.
// Pura, determinística e idempotente para a mesma entrada.
// Nenhum endpoint consome isso hoje (a tendência é montada no cliente);
// vive aqui como referência executável do reshape, coberta pelos testes.
#[cfg_attr(not(test), allow(dead_code))]
pub fn combine_sales_history(series: &[SalesHistorySeries]) -> Vec<SalesHistoryPoint> {
    let mut totals: BTreeMap<chrono::NaiveDate, Decimal> = BTreeMap::new();

    for serie in series {
        for point in &serie.data {
            *totals.entry(point.date).or_insert(Decimal::ZERO) += point.value;
        }
    }

    totals
        .into_iter()
        .map(|(date, value)| SalesHistoryPoint { date, value })
        .collect()
}
